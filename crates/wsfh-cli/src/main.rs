//! `wsfh` converts a Wire_Sections.txt file into a FastHenry2 input deck.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{LevelFilter, debug};
use wsfh_io::{
    Comparison, ConversionReport, ConvertConfig, DEFAULT_DIFF_LIMIT, DeckOptions, DeckSummary,
    FrequencySweep, Verification, convert, load_overrides,
};
use wsfh_model::{
    CrossSection, DEFAULT_SEG_HEIGHT, DEFAULT_SEG_WIDTH, GeometryOptions, NodeNaming,
    SectionOverrides, ShortSectionPolicy,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum NamingArg {
    Reference,
    Compact,
}

impl From<NamingArg> for NodeNaming {
    fn from(arg: NamingArg) -> Self {
        match arg {
            NamingArg::Reference => NodeNaming::Reference,
            NamingArg::Compact => NodeNaming::Compact,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "wsfh")]
#[command(about = "Convert Wire_Sections.txt into a FastHenry2 input file", long_about = None)]
#[command(version)]
struct Cli {
    /// Input Wire_Sections.txt
    #[arg(value_name = "INFILE")]
    infile: PathBuf,

    /// Output FastHenry2 file (default: input name with .inp extension)
    #[arg(short, long, value_name = "OUTFILE")]
    outfile: Option<PathBuf>,

    /// Global default trace width, in the input's length units
    #[arg(long, default_value_t = DEFAULT_SEG_WIDTH)]
    trace_width: f64,

    /// Global default trace thickness, in the input's length units
    #[arg(long, default_value_t = DEFAULT_SEG_HEIGHT)]
    trace_thickness: f64,

    /// Conductivity for .default sigma; copper scaled to the units if omitted
    #[arg(long)]
    sigma: Option<f64>,

    /// Minimum frequency in Hz for .freq
    #[arg(long, default_value_t = 1.0)]
    fmin: f64,

    /// Maximum frequency in Hz for .freq
    #[arg(long, default_value_t = 1e9)]
    fmax: f64,

    /// Points per decade for the .freq ndec parameter
    #[arg(long, default_value_t = 1.0)]
    freq_decades: f64,

    /// Subdivisions along trace thickness
    #[arg(long, default_value_t = 1)]
    nhinc: u32,

    /// Subdivisions along trace width
    #[arg(long, default_value_t = 1)]
    nwinc: u32,

    /// Aspect-ratio control rh passed to .default
    #[arg(long, default_value_t = 2)]
    rh: u32,

    /// Aspect-ratio control rw passed to .default
    #[arg(long, default_value_t = 2)]
    rw: u32,

    /// JSON file mapping section names to {"width", "height"} overrides
    #[arg(long, value_name = "JSON")]
    overrides: Option<PathBuf>,

    /// Drop sections with fewer than two points instead of failing
    #[arg(long)]
    skip_short_sections: bool,

    /// Node label scheme
    #[arg(long, value_enum, default_value = "reference")]
    node_naming: NamingArg,

    /// Known-good deck to compare the generated one against
    #[arg(long, value_name = "REF")]
    verify_against: Option<PathBuf>,

    /// Maximum number of diff lines printed on mismatch
    #[arg(long, default_value_t = DEFAULT_DIFF_LIMIT)]
    diff_limit: usize,

    /// Also write the conversion summary as JSON
    #[arg(long, value_name = "PATH")]
    summary_json: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn to_config(&self) -> Result<ConvertConfig> {
        let overrides = match &self.overrides {
            Some(path) => load_overrides(path)
                .with_context(|| format!("loading overrides from {}", path.display()))?,
            None => SectionOverrides::new(),
        };
        debug!("{} section override(s)", overrides.len());

        Ok(ConvertConfig {
            geometry: GeometryOptions {
                default: CrossSection {
                    width: self.trace_width,
                    height: self.trace_thickness,
                },
                overrides,
                short_sections: if self.skip_short_sections {
                    ShortSectionPolicy::Skip
                } else {
                    ShortSectionPolicy::Strict
                },
                naming: self.node_naming.into(),
            },
            deck: DeckOptions {
                sigma: self.sigma,
                sweep: FrequencySweep {
                    fmin: self.fmin,
                    fmax: self.fmax,
                    ndec: self.freq_decades,
                },
                nhinc: self.nhinc,
                nwinc: self.nwinc,
                rh: self.rh,
                rw: self.rw,
            },
            output: self.outfile.clone(),
            verify_against: self.verify_against.clone(),
            diff_limit: self.diff_limit,
        })
    }
}

fn init_logging(verbose: bool) {
    if verbose {
        env_logger::builder().filter_level(LevelFilter::Debug).init();
    } else {
        env_logger::builder()
            .filter_level(LevelFilter::Warn)
            .parse_default_env()
            .init();
    }
}

fn absolute(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn print_summary(report: &ConversionReport) {
    let s = &report.summary;
    println!(
        "[OK] Written FastHenry2 input to: {} (sections={}, nodes={}, segments={}, ports={})",
        absolute(&report.output).display(),
        s.sections,
        s.nodes,
        s.segments,
        s.ports
    );
}

fn write_summary_json(path: &Path, summary: &DeckSummary) -> Result<()> {
    let body = serde_json::to_string_pretty(summary)?;
    fs::write(path, body).with_context(|| format!("writing summary to {}", path.display()))
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let config = cli.to_config()?;
    let report = convert(&cli.infile, &config)
        .with_context(|| format!("converting {}", cli.infile.display()))?;
    print_summary(&report);

    if let Some(path) = &cli.summary_json {
        write_summary_json(path, &report.summary)?;
    }

    match &report.verification {
        Some(Verification {
            reference,
            outcome: Comparison::Match,
        }) => {
            println!(
                "[OK] Generated deck matches reference: {}",
                absolute(reference).display()
            );
        }
        Some(Verification {
            outcome: Comparison::Mismatch { diff },
            ..
        }) => {
            println!("[ERROR] Generated deck differs from reference. Unified diff:\n{diff}");
            return Ok(ExitCode::from(1));
        }
        None => {}
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_em_workbench_settings() {
        let cli = Cli::try_parse_from(["wsfh", "Wire_Sections.txt"]).expect("valid args");
        let config = cli.to_config().expect("config should resolve");
        assert_eq!(config.geometry.default, CrossSection::default());
        assert_eq!(config.geometry.short_sections, ShortSectionPolicy::Strict);
        assert_eq!(config.geometry.naming, NodeNaming::Reference);
        assert_eq!(config.deck, DeckOptions::default());
        assert_eq!(config.diff_limit, DEFAULT_DIFF_LIMIT);
        assert!(config.output.is_none());
    }

    #[test]
    fn flags_flow_into_config() {
        let cli = Cli::try_parse_from([
            "wsfh",
            "in.txt",
            "-o",
            "out.inp",
            "--trace-width",
            "0.5",
            "--trace-thickness",
            "0.07",
            "--sigma",
            "1e4",
            "--fmin",
            "1e3",
            "--fmax",
            "1e6",
            "--freq-decades",
            "2",
            "--nhinc",
            "3",
            "--skip-short-sections",
            "--node-naming",
            "compact",
            "--diff-limit",
            "20",
        ])
        .expect("valid args");
        let config = cli.to_config().expect("config should resolve");
        assert_eq!(config.output, Some(PathBuf::from("out.inp")));
        assert_eq!(config.geometry.default.width, 0.5);
        assert_eq!(config.geometry.default.height, 0.07);
        assert_eq!(config.geometry.short_sections, ShortSectionPolicy::Skip);
        assert_eq!(config.geometry.naming, NodeNaming::Compact);
        assert_eq!(config.deck.sigma, Some(1e4));
        assert_eq!(config.deck.sweep.fmin, 1e3);
        assert_eq!(config.deck.sweep.fmax, 1e6);
        assert_eq!(config.deck.sweep.ndec, 2.0);
        assert_eq!(config.deck.nhinc, 3);
        assert_eq!(config.diff_limit, 20);
    }

    const EXAMPLE: &str = "mm\nvol_res_cm=1.0\n\
        Section-1, 0, 0, 0, 1\nSection-1, 10, 0, 0, 1\n\
        Section-2, 0, 5, 0, 1\nSection-2, 10, 5, 0, 1\n";

    #[test]
    fn mismatching_reference_exits_with_status_one() {
        let dir = tempfile::tempdir().expect("create temp directory");
        let input = dir.path().join("Wire_Sections.txt");
        let reference = dir.path().join("reference.inp");
        let summary = dir.path().join("summary.json");
        fs::write(&input, EXAMPLE).expect("write input");
        fs::write(&reference, ".units cm\r\n.end\r\n").expect("write reference");

        let args = [
            "wsfh".to_string(),
            input.display().to_string(),
            "--verify-against".to_string(),
            reference.display().to_string(),
            "--summary-json".to_string(),
            summary.display().to_string(),
        ];
        let cli = Cli::try_parse_from(args).expect("valid args");
        let code = run(&cli).expect("run should complete");
        assert_eq!(code, ExitCode::from(1));
        assert!(dir.path().join("Wire_Sections.inp").exists());

        let written: DeckSummary =
            serde_json::from_str(&fs::read_to_string(&summary).expect("summary should exist"))
                .expect("summary should be valid JSON");
        assert_eq!(
            written,
            DeckSummary {
                sections: 2,
                nodes: 4,
                segments: 2,
                ports: 2,
            }
        );
    }

    #[test]
    fn matching_reference_exits_successfully() {
        let dir = tempfile::tempdir().expect("create temp directory");
        let input = dir.path().join("Wire_Sections.txt");
        fs::write(&input, EXAMPLE).expect("write input");

        let first = Cli::try_parse_from(["wsfh".to_string(), input.display().to_string()])
            .expect("valid args");
        assert_eq!(run(&first).expect("first run"), ExitCode::SUCCESS);

        let reference = dir.path().join("reference.inp");
        fs::copy(dir.path().join("Wire_Sections.inp"), &reference).expect("copy reference");
        let second = Cli::try_parse_from([
            "wsfh".to_string(),
            input.display().to_string(),
            "--verify-against".to_string(),
            reference.display().to_string(),
        ])
        .expect("valid args");
        assert_eq!(run(&second).expect("second run"), ExitCode::SUCCESS);
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempfile::tempdir().expect("create temp directory");
        let cli = Cli::try_parse_from([
            "wsfh".to_string(),
            dir.path().join("absent.txt").display().to_string(),
        ])
        .expect("valid args");
        let err = run(&cli).expect_err("missing input should fail");
        assert!(format!("{err:#}").contains("input file not found"));
    }

    #[test]
    fn missing_overrides_file_is_reported() {
        let cli = Cli::try_parse_from(["wsfh", "in.txt", "--overrides", "/nonexistent/o.json"])
            .expect("valid args");
        let err = cli.to_config().expect_err("should fail");
        assert!(format!("{err:#}").contains("loading overrides"));
    }
}
