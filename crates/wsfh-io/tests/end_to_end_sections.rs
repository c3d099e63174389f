//! End-to-end conversion tests.
//!
//! Each test writes a Wire_Sections file into a temp directory, runs the
//! full pipeline and inspects the deck left on disk.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use wsfh_inp::Units;
use wsfh_io::{Comparison, ConvertConfig, ConvertError, DeckOptions, convert};
use wsfh_model::{GeometryOptions, ShortSectionPolicy};

const EXAMPLE: &str = "mm
vol_res_cm=1.0
Section-1, 0, 0, 0, 1
Section-1, 10, 0, 0, 1
Section-2, 0, 5, 0, 1
Section-2, 10, 5, 0, 1
";

fn write_input(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("Wire_Sections.txt");
    fs::write(&path, body).expect("write input");
    path
}

fn deck_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("deck should be readable")
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn converts_two_section_example() {
    let dir = tempfile::tempdir().expect("create temp directory");
    let input = write_input(&dir, EXAMPLE);

    let report = convert(&input, &ConvertConfig::default()).expect("conversion should succeed");
    assert_eq!(report.output, dir.path().join("Wire_Sections.inp"));
    assert_eq!(report.units, Units::Mm);
    assert_eq!(report.sigma, 5.8e4);
    assert_eq!(report.summary.sections, 2);
    assert_eq!(report.summary.nodes, 4);
    assert_eq!(report.summary.segments, 2);
    assert_eq!(report.summary.ports, 2);
    assert!(report.verification.is_none());

    let lines = deck_lines(&report.output);
    assert!(lines.contains(&".units mm".to_string()));
    let externals: Vec<&String> = lines.iter().filter(|l| l.starts_with(".external")).collect();
    assert_eq!(externals.len(), 2);
    assert_eq!(externals[0], ".external NSection-1_Node_1 NSection-1_Node_2");
    assert_eq!(externals[1], ".external NSection-2_Node_1 NSection-2_Node_2");
}

#[test]
fn section_order_is_numeric_aware() {
    let dir = tempfile::tempdir().expect("create temp directory");
    let input = write_input(
        &dir,
        "cm\nparams\n\
         Section-10,0,0,0\nSection-10,1,0,0\n\
         Section-2,0,0,0\nSection-2,1,0,0\n\
         Section-1,0,0,0\nSection-1,1,0,0\n",
    );

    let report = convert(&input, &ConvertConfig::default()).expect("conversion should succeed");
    assert_eq!(report.units, Units::Cm);
    assert_eq!(report.sigma, 5.8e5);

    let ports: Vec<String> = deck_lines(&report.output)
        .into_iter()
        .filter(|l| l.starts_with(".external"))
        .collect();
    assert_eq!(
        ports,
        vec![
            ".external NSection-1_Node_1 NSection-1_Node_2",
            ".external NSection-2_Node_1 NSection-2_Node_2",
            ".external NSection-10_Node_1 NSection-10_Node_2",
        ]
    );
}

#[test]
fn segment_and_port_counts_follow_point_counts() {
    let dir = tempfile::tempdir().expect("create temp directory");
    let input = write_input(
        &dir,
        "Section-A,0,0,0\nSection-A,1,0,0\nSection-A,2,0,0\nSection-A,3,0,0\n\
         Section-B,0,1,0\nSection-B,1,1,0\nSection-B,2,1,0\n",
    );

    let report = convert(&input, &ConvertConfig::default()).expect("conversion should succeed");
    assert_eq!(report.summary.segments, (4 - 1) + (3 - 1));
    assert_eq!(report.summary.ports, 2);

    let lines = deck_lines(&report.output);
    let segments: Vec<&String> = lines.iter().filter(|l| l.starts_with("EFHSegment")).collect();
    assert_eq!(segments.len(), 5);
    assert!(segments[0].starts_with("EFHSegment "));
    assert!(segments[4].starts_with("EFHSegment004 "));

    let node_names: Vec<&str> = lines
        .iter()
        .filter(|l| l.contains(" x="))
        .filter_map(|l| l.split_whitespace().next())
        .collect();
    let unique: HashSet<&str> = node_names.iter().copied().collect();
    assert_eq!(node_names.len(), 7);
    assert_eq!(unique.len(), node_names.len());
}

#[test]
fn malformed_rows_are_skipped() {
    let dir = tempfile::tempdir().expect("create temp directory");
    let body = format!("{EXAMPLE}BadRow, notanumber, 0, 0\nSection-2, oops, 0, 0\n");
    let input = write_input(&dir, &body);

    let report = convert(&input, &ConvertConfig::default()).expect("conversion should succeed");
    assert_eq!(report.summary.nodes, 4);
    let text = fs::read_to_string(&report.output).expect("deck should be readable");
    assert!(!text.contains("BadRow"));
}

#[test]
fn units_only_file_fails_with_no_sections() {
    let dir = tempfile::tempdir().expect("create temp directory");
    let input = write_input(&dir, "mm\n");

    let err = convert(&input, &ConvertConfig::default()).expect_err("should fail");
    assert!(matches!(err, ConvertError::NoSections));
    assert!(!dir.path().join("Wire_Sections.inp").exists());
}

#[test]
fn short_section_policy_is_configurable() {
    let dir = tempfile::tempdir().expect("create temp directory");
    let body = format!("{EXAMPLE}Section-3, 1, 1, 1\n");
    let input = write_input(&dir, &body);

    let err = convert(&input, &ConvertConfig::default()).expect_err("strict should fail");
    assert!(matches!(
        err,
        ConvertError::InsufficientPoints { ref section, points: 1 } if section == "Section-3"
    ));
    assert!(!dir.path().join("Wire_Sections.inp").exists());

    let lenient = ConvertConfig {
        geometry: GeometryOptions {
            short_sections: ShortSectionPolicy::Skip,
            ..GeometryOptions::default()
        },
        ..ConvertConfig::default()
    };
    let report = convert(&input, &lenient).expect("skip should succeed");
    assert_eq!(report.summary.sections, 2);
}

#[test]
fn all_short_sections_yield_no_segments() {
    let dir = tempfile::tempdir().expect("create temp directory");
    let input = write_input(&dir, "Section-1,0,0,0\nSection-2,0,0,0\n");
    let config = ConvertConfig {
        geometry: GeometryOptions {
            short_sections: ShortSectionPolicy::Skip,
            ..GeometryOptions::default()
        },
        ..ConvertConfig::default()
    };

    let err = convert(&input, &config).expect_err("should fail");
    assert!(matches!(err, ConvertError::NoSegments));
}

#[test]
fn reruns_are_byte_identical() {
    let dir = tempfile::tempdir().expect("create temp directory");
    let input = write_input(&dir, EXAMPLE);
    let config = ConvertConfig {
        output: Some(dir.path().join("out").join("deck.inp")),
        deck: DeckOptions {
            sigma: Some(1.0e4),
            ..DeckOptions::default()
        },
        ..ConvertConfig::default()
    };

    let first = convert(&input, &config).expect("first run");
    let first_bytes = fs::read(&first.output).expect("read first deck");
    let second = convert(&input, &config).expect("second run");
    let second_bytes = fs::read(&second.output).expect("read second deck");
    assert_eq!(first_bytes, second_bytes);
    assert!(String::from_utf8_lossy(&first_bytes).contains(".default sigma=10000.0 "));
}

#[test]
fn verification_against_own_output_matches() {
    let dir = tempfile::tempdir().expect("create temp directory");
    let input = write_input(&dir, EXAMPLE);
    let first = convert(&input, &ConvertConfig::default()).expect("first run");

    let reference = dir.path().join("reference.inp");
    fs::copy(&first.output, &reference).expect("copy reference");

    let config = ConvertConfig {
        verify_against: Some(reference),
        ..ConvertConfig::default()
    };
    let report = convert(&input, &config).expect("verification run");
    let verification = report.verification.as_ref().expect("verification requested");
    assert_eq!(verification.outcome, Comparison::Match);
    assert!(report.into_result().is_ok());
}

#[test]
fn verification_mismatch_still_writes_deck() {
    let dir = tempfile::tempdir().expect("create temp directory");
    let input = write_input(&dir, EXAMPLE);
    let reference = dir.path().join("reference.inp");
    fs::write(&reference, ".units cm\r\n.end\r\n").expect("write reference");

    let config = ConvertConfig {
        verify_against: Some(reference),
        ..ConvertConfig::default()
    };
    let report = convert(&input, &config).expect("conversion should succeed");
    assert!(report.output.exists());

    let err = report.into_result().expect_err("mismatch should surface");
    let ConvertError::DeckMismatch { diff, .. } = err else {
        panic!("expected DeckMismatch");
    };
    assert!(diff.contains("-.units cm"));
    assert!(diff.contains("+.units mm"));
}

#[test]
fn missing_reference_is_fatal() {
    let dir = tempfile::tempdir().expect("create temp directory");
    let input = write_input(&dir, EXAMPLE);
    let config = ConvertConfig {
        verify_against: Some(dir.path().join("nope.inp")),
        ..ConvertConfig::default()
    };

    let err = convert(&input, &config).expect_err("should fail");
    assert!(matches!(err, ConvertError::ReferenceMissing(_)));
}
