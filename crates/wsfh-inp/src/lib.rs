//! Minimal `Wire_Sections.txt` parser.
//!
//! The file is a units token, a parameter line and then one
//! `Section-Name, X, Y, Z[, ...]` row per point. Rows that do not fit that
//! shape are skipped rather than rejected.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, trace};
use thiserror::Error;

/// Every data row must start with this prefix to be attached to a section.
pub const SECTION_PREFIX: &str = "Section-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Units {
    #[default]
    Mm,
    Cm,
    M,
}

impl Units {
    /// Accepts the unit synonyms written by the FreeCAD macro, case-insensitive.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "mm" | "millimeter" | "millimetre" => Some(Units::Mm),
            "cm" | "centimeter" | "centimetre" => Some(Units::Cm),
            "m" | "meter" | "metre" => Some(Units::M),
            _ => None,
        }
    }

    /// Units tokens recognized as a file header. Only mm/cm synonyms count;
    /// any other first line is data and millimeters are assumed.
    pub fn from_header(line: &str) -> Option<Self> {
        match Units::from_token(line)? {
            Units::M => None,
            units => Some(units),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Units::Mm => "MM",
            Units::Cm => "CM",
            Units::M => "M",
        }
    }

    /// Token written into the deck's `.units` card.
    pub fn directive(self) -> &'static str {
        match self {
            Units::Mm => "mm",
            Units::Cm => "cm",
            Units::M => "m",
        }
    }
}

impl Display for Units {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One accepted coordinate row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// 1-based position inside its section.
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// 1-based line number among the non-blank lines of the file.
    pub source_line: usize,
}

/// A row before its position in the section is known.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RawPoint {
    x: f64,
    y: f64,
    z: f64,
    source_line: usize,
}

impl RawPoint {
    fn into_point(self, index: usize) -> Point {
        Point {
            index,
            x: self.x,
            y: self.y,
            z: self.z,
            source_line: self.source_line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WireSections {
    pub units: Units,
    /// Whether a units header and its parameter line were consumed.
    pub units_detected: bool,
    pub sections: BTreeMap<String, Vec<Point>>,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("input file is empty or only whitespace")]
    EmptyInput,

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl WireSections {
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ParseError::MissingInput(path.to_path_buf()));
        }
        let raw = fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_str(&raw)
    }

    pub fn parse_str(raw: &str) -> Result<Self, ParseError> {
        let lines: Vec<&str> = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if lines.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let detected = Units::from_header(lines[0]);
        let units = detected.unwrap_or_default();
        // The units token is followed by a parameter line (vol_res_cm=...).
        let mut start = if detected.is_some() { 2 } else { 0 };
        if start >= lines.len() {
            start = 0;
        }

        let mut raw_sections = BTreeMap::<String, Vec<RawPoint>>::new();
        for (i, line) in lines.iter().enumerate().skip(start) {
            let source_line = i + 1;
            match parse_row(line, source_line) {
                Some((name, point)) => raw_sections.entry(name).or_default().push(point),
                None => trace!("line {source_line}: skipped `{line}`"),
            }
        }

        let sections: BTreeMap<String, Vec<Point>> = raw_sections
            .into_iter()
            .map(|(name, rows)| {
                let points = rows
                    .into_iter()
                    .enumerate()
                    .map(|(k, row)| row.into_point(k + 1))
                    .collect();
                (name, points)
            })
            .collect();

        debug!(
            "parsed {} section(s) in {} units from {} non-blank line(s)",
            sections.len(),
            units,
            lines.len()
        );

        Ok(WireSections {
            units,
            units_detected: detected.is_some() && start > 0,
            sections,
        })
    }

    pub fn total_points(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }
}

fn parse_row(line: &str, source_line: usize) -> Option<(String, RawPoint)> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < 4 {
        return None;
    }
    let name = fields[0];
    if !name.starts_with(SECTION_PREFIX) {
        return None;
    }
    let x = fields[1].parse::<f64>().ok()?;
    let y = fields[2].parse::<f64>().ok()?;
    let z = fields[3].parse::<f64>().ok()?;
    Some((
        name.to_string(),
        RawPoint {
            x,
            y,
            z,
            source_line,
        },
    ))
}
