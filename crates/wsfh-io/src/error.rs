//! Error types for wsfh-io

use std::path::PathBuf;

use thiserror::Error;
use wsfh_inp::ParseError;
use wsfh_model::GeometryError;

pub type Result<T> = std::result::Result<T, ConvertError>;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("input file is empty or only whitespace")]
    EmptyInput,

    #[error("no Section-* data found in input file")]
    NoSections,

    #[error("section '{section}' only has {points} point(s); at least two are required")]
    InsufficientPoints { section: String, points: usize },

    #[error(
        "no segments were generated; ensure each Section-* entry contains at least two coordinates"
    )]
    NoSegments,

    #[error("node name '{0}' is produced by more than one section point")]
    DuplicateNodeName(String),

    #[error("reference deck not found: {}", .0.display())]
    ReferenceMissing(PathBuf),

    #[error("generated deck {} differs from reference {}", generated.display(), reference.display())]
    DeckMismatch {
        generated: PathBuf,
        reference: PathBuf,
        diff: String,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid overrides file {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<ParseError> for ConvertError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::MissingInput(path) => ConvertError::MissingInput(path),
            ParseError::EmptyInput => ConvertError::EmptyInput,
            ParseError::Io { path, source } => ConvertError::Io { path, source },
        }
    }
}

impl From<GeometryError> for ConvertError {
    fn from(err: GeometryError) -> Self {
        match err {
            GeometryError::InsufficientPoints { section, points } => {
                ConvertError::InsufficientPoints { section, points }
            }
            GeometryError::DuplicateNodeName { name } => ConvertError::DuplicateNodeName(name),
            GeometryError::NoSegments => ConvertError::NoSegments,
        }
    }
}
