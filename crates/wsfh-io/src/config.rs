use std::fs;
use std::path::{Path, PathBuf};

use wsfh_model::{GeometryOptions, SectionOverrides};

use crate::compare::DEFAULT_DIFF_LIMIT;
use crate::deck::DeckOptions;
use crate::error::{ConvertError, Result};

/// Fully resolved settings for one conversion run.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertConfig {
    pub geometry: GeometryOptions,
    pub deck: DeckOptions,
    /// Defaults to the input path with an `.inp` extension.
    pub output: Option<PathBuf>,
    pub verify_against: Option<PathBuf>,
    pub diff_limit: usize,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            geometry: GeometryOptions::default(),
            deck: DeckOptions::default(),
            output: None,
            verify_against: None,
            diff_limit: DEFAULT_DIFF_LIMIT,
        }
    }
}

impl ConvertConfig {
    pub fn output_path(&self, input: &Path) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(input))
    }
}

pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("inp")
}

/// Reads a `{"Section-1": {"width": .., "height": ..}}` overrides table.
pub fn load_overrides(path: impl AsRef<Path>) -> Result<SectionOverrides> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|err| ConvertError::io(path, err))?;
    serde_json::from_slice(&bytes).map_err(|source| ConvertError::Json {
        path: path.to_path_buf(),
        source,
    })
}
