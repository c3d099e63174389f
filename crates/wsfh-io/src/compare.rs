//! Line-level comparison of a generated deck against a known-good reference.

use std::fs;
use std::path::Path;

use similar::TextDiff;

use crate::error::{ConvertError, Result};

pub const DEFAULT_DIFF_LIMIT: usize = 200;
pub const TRUNCATION_MARKER: &str = "... (diff truncated)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    Match,
    /// Unified diff from the reference to the generated deck.
    Mismatch { diff: String },
}

impl Comparison {
    pub fn is_match(&self) -> bool {
        matches!(self, Comparison::Match)
    }
}

pub fn compare_with_reference(
    generated: impl AsRef<Path>,
    reference: impl AsRef<Path>,
    diff_limit: usize,
) -> Result<Comparison> {
    let generated = generated.as_ref();
    let reference = reference.as_ref();
    if !reference.is_file() {
        return Err(ConvertError::ReferenceMissing(reference.to_path_buf()));
    }

    let gen_text = read_text(generated)?;
    let ref_text = read_text(reference)?;
    Ok(compare_texts(
        &ref_text,
        &gen_text,
        &reference.display().to_string(),
        &generated.display().to_string(),
        diff_limit,
    ))
}

/// Compares line by line, so CRLF and LF files with equal lines match.
pub fn compare_texts(
    reference: &str,
    generated: &str,
    reference_label: &str,
    generated_label: &str,
    diff_limit: usize,
) -> Comparison {
    let ref_text = normalized(reference);
    let gen_text = normalized(generated);
    if ref_text == gen_text {
        return Comparison::Match;
    }

    let diff = TextDiff::from_lines(ref_text.as_str(), gen_text.as_str());
    let rendered = diff
        .unified_diff()
        .context_radius(3)
        .header(reference_label, generated_label)
        .to_string();

    let mut preview = Vec::<&str>::new();
    for (idx, line) in rendered.lines().enumerate() {
        preview.push(line);
        if idx + 1 >= diff_limit {
            preview.push(TRUNCATION_MARKER);
            break;
        }
    }
    Comparison::Mismatch {
        diff: preview.join("\n"),
    }
}

fn normalized(text: &str) -> String {
    text.lines().map(|line| format!("{line}\n")).collect()
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|err| ConvertError::io(path, err))
}
