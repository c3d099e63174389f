//! The parse → build → write → verify run behind the `wsfh` binary.

use std::path::{Path, PathBuf};

use log::debug;
use wsfh_inp::{Units, WireSections};
use wsfh_model::GeometryBuilder;

use crate::compare::{Comparison, compare_with_reference};
use crate::config::ConvertConfig;
use crate::deck::{DeckSummary, write_deck};
use crate::error::{ConvertError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub reference: PathBuf,
    pub outcome: Comparison,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    pub output: PathBuf,
    pub units: Units,
    pub sigma: f64,
    pub summary: DeckSummary,
    /// Present only when a reference deck was requested.
    pub verification: Option<Verification>,
}

impl ConversionReport {
    /// Turns a failed verification into [`ConvertError::DeckMismatch`].
    pub fn into_result(self) -> Result<Self> {
        if let Some(Verification {
            reference,
            outcome: Comparison::Mismatch { diff },
        }) = &self.verification
        {
            return Err(ConvertError::DeckMismatch {
                generated: self.output.clone(),
                reference: reference.clone(),
                diff: diff.clone(),
            });
        }
        Ok(self)
    }
}

/// Runs the whole conversion. The deck is on disk even when verification
/// reports a mismatch; nothing is written when an earlier stage fails.
pub fn convert(input: impl AsRef<Path>, config: &ConvertConfig) -> Result<ConversionReport> {
    let input = input.as_ref();
    if !input.is_file() {
        return Err(ConvertError::MissingInput(input.to_path_buf()));
    }

    let parsed = WireSections::parse_file(input)?;
    if parsed.sections.is_empty() {
        return Err(ConvertError::NoSections);
    }
    debug!(
        "{}: {} section(s), {} point(s)",
        input.display(),
        parsed.sections.len(),
        parsed.total_points()
    );

    let model = GeometryBuilder::new(config.geometry.clone()).build(&parsed.sections)?;

    let output = config.output_path(input);
    let summary = write_deck(&output, parsed.units, &model, &config.deck)
        .map_err(|err| ConvertError::io(&output, err))?;

    let verification = match &config.verify_against {
        Some(reference) => Some(Verification {
            reference: reference.clone(),
            outcome: compare_with_reference(&output, reference, config.diff_limit)?,
        }),
        None => None,
    };

    Ok(ConversionReport {
        output,
        units: parsed.units,
        sigma: config.deck.resolved_sigma(parsed.units),
        summary,
        verification,
    })
}
