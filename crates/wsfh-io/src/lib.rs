//! I/O support for the Wire Sections → FastHenry converter.
//!
//! This crate provides:
//! - **Deck writer** producing FastHenry2 input in the FreeCAD EM workbench layout
//! - **Reference comparison** with a truncated unified diff
//! - **Overrides loading** from JSON
//! - **Conversion pipeline** tying parser, geometry builder and writer together

pub mod compare;
mod config;
pub mod deck;
pub mod error;
mod pipeline;

pub use compare::{Comparison, DEFAULT_DIFF_LIMIT, compare_texts, compare_with_reference};
pub use config::{ConvertConfig, default_output_path, load_overrides};
pub use deck::{
    DeckOptions, DeckSummary, DeckWriter, FrequencySweep, format_number, render_deck,
    sigma_for_unit_token, sigma_for_units, write_deck,
};
pub use error::{ConvertError, Result};
pub use pipeline::{ConversionReport, Verification, convert};
