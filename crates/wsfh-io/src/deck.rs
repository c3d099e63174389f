//! FastHenry2 deck writer.
//!
//! The layout, number formatting and CRLF terminators reproduce the decks
//! written by FreeCAD's ElectroMagnetic workbench, so a generated deck can be
//! diffed byte-for-byte against one exported from FreeCAD.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};
use wsfh_inp::Units;
use wsfh_model::GeometryModel;

const LINE_END: &str = "\r\n";
const ZERO_EPS: f64 = 1e-12;

const BANNER: [&str; 2] = [
    "* FastHenry input file created using FreeCAD's ElectroMagnetic Workbench",
    "* See http://www.freecad.org, http://www.fastfieldsolvers.com and http://epc-co.com",
];

/// Copper conductivity (5.8e7 S/m) rescaled to the deck's length unit.
pub fn sigma_for_units(units: Units) -> f64 {
    match units {
        Units::M => 5.8e7,
        Units::Cm => 5.8e5,
        Units::Mm => 5.8e4,
    }
}

/// Same as [`sigma_for_units`], falling back to millimeters for unknown tokens.
pub fn sigma_for_unit_token(token: &str) -> f64 {
    sigma_for_units(Units::from_token(token).unwrap_or(Units::Mm))
}

/// Fixed 8-decimal rendering with trailing zeros removed.
///
/// `force_decimal` keeps at least one fractional digit (`0.0`, `58000.0`).
pub fn format_number(value: f64, force_decimal: bool) -> String {
    let value = if value.abs() < ZERO_EPS { 0.0 } else { value };
    let mut text = format!("{value:.8}")
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string();
    // Tiny negatives round to `-0.00000000`.
    if text.is_empty() || text == "-0" {
        text = "0".to_string();
    }
    if force_decimal && !text.contains('.') {
        text.push_str(".0");
    }
    text
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencySweep {
    pub fmin: f64,
    pub fmax: f64,
    /// Points per decade (FastHenry `ndec`).
    pub ndec: f64,
}

impl Default for FrequencySweep {
    fn default() -> Self {
        Self {
            fmin: 1.0,
            fmax: 1e9,
            ndec: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeckOptions {
    /// Explicit conductivity; `None` picks the copper default for the units.
    pub sigma: Option<f64>,
    pub sweep: FrequencySweep,
    pub nhinc: u32,
    pub nwinc: u32,
    pub rh: u32,
    pub rw: u32,
}

impl Default for DeckOptions {
    fn default() -> Self {
        Self {
            sigma: None,
            sweep: FrequencySweep::default(),
            nhinc: 1,
            nwinc: 1,
            rh: 2,
            rw: 2,
        }
    }
}

impl DeckOptions {
    pub fn resolved_sigma(&self, units: Units) -> f64 {
        self.sigma.unwrap_or_else(|| sigma_for_units(units))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeckSummary {
    pub sections: usize,
    pub nodes: usize,
    pub segments: usize,
    pub ports: usize,
}

impl DeckSummary {
    pub fn from_model(model: &GeometryModel) -> Self {
        Self {
            sections: model.sections.len(),
            nodes: model.node_count(),
            segments: model.segment_count(),
            ports: model.port_count(),
        }
    }
}

/// Serializes a geometry model into deck cards.
pub struct DeckWriter<'a> {
    units: Units,
    model: &'a GeometryModel,
    options: &'a DeckOptions,
}

impl<'a> DeckWriter<'a> {
    pub fn new(units: Units, model: &'a GeometryModel, options: &'a DeckOptions) -> Self {
        Self {
            units,
            model,
            options,
        }
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<DeckSummary> {
        self.write_header(out)?;
        self.write_nodes(out)?;
        self.write_segments(out)?;
        self.write_ports(out)?;
        self.write_footer(out)?;
        Ok(DeckSummary::from_model(self.model))
    }

    fn write_header<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for line in BANNER {
            line_to(out, line)?;
        }
        line_to(out, "")?;
        line_to(out, &format!(".units {}", self.units.directive()))?;
        line_to(out, "")?;
        let o = self.options;
        line_to(
            out,
            &format!(
                ".default sigma={} nhinc={} nwinc={} rh={} rw={}",
                format_number(o.resolved_sigma(self.units), true),
                o.nhinc,
                o.nwinc,
                o.rh,
                o.rw
            ),
        )?;
        line_to(out, "")
    }

    fn write_nodes<W: Write>(&self, out: &mut W) -> io::Result<()> {
        line_to(out, "* Nodes")?;
        for node in self.model.nodes() {
            line_to(
                out,
                &format!(
                    "{} x={} y={} z={}",
                    node.name,
                    format_number(node.x, true),
                    format_number(node.y, true),
                    format_number(node.z, true)
                ),
            )?;
        }
        line_to(out, "")
    }

    fn write_segments<W: Write>(&self, out: &mut W) -> io::Result<()> {
        line_to(out, "* Segments")?;
        for (i, seg) in self.model.segments().enumerate() {
            line_to(
                out,
                &format!(
                    "{} {} {} w={} h={}",
                    segment_name(i),
                    seg.start,
                    seg.end,
                    format_number(seg.width, false),
                    format_number(seg.height, false)
                ),
            )?;
        }
        line_to(out, "")
    }

    fn write_ports<W: Write>(&self, out: &mut W) -> io::Result<()> {
        line_to(out, "* Ports")?;
        for port in self.model.ports() {
            line_to(out, &format!(".external {} {}", port.start, port.end))?;
        }
        line_to(out, "")
    }

    fn write_footer<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let sweep = &self.options.sweep;
        line_to(
            out,
            &format!(
                ".freq fmin={} fmax={} ndec={}",
                format_number(sweep.fmin, true),
                format_number(sweep.fmax, true),
                format_number(sweep.ndec, true)
            ),
        )?;
        line_to(out, "")?;
        line_to(out, ".end")
    }
}

/// First segment is unnumbered, the rest carry a 3-digit sequence number.
fn segment_name(seq: usize) -> String {
    if seq == 0 {
        "EFHSegment".to_string()
    } else {
        format!("EFHSegment{seq:03}")
    }
}

fn line_to<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    out.write_all(text.as_bytes())?;
    out.write_all(LINE_END.as_bytes())
}

pub fn render_deck(
    units: Units,
    model: &GeometryModel,
    options: &DeckOptions,
) -> io::Result<(String, DeckSummary)> {
    let mut buf = Vec::<u8>::new();
    let summary = DeckWriter::new(units, model, options).write_to(&mut buf)?;
    let text =
        String::from_utf8(buf).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    Ok((text, summary))
}

pub fn write_deck(
    path: impl AsRef<Path>,
    units: Units,
    model: &GeometryModel,
    options: &DeckOptions,
) -> io::Result<DeckSummary> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let (body, summary) = render_deck(units, model, options)?;
    fs::write(path, body)?;
    info!(
        "wrote {} ({} node(s), {} segment(s))",
        path.display(),
        summary.nodes,
        summary.segments
    );
    Ok(summary)
}

fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
