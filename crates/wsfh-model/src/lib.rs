//! FastHenry primitives (nodes, segments, ports) derived from parsed sections.

mod naming;
mod ordering;

use std::collections::{BTreeMap, HashSet};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wsfh_inp::Point;

pub use naming::NodeNaming;
pub use ordering::{Digits, SectionKey, SuffixKey, section_sort_key, sorted_section_names};

pub const DEFAULT_SEG_WIDTH: f64 = 0.25;
pub const DEFAULT_SEG_HEIGHT: f64 = 0.035;

/// Trace cross-section, in the same length units as the coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossSection {
    pub width: f64,
    pub height: f64,
}

impl Default for CrossSection {
    fn default() -> Self {
        Self {
            width: DEFAULT_SEG_WIDTH,
            height: DEFAULT_SEG_HEIGHT,
        }
    }
}

/// Per-section cross-section overrides keyed by section name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionOverrides(BTreeMap<String, CrossSection>);

impl SectionOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, section: impl Into<String>, cross_section: CrossSection) -> Self {
        self.0.insert(section.into(), cross_section);
        self
    }

    pub fn get(&self, section: &str) -> Option<CrossSection> {
        self.0.get(section).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, CrossSection)> for SectionOverrides {
    fn from_iter<T: IntoIterator<Item = (String, CrossSection)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// What to do with a section that has fewer than two points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortSectionPolicy {
    /// Abort the build with [`GeometryError::InsufficientPoints`].
    #[default]
    Strict,
    /// Leave the section out of the deck.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeometryOptions {
    pub default: CrossSection,
    pub overrides: SectionOverrides,
    pub short_sections: ShortSectionPolicy,
    pub naming: NodeNaming,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub start: String,
    pub end: String,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Port {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionGeometry {
    pub name: String,
    pub nodes: Vec<Node>,
    pub segments: Vec<Segment>,
    pub port: Port,
}

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error(
        "section '{section}' only has {points} point(s); at least two are required to build a FastHenry segment"
    )]
    InsufficientPoints { section: String, points: usize },

    #[error("node name '{name}' is produced by more than one section point")]
    DuplicateNodeName { name: String },

    #[error(
        "no segments were generated; ensure each Section-* entry contains at least two coordinates"
    )]
    NoSegments,
}

/// Geometry for every section that made it into the deck, in emission order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GeometryModel {
    pub sections: Vec<SectionGeometry>,
}

impl GeometryModel {
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.sections.iter().flat_map(|s| s.nodes.iter())
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.sections.iter().flat_map(|s| s.segments.iter())
    }

    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.sections.iter().map(|s| &s.port)
    }

    pub fn node_count(&self) -> usize {
        self.sections.iter().map(|s| s.nodes.len()).sum()
    }

    pub fn segment_count(&self) -> usize {
        self.sections.iter().map(|s| s.segments.len()).sum()
    }

    pub fn port_count(&self) -> usize {
        self.sections.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct GeometryBuilder {
    options: GeometryOptions,
}

impl GeometryBuilder {
    pub fn new(options: GeometryOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GeometryOptions {
        &self.options
    }

    pub fn build(
        &self,
        sections: &BTreeMap<String, Vec<Point>>,
    ) -> Result<GeometryModel, GeometryError> {
        let mut model = GeometryModel::default();
        let mut seen = HashSet::<String>::new();

        for name in sorted_section_names(sections.keys()) {
            let points = &sections[name];
            if points.len() < 2 {
                match self.options.short_sections {
                    ShortSectionPolicy::Strict => {
                        return Err(GeometryError::InsufficientPoints {
                            section: name.to_string(),
                            points: points.len(),
                        });
                    }
                    ShortSectionPolicy::Skip => {
                        warn!(
                            "skipping section '{name}': {} point(s), need at least 2",
                            points.len()
                        );
                        continue;
                    }
                }
            }

            let geometry = self.build_section(name, points);
            for node in &geometry.nodes {
                if !seen.insert(node.name.clone()) {
                    return Err(GeometryError::DuplicateNodeName {
                        name: node.name.clone(),
                    });
                }
            }
            debug!(
                "section '{name}': {} node(s), {} segment(s)",
                geometry.nodes.len(),
                geometry.segments.len()
            );
            model.sections.push(geometry);
        }

        if model.segment_count() == 0 {
            return Err(GeometryError::NoSegments);
        }
        Ok(model)
    }

    /// Chains `points` in parse order; callers guarantee at least two points.
    fn build_section(&self, name: &str, points: &[Point]) -> SectionGeometry {
        let cross = self
            .options
            .overrides
            .get(name)
            .unwrap_or(self.options.default);

        let nodes: Vec<Node> = points
            .iter()
            .map(|p| Node {
                name: self.options.naming.node_name(name, p.index),
                x: p.x,
                y: p.y,
                z: p.z,
            })
            .collect();

        let segments = nodes
            .windows(2)
            .map(|pair| Segment {
                start: pair[0].name.clone(),
                end: pair[1].name.clone(),
                width: cross.width,
                height: cross.height,
            })
            .collect();

        let port = Port {
            start: nodes[0].name.clone(),
            end: nodes[nodes.len() - 1].name.clone(),
        };

        SectionGeometry {
            name: name.to_string(),
            nodes,
            segments,
            port,
        }
    }
}
