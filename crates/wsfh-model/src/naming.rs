//! Node label schemes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeNaming {
    /// `N{section}_Node_{index}`, as written by FreeCAD's EM workbench.
    #[default]
    Reference,
    /// `NS{n}_{index}` for `Section-{n}`, shorter but not reference-compatible.
    Compact,
}

impl NodeNaming {
    pub fn node_name(self, section: &str, index: usize) -> String {
        match self {
            NodeNaming::Reference => format!("N{}_Node_{index}", underscored(section)),
            NodeNaming::Compact => format!("N{}_{index}", compact_prefix(section)),
        }
    }
}

fn underscored(name: &str) -> String {
    name.trim().replace(' ', "_")
}

fn compact_prefix(section: &str) -> String {
    let sec = section.trim();
    match sec.rsplit_once('-') {
        Some((base, num)) => {
            let (base, num) = (base.trim(), num.trim());
            if base.to_ascii_lowercase().starts_with("section") {
                format!("S{num}")
            } else {
                underscored(&format!("{base}_{num}"))
            }
        }
        None => underscored(sec),
    }
}
