//! Feature table renderers.
//!
//! # Module Structure
//!
//! - `types` - Scope and heading metadata types
//! - `context` - Rendering context tracking open scopes and anchors
//! - `outline` - Nested outline tree rendering
//! - `table` - Tabular renderings (HTML, delimited text, JSON)

mod context;
pub mod outline;
pub mod table;
mod types;

pub use context::Context;
pub use outline::{render_outline, render_outline_with_headings};
pub use table::{COLUMNS, render_delimited, render_json, render_table};
pub use types::{HeadingEntry, OutlineResult, Scope};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use texskel_core::Vocabulary;

/// Rendering options for the outline renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineOptions {
    /// Keys rendered as file-inclusion lines.
    #[serde(default)]
    pub inclusion_keys: BTreeSet<String>,
    /// Indentation unit written per open scope.
    #[serde(default = "default_indent")]
    pub indent: String,
    /// Whether labels become `id` anchors.
    #[serde(default = "default_anchors")]
    pub anchors: bool,
}

impl OutlineOptions {
    /// Options taking inclusion keys from a vocabulary.
    pub fn from_vocabulary(vocabulary: &Vocabulary) -> Self {
        Self {
            inclusion_keys: vocabulary.inclusion_keys.clone(),
            indent: default_indent(),
            anchors: default_anchors(),
        }
    }

    /// Returns true for keys rendered as inclusions (starred variants included).
    pub fn is_inclusion(&self, key: &str) -> bool {
        self.inclusion_keys.contains(Vocabulary::canonical_key(key))
    }
}

fn default_indent() -> String {
    "  ".to_string()
}

fn default_anchors() -> bool {
    true
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self::from_vocabulary(&Vocabulary::default())
    }
}
