//! Type definitions for the outline renderer.

use serde::Serialize;

/// Represents the element currently open in the outline tree.
///
/// Used in the Context stack so that every opened wrapper is closed with
/// the matching tag, in reverse order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Outline root wrapper (`<div class="outline">`).
    Root,
    /// One section nesting level; the payload is its depth (1-based).
    Level(usize),
}

impl Scope {
    /// Opening tag for this scope.
    pub fn open_tag(self) -> String {
        match self {
            Scope::Root => "<div class=\"outline\">".to_string(),
            Scope::Level(depth) => {
                format!("<div class=\"outline-level\" data-depth=\"{}\">", depth)
            }
        }
    }

    /// Closing tag for this scope.
    pub fn close_tag(self) -> &'static str {
        "</div>"
    }
}

/// Heading metadata collected while rendering the outline.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct HeadingEntry {
    /// Tracking depth (1 for outermost headings).
    pub depth: usize,
    /// Index of the heading record in the table.
    pub record: usize,
    /// Anchor id, when the heading carries a label.
    pub anchor: Option<String>,
    /// Visible heading text.
    pub text: String,
}

/// Rendered outline tree plus the headings it contains.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct OutlineResult {
    /// Nested HTML fragment.
    pub html: String,
    /// Headings in document order.
    pub headings: Vec<HeadingEntry>,
}
