//! Page template filling.
//!
//! A page template is plain HTML carrying the markers `{{table}}`, `{{tree}}`
//! and `{{raw}}`. Markers are replaced in a single left-to-right pass, so
//! inserted content is never scanned for markers again.

use html_escape::encode_text;
use texskel_core::ParsedDocument;

use crate::renderer::{OutlineOptions, render_outline, render_table};

/// Marker replaced by the HTML feature table.
pub const TABLE_MARKER: &str = "{{table}}";
/// Marker replaced by the outline tree.
pub const TREE_MARKER: &str = "{{tree}}";
/// Marker replaced by the escaped feature lines.
pub const RAW_MARKER: &str = "{{raw}}";

static DEFAULT_TEMPLATE: &str = include_str!("../templates/page.html");

/// Returns the embedded default page template.
pub fn default_template() -> &'static str {
    DEFAULT_TEMPLATE
}

/// Rendered fragments inserted into a page template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageParts {
    /// Replaces `{{table}}`.
    pub table: String,
    /// Replaces `{{tree}}`.
    pub tree: String,
    /// Replaces `{{raw}}`.
    pub raw: String,
}

impl PageParts {
    /// Renders every fragment for a parsed document.
    pub fn from_document(document: &ParsedDocument, options: &OutlineOptions) -> Self {
        let records = &document.table.records;
        let mut raw = String::from("<pre class=\"source\">");
        for (index, line) in document.feature_lines.iter().enumerate() {
            if index > 0 {
                raw.push('\n');
            }
            raw.push_str(&encode_text(&line.raw));
        }
        raw.push_str("</pre>");

        Self {
            table: render_table(records),
            tree: render_outline(records, options),
            raw,
        }
    }

    fn get(&self, marker: &str) -> Option<&str> {
        match marker {
            TABLE_MARKER => Some(&self.table),
            TREE_MARKER => Some(&self.tree),
            RAW_MARKER => Some(&self.raw),
            _ => None,
        }
    }
}

/// Replaces the three markers of `template` with the given parts.
///
/// Every occurrence of a marker is replaced. Unknown `{{...}}` sequences are
/// copied unchanged; a marker absent from the template is logged.
pub fn fill_template(template: &str, parts: &PageParts) -> String {
    for marker in [TABLE_MARKER, TREE_MARKER, RAW_MARKER] {
        if !template.contains(marker) {
            log::warn!("Template has no {} marker", marker);
        }
    }

    let mut out = String::with_capacity(
        template.len() + parts.table.len() + parts.tree.len() + parts.raw.len(),
    );
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];
        let marker = [TABLE_MARKER, TREE_MARKER, RAW_MARKER]
            .into_iter()
            .find(|marker| candidate.starts_with(marker));
        if let Some(marker) = marker
            && let Some(content) = parts.get(marker)
        {
            out.push_str(content);
            rest = &candidate[marker.len()..];
        } else {
            // Step one brace so `{{{tree}}}` still finds its marker.
            out.push('{');
            rest = &candidate[1..];
        }
    }
    out.push_str(rest);
    out
}

/// Renders a full page for a parsed document.
pub fn render_page(document: &ParsedDocument, template: &str, options: &OutlineOptions) -> String {
    fill_template(template, &PageParts::from_document(document, options))
}
