#![deny(missing_docs)]
//! texskel outline: renders feature tables as outline trees, tables and pages.

/// Outline tree and tabular renderers.
pub mod renderer;
/// Page template filling.
pub mod template;

pub use renderer::{
    COLUMNS, HeadingEntry, OutlineOptions, OutlineResult, render_delimited, render_json,
    render_outline, render_outline_with_headings, render_table,
};
pub use template::{PageParts, default_template, fill_template, render_page};
