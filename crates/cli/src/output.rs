//! Output formats for parsed documents.

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::fmt::Write as _;
use std::path::Path;
use texskel_core::{ParsedDocument, StructureError};
use texskel_outline::{
    OutlineOptions, render_delimited, render_json, render_outline, render_page, render_table,
};

/// What to print for each document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// `index feature-line` pairs
    Lines,
    /// HTML feature table
    Table,
    /// Tab-separated feature table
    Tsv,
    /// Feature table and warnings as JSON
    Json,
    /// Nested HTML outline
    Outline,
    /// Full HTML page built from a template
    Page,
}

impl Format {
    /// Formats that get a `==> path <==` banner when several documents are printed.
    pub fn has_banner(self) -> bool {
        matches!(self, Format::Lines | Format::Tsv | Format::Table | Format::Outline)
    }
}

/// Renders one document in the requested format.
pub fn render(
    format: Format,
    document: &ParsedDocument,
    options: &OutlineOptions,
    template: &str,
) -> Result<String> {
    let records = &document.table.records;
    let rendered = match format {
        Format::Lines => {
            let mut out = String::new();
            for (index, line) in document.feature_lines.iter().enumerate() {
                let _ = writeln!(out, "{} {}", index, line.text);
            }
            out
        }
        Format::Table => render_table(records),
        Format::Tsv => {
            render_delimited(records, b'\t').context("Failed to write tab-separated table")?
        }
        Format::Json => {
            let mut json =
                render_json(&document.table).context("Failed to serialize feature table")?;
            json.push('\n');
            json
        }
        Format::Outline => render_outline(records, options),
        Format::Page => render_page(document, template, options),
    };
    Ok(rendered)
}

/// Describes a failed document, quoting the offending source line when known.
pub fn error_report(path: &Path, error: &StructureError) -> String {
    let mut report = format!("{}: {}", path.display(), error);
    if let Some(line) = error.line()
        && let Ok(source) = std::fs::read_to_string(path)
        && let Some(text) = source.lines().nth(line.saturating_sub(1))
    {
        let _ = write!(report, "\n{:>5} | {}", line, text.trim_end_matches('\r'));
    }
    if let StructureError::BeginEndMismatch { begin, end, .. } = error
        && begin.starts_with(&format!("{}}}{{", end))
    {
        let _ = write!(
            report,
            "\n      = note: end values must repeat every begin group ('{{{}}}')",
            begin
        );
    }
    report
}
