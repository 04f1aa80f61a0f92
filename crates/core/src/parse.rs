//! Document-level entry points: scan, tokenize and build in one pass.

use serde::Serialize;
use std::path::Path;

use crate::StructureError;
use crate::builder::{FeatureTable, StructureBuilder};
use crate::scanner::{FeatureLine, scan};
use crate::tokenizer::tokenize;
use crate::vocabulary::Vocabulary;

/// A parsed document together with the lines it was built from.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedDocument {
    /// Source path, when the document came from disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Number of physical lines in the source.
    pub line_count: usize,
    /// Lines selected by the scanner.
    pub feature_lines: Vec<FeatureLine>,
    /// The structural table.
    pub table: FeatureTable,
}

/// Parses LaTeX source into its feature table.
pub fn parse_document(text: &str, vocabulary: &Vocabulary) -> Result<FeatureTable, StructureError> {
    parse_source(text, vocabulary).map(|document| document.table)
}

/// Parses LaTeX source, keeping the selected feature lines.
pub fn parse_source(text: &str, vocabulary: &Vocabulary) -> Result<ParsedDocument, StructureError> {
    let feature_lines = scan(text, vocabulary);
    let mut builder = StructureBuilder::new(vocabulary);
    for line in &feature_lines {
        for directive in tokenize(line)? {
            builder.push(directive)?;
        }
    }
    let table = builder.finish();
    log::debug!(
        "Built {} records from {} feature lines ({} warnings)",
        table.len(),
        feature_lines.len(),
        table.diagnostics.count()
    );

    Ok(ParsedDocument {
        path: None,
        line_count: text.lines().count(),
        feature_lines,
        table,
    })
}

/// Reads and parses a LaTeX file.
pub fn parse_file(
    path: impl AsRef<Path>,
    vocabulary: &Vocabulary,
) -> Result<ParsedDocument, StructureError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    log::info!(
        "Read \"{}\" lines from \"{}\"",
        text.lines().count(),
        path.display()
    );
    let mut document = parse_source(&text, vocabulary)?;
    document.path = Some(path.display().to_string());
    Ok(document)
}
