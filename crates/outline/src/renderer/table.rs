//! Tabular renderings of the feature table.

use csv::{Terminator, WriterBuilder};
use html_escape::encode_text;
use texskel_core::{FeatureRecord, FeatureTable};

/// Column headers shared by every tabular rendering.
pub const COLUMNS: [&str; 10] = [
    "index",
    "key",
    "params",
    "values",
    "label",
    "tracking",
    "expand_to",
    "level",
    "seek",
    "line_count",
];

/// Renders the records as an HTML `<table>`.
pub fn render_table(records: &[FeatureRecord]) -> String {
    let mut html = String::with_capacity(256 + records.len() * 128);
    html.push_str("<table class=\"feature-table\">\n");
    html.push_str("  <thead>\n    <tr>");
    for column in COLUMNS {
        html.push_str("<th>");
        html.push_str(column);
        html.push_str("</th>");
    }
    html.push_str("</tr>\n  </thead>\n");

    html.push_str("  <tbody>\n");
    for (index, record) in records.iter().enumerate() {
        html.push_str(&format!("    <tr data-record=\"{}\">", index));
        for cell in cells(index, record) {
            html.push_str("<td>");
            html.push_str(&encode_text(&cell));
            html.push_str("</td>");
        }
        html.push_str("</tr>\n");
    }
    html.push_str("  </tbody>\n</table>\n");
    html
}

/// Renders a header row plus one row per record, separated by `delimiter`.
///
/// Quoting follows the `csv` writer: fields containing the delimiter, a
/// double quote or a line break are quoted, with embedded quotes doubled.
pub fn render_delimited(
    records: &[FeatureRecord],
    delimiter: u8,
) -> Result<String, csv::Error> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(COLUMNS)?;
    for (index, record) in records.iter().enumerate() {
        writer.write_record(cells(index, record))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Serializes the table, diagnostics included, as pretty JSON.
pub fn render_json(table: &FeatureTable) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(table)
}

fn cells(index: usize, record: &FeatureRecord) -> [String; 10] {
    [
        index.to_string(),
        record.key.clone(),
        record.params.join(", "),
        record.value_text(),
        record.label_text().unwrap_or_default(),
        record
            .tracking
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(" "),
        optional(record.expand_to),
        optional(record.level),
        record.seek.to_string(),
        record.line_count.to_string(),
    ]
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
