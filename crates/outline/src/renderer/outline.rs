//! Outline tree rendering.
//!
//! Section headings open one nesting level per tracking entry. Before a
//! heading is written the context closes back to the heading's parent depth
//! and opens exactly the levels still missing, so every opened level is
//! closed once and the fragment is well formed by construction.

use super::OutlineOptions;
use super::context::Context;
use super::types::{HeadingEntry, OutlineResult, Scope};
use html_escape::{encode_double_quoted_attribute, encode_text};
use texskel_core::FeatureRecord;

/// Renders the nested outline fragment for a feature table.
pub fn render_outline(records: &[FeatureRecord], options: &OutlineOptions) -> String {
    render_outline_with_headings(records, options).html
}

/// Renders the outline and returns the heading metadata alongside it.
pub fn render_outline_with_headings(
    records: &[FeatureRecord],
    options: &OutlineOptions,
) -> OutlineResult {
    let mut ctx = Context::new(options);
    ctx.enter(Scope::Root);

    for (index, record) in records.iter().enumerate() {
        if record.is_section() {
            render_heading(index, record, &mut ctx);
        } else if let Some(end) = record.expand_to {
            render_block(index, record, records.get(end), &mut ctx);
        } else if options.is_inclusion(&record.key) {
            render_inclusion(index, record, &mut ctx);
        }
    }

    let (html, headings) = ctx.finish();
    log::debug!(
        "Rendered outline with {} headings from {} records",
        headings.len(),
        records.len()
    );
    OutlineResult { html, headings }
}

/// Renders a section heading at its tracking depth.
fn render_heading(index: usize, record: &FeatureRecord, ctx: &mut Context) {
    let depth = record.tracking.len();
    ctx.move_to_depth(depth - 1);
    ctx.move_to_depth(depth);

    let anchor = anchor_for(record, ctx);
    let text = record.value_text();
    let tag = format!("h{}", depth.clamp(1, 6));

    let mut line = format!(
        "<{}{} data-depth=\"{}\" data-record=\"{}\">",
        tag,
        id_attr(anchor.as_deref()),
        depth,
        index
    );
    line.push_str(&encode_text(&text));
    push_label(&mut line, record);
    line.push_str(&format!("</{}>", tag));
    ctx.push_line(&line);

    ctx.headings.push(HeadingEntry {
        depth,
        record: index,
        anchor,
        text,
    });
}

/// Renders a block-opening record as a single descriptive line.
fn render_block(
    index: usize,
    record: &FeatureRecord,
    end: Option<&FeatureRecord>,
    ctx: &mut Context,
) {
    let anchor = anchor_for(record, ctx);
    let environment = record.values.first().map(String::as_str).unwrap_or_default();
    let last_line = end.map_or(record.line_count, |end| end.line_count);

    let mut line = format!(
        "<p class=\"outline-block\"{} data-record=\"{}\">",
        id_attr(anchor.as_deref()),
        index
    );
    line.push_str(&encode_text(environment));
    line.push_str(&format!(" (lines {}-{})", record.line_count, last_line));
    push_label(&mut line, record);
    line.push_str("</p>");
    ctx.push_line(&line);
}

/// Renders a file-inclusion record (`\input`, `\includegraphics`, ...).
fn render_inclusion(index: usize, record: &FeatureRecord, ctx: &mut Context) {
    let line = format!(
        "<p class=\"outline-include\" data-record=\"{}\">{}: {}</p>",
        index,
        encode_text(&record.key),
        encode_text(&record.value_text())
    );
    ctx.push_line(&line);
}

fn anchor_for(record: &FeatureRecord, ctx: &mut Context) -> Option<String> {
    if !ctx.options().anchors {
        return None;
    }
    let label = record.label_text()?;
    Some(ctx.anchor_for(&label))
}

fn id_attr(anchor: Option<&str>) -> String {
    match anchor {
        Some(anchor) => format!(" id=\"{}\"", encode_double_quoted_attribute(anchor)),
        None => String::new(),
    }
}

fn push_label(line: &mut String, record: &FeatureRecord) {
    if let Some(label) = record.label_text() {
        line.push_str(" <code>");
        line.push_str(&encode_text(&label));
        line.push_str("</code>");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use texskel_core::{Vocabulary, parse_document};

    fn outline(source: &str) -> String {
        let table = parse_document(source, &Vocabulary::default()).unwrap();
        render_outline(&table.records, &OutlineOptions::default())
    }

    #[test]
    fn empty_table_renders_empty_root() {
        assert_eq!(
            render_outline(&[], &OutlineOptions::default()),
            "<div class=\"outline\">\n</div>\n"
        );
    }

    #[test]
    fn opened_and_closed_levels_balance() {
        let html = outline(
            "\\section{A}\n\\subsubsection{deep}\n\\section{B}\n\\subsection{C}\n\\part{P}\n",
        );
        assert_eq!(
            html.matches("<div").count(),
            html.matches("</div>").count(),
            "{html}"
        );
    }

    #[test]
    fn skipped_levels_open_one_wrapper_per_tracking_entry() {
        let html = outline("\\part{P}\n\\subsubsection{deep}\n");
        assert!(html.contains("<h2 data-depth=\"2\" data-record=\"1\">deep</h2>"), "{html}");
        assert_eq!(html.matches("outline-level").count(), 2, "{html}");
    }

    #[test]
    fn heading_depth_is_clamped_to_h6() {
        let vocabulary = Vocabulary::from_yaml_str(
            "level_keys: {a: 0, b: 1, c: 2, d: 3, e: 4, f: 5, g: 6}\n",
        )
        .unwrap();
        let table = parse_document("\\a{}\n\\b{}\n\\c{}\n\\d{}\n\\e{}\n\\f{}\n\\g{7}\n", &vocabulary)
            .unwrap();
        let html = render_outline(&table.records, &OutlineOptions::from_vocabulary(&vocabulary));
        assert!(html.contains("<h6 data-depth=\"7\" data-record=\"6\">7</h6>"), "{html}");
    }

    #[test]
    fn text_is_escaped() {
        let html = outline("\\section{A & <B>}\n");
        assert!(html.contains("A &amp; &lt;B&gt;"), "{html}");
    }

    #[test]
    fn anchors_can_be_disabled() {
        let table = parse_document(
            "\\begin{figure}\n\\label{fig:a}\n\\end{figure}\n",
            &Vocabulary::default(),
        )
        .unwrap();
        let options = OutlineOptions {
            anchors: false,
            ..OutlineOptions::default()
        };
        let html = render_outline(&table.records, &options);
        assert!(!html.contains(" id="), "{html}");
        assert!(html.contains("<code>fig:a</code>"), "{html}");
    }

    #[test]
    fn headings_are_collected() {
        let table = parse_document(
            "\\section{A}\\label{sec:a}\n\\subsection{B}\n",
            &Vocabulary::default(),
        )
        .unwrap();
        let result = render_outline_with_headings(&table.records, &OutlineOptions::default());
        assert_eq!(result.headings.len(), 2);
        assert_eq!(result.headings[0].anchor.as_deref(), Some("sec-a"));
        assert_eq!(result.headings[1].depth, 2);
        assert_eq!(result.headings[1].record, 2);
    }
}
