//! Structure builder: folds directives into the flat feature table.
//!
//! Records live in an append-only vector and refer to each other by index.
//! Two explicit stacks carry the nesting state: the section tracking path and
//! the open-block stack of begin records. Only `label` and `expand_to` are
//! written after a record has been appended.

use serde::Serialize;

use crate::error::{LabelPlacement, ParseDiagnostics, ParseWarning, SourceLocation, StructureError};
use crate::tokenizer::{Directive, ESCAPE, VALUE_CLOSE, VALUE_OPEN, read_group};
use crate::vocabulary::Vocabulary;

/// One row of the structural table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureRecord {
    /// Directive key.
    pub key: String,
    /// Bracket-delimited parameters.
    pub params: Vec<String>,
    /// Brace-delimited values.
    pub values: Vec<String>,
    /// Label values attached after the fact.
    pub label: Option<Vec<String>>,
    /// Indices of the open section headings, outermost first (headings only).
    pub tracking: Vec<usize>,
    /// Index of the matching end record (begin records only).
    pub expand_to: Option<usize>,
    /// Hierarchy level (headings only).
    pub level: Option<i32>,
    /// Byte offset of the source line.
    pub seek: usize,
    /// 1-based source line number.
    pub line_count: usize,
}

impl From<Directive> for FeatureRecord {
    fn from(directive: Directive) -> Self {
        Self {
            key: directive.key,
            params: directive.params,
            values: directive.values,
            label: None,
            tracking: Vec::new(),
            expand_to: None,
            level: None,
            seek: directive.seek,
            line_count: directive.line_number,
        }
    }
}

impl FeatureRecord {
    /// Section headings are the records with a tracking path.
    pub fn is_section(&self) -> bool {
        !self.tracking.is_empty()
    }

    /// Begin records whose end has been resolved.
    pub fn opens_block(&self) -> bool {
        self.expand_to.is_some()
    }

    /// Values joined for display.
    pub fn value_text(&self) -> String {
        self.values.join(", ")
    }

    /// Label values joined for display.
    pub fn label_text(&self) -> Option<String> {
        self.label.as_ref().map(|label| label.join(", "))
    }

    fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line_count, self.seek)
    }
}

/// The builder's output: records in document order plus recovered anomalies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeatureTable {
    /// Records in document order.
    pub records: Vec<FeatureRecord>,
    /// Non-fatal warnings raised while building.
    pub diagnostics: ParseDiagnostics,
}

impl FeatureTable {
    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no directive was recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at `index`.
    pub fn get(&self, index: usize) -> Option<&FeatureRecord> {
        self.records.get(index)
    }

    /// Iterates over the records in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, FeatureRecord> {
        self.records.iter()
    }

    /// Consumes the table, keeping only the records.
    pub fn into_records(self) -> Vec<FeatureRecord> {
        self.records
    }
}

/// Incremental table builder. One instance per document.
pub struct StructureBuilder<'v> {
    vocabulary: &'v Vocabulary,
    records: Vec<FeatureRecord>,
    level: i32,
    tracking: Vec<usize>,
    open_blocks: Vec<usize>,
    diagnostics: ParseDiagnostics,
}

impl<'v> StructureBuilder<'v> {
    /// Creates an empty builder over a vocabulary.
    pub fn new(vocabulary: &'v Vocabulary) -> Self {
        Self {
            vocabulary,
            records: Vec::new(),
            level: 0,
            tracking: Vec::new(),
            open_blocks: Vec::new(),
            diagnostics: ParseDiagnostics::new(),
        }
    }

    /// Number of currently open (non-root) blocks.
    pub fn inner_count(&self) -> usize {
        self.open_blocks.len()
    }

    /// Level of the most recent section heading.
    pub fn current_level(&self) -> i32 {
        self.level
    }

    /// Current tracking path.
    pub fn tracking(&self) -> &[usize] {
        &self.tracking
    }

    /// Records appended so far.
    pub fn records(&self) -> &[FeatureRecord] {
        &self.records
    }

    /// Processes one directive and returns the index of its record.
    pub fn push(&mut self, directive: Directive) -> Result<usize, StructureError> {
        let vocabulary = self.vocabulary;
        let mut record = FeatureRecord::from(directive);

        if (vocabulary.is_begin(&record.key) || vocabulary.is_end(&record.key))
            && vocabulary.is_root_environment(&record.values)
        {
            return Ok(self.append(record));
        }

        let current_index = self.records.len();

        if let Some(level) = vocabulary.level_of(&record.key) {
            self.level = level;
            while self.tracking.last().is_some_and(|&top| {
                self.records[top]
                    .level
                    .is_some_and(|open_level| open_level >= level)
            }) {
                self.tracking.pop();
            }
            self.tracking.push(current_index);
            record.tracking = self.tracking.clone();
            record.level = Some(level);
            self.extract_nested_label(&mut record);
        }

        if vocabulary.is_begin(&record.key) {
            self.extract_nested_label(&mut record);
            self.open_blocks.push(current_index);
        }

        if vocabulary.is_end(&record.key) {
            let Some(begin_index) = self.open_blocks.pop() else {
                return Err(StructureError::unbalanced_end(
                    &record.values,
                    record.line_count,
                ));
            };
            let begin = &mut self.records[begin_index];
            if begin.values != record.values {
                return Err(StructureError::mismatch(
                    &begin.values,
                    begin.line_count,
                    &record.values,
                    record.line_count,
                ));
            }
            begin.expand_to = Some(current_index);
        }

        if vocabulary.is_label(&record.key) {
            self.attach_label(&record);
        }

        Ok(self.append(record))
    }

    /// Finishes the pass, warning about blocks that were never closed.
    pub fn finish(mut self) -> FeatureTable {
        for &index in &self.open_blocks {
            let record = &self.records[index];
            self.diagnostics.add_warning(ParseWarning::UnclosedBlock {
                location: record.location(),
                environment: record.values.join("}{"),
            });
        }
        FeatureTable {
            records: self.records,
            diagnostics: self.diagnostics,
        }
    }

    fn append(&mut self, record: FeatureRecord) -> usize {
        log::trace!(
            "Record {}: \\{} {:?} (line {})",
            self.records.len(),
            record.key,
            record.values,
            record.line_count
        );
        self.records.push(record);
        self.records.len() - 1
    }

    /// Label goes to the innermost open block. Outside any block it is folded
    /// onto the innermost open section heading, with a warning.
    fn attach_label(&mut self, label: &FeatureRecord) {
        if let Some(&open) = self.open_blocks.last() {
            self.records[open].label = Some(label.values.clone());
            return;
        }

        let placement = match self.tracking.last() {
            Some(&section) => {
                self.records[section].label = Some(label.values.clone());
                LabelPlacement::FoldedOntoSection
            }
            None => LabelPlacement::Unattached,
        };
        self.diagnostics.add_warning(ParseWarning::MisplacedLabel {
            location: label.location(),
            label: label.value_text(),
            placement,
        });
    }

    /// Pulls a label directive out of a heading's or begin marker's value
    /// text (`\section{Intro \label{sec:intro}}`). The cleaned values are
    /// what a matching end marker is compared against.
    fn extract_nested_label(&mut self, record: &mut FeatureRecord) {
        let location = record.location();
        let mut found = None;
        for value in record.values.iter_mut() {
            let Some((cleaned, label)) = take_nested_label(value, self.vocabulary) else {
                continue;
            };
            *value = cleaned;
            self.diagnostics.add_warning(ParseWarning::MisplacedLabel {
                location: location.clone(),
                label: label.clone(),
                placement: LabelPlacement::NestedInValue,
            });
            found = Some(label);
        }
        if let Some(label) = found {
            record.label = Some(vec![label]);
        }
    }
}

/// Finds `\<label-key>{...}` inside a value and returns the value without it
/// plus the label text.
fn take_nested_label(value: &str, vocabulary: &Vocabulary) -> Option<(String, String)> {
    for key in &vocabulary.label_keys {
        let marker = format!("{}{}{}", ESCAPE, key, VALUE_OPEN);
        let Some(start) = value.find(&marker) else {
            continue;
        };
        let open_at = start + marker.len() - VALUE_OPEN.len_utf8();
        let (label, end) = read_group(value, open_at, VALUE_OPEN, VALUE_CLOSE)?;
        let cleaned = format!("{}{}", value[..start].trim_end(), &value[end..]);
        return Some((cleaned.trim().to_string(), label.to_string()));
    }
    None
}

/// Builds the feature table from directives in document order.
pub fn build<I>(directives: I, vocabulary: &Vocabulary) -> Result<FeatureTable, StructureError>
where
    I: IntoIterator<Item = Directive>,
{
    let mut builder = StructureBuilder::new(vocabulary);
    for directive in directives {
        builder.push(directive)?;
    }
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(key: &str, value: &str, line: usize) -> Directive {
        Directive::new(key, line * 10, line).with_value(value)
    }

    fn bare(key: &str, line: usize) -> Directive {
        Directive::new(key, line * 10, line)
    }

    fn table(directives: Vec<Directive>) -> FeatureTable {
        build(directives, &Vocabulary::default()).expect("document should build")
    }

    #[test]
    fn sibling_sections_replace_each_other() {
        let table = table(vec![
            d("section", "A", 1),
            d("subsection", "A.1", 2),
            d("subsection", "A.2", 3),
            d("section", "B", 4),
        ]);
        assert_eq!(table.records[0].tracking, vec![0]);
        assert_eq!(table.records[1].tracking, vec![0, 1]);
        assert_eq!(table.records[2].tracking, vec![0, 2]);
        assert_eq!(table.records[3].tracking, vec![3]);
        assert_eq!(table.records[3].level, Some(1));
    }

    #[test]
    fn skipped_levels_keep_ancestors() {
        let table = table(vec![
            d("part", "I", 1),
            d("subsubsection", "deep", 2),
            d("section", "S", 3),
        ]);
        assert_eq!(table.records[1].tracking, vec![0, 1]);
        assert_eq!(table.records[2].tracking, vec![0, 2]);
    }

    #[test]
    fn non_section_records_have_no_tracking() {
        let table = table(vec![d("section", "A", 1), d("caption", "c", 2)]);
        assert!(table.records[1].tracking.is_empty());
        assert_eq!(table.records[1].level, None);
        assert_eq!(table.records[1].expand_to, None);
    }

    #[test]
    fn nested_blocks_resolve_innermost_first() {
        let table = table(vec![
            d("begin", "figure", 1),
            d("begin", "center", 2),
            d("end", "center", 3),
            d("end", "figure", 4),
        ]);
        assert_eq!(table.records[0].expand_to, Some(3));
        assert_eq!(table.records[1].expand_to, Some(2));
        assert_eq!(table.records[2].expand_to, None);
    }

    #[test]
    fn root_document_is_recorded_but_not_tracked() {
        let table = table(vec![
            d("begin", "document", 1),
            d("section", "A", 2),
            d("end", "document", 3),
        ]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.records[0].expand_to, None);
        assert_eq!(table.records[1].tracking, vec![1]);
        assert!(!table.diagnostics.has_warnings());
    }

    #[test]
    fn lone_end_is_unbalanced() {
        let err = build(vec![d("end", "figure", 5)], &Vocabulary::default()).unwrap_err();
        assert!(matches!(err, StructureError::UnbalancedEnd { line: 5, .. }), "{err:?}");
    }

    #[test]
    fn mismatched_end_reports_both_lines() {
        let err = build(
            vec![d("begin", "figure", 2), d("end", "table", 6)],
            &Vocabulary::default(),
        )
        .unwrap_err();
        match err {
            StructureError::BeginEndMismatch {
                begin_line,
                end_line,
                ..
            } => {
                assert_eq!(begin_line, 2);
                assert_eq!(end_line, 6);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn values_must_match_exactly() {
        let begin = d("begin", "tabular", 1).with_value("cc");
        let err = build(vec![begin, d("end", "tabular", 2)], &Vocabulary::default()).unwrap_err();
        assert!(matches!(err, StructureError::BeginEndMismatch { .. }));
    }

    #[test]
    fn label_attaches_to_innermost_block() {
        let table = table(vec![
            d("begin", "figure", 1),
            d("begin", "subfigure", 2),
            d("label", "fig:inner", 3),
            d("end", "subfigure", 4),
            d("label", "fig:outer", 5),
            d("end", "figure", 6),
        ]);
        assert_eq!(table.records[1].label_text().as_deref(), Some("fig:inner"));
        assert_eq!(table.records[0].label_text().as_deref(), Some("fig:outer"));
    }

    #[test]
    fn label_nested_in_begin_value_is_extracted() {
        let table = table(vec![
            d("begin", "figure \\label{fig:x}", 1),
            d("end", "figure", 2),
        ]);
        assert_eq!(table.records[0].values, vec!["figure".to_string()]);
        assert_eq!(table.records[0].label_text().as_deref(), Some("fig:x"));
        assert_eq!(table.records[0].expand_to, Some(1));
        assert!(matches!(
            table.diagnostics.warnings[..],
            [ParseWarning::MisplacedLabel {
                placement: LabelPlacement::NestedInValue,
                ..
            }]
        ));
    }

    #[test]
    fn label_outside_blocks_folds_onto_section() {
        let table = table(vec![d("section", "A", 1), d("label", "sec:a", 1)]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].label, Some(vec!["sec:a".to_string()]));
        assert!(matches!(
            table.diagnostics.warnings[0],
            ParseWarning::MisplacedLabel {
                placement: LabelPlacement::FoldedOntoSection,
                ..
            }
        ));
    }

    #[test]
    fn label_with_no_structure_is_unattached() {
        let table = table(vec![d("label", "orphan", 1)]);
        assert!(table.records[0].label.is_none());
        assert!(matches!(
            table.diagnostics.warnings[0],
            ParseWarning::MisplacedLabel {
                placement: LabelPlacement::Unattached,
                ..
            }
        ));
    }

    #[test]
    fn label_nested_in_heading_value_is_extracted() {
        let table = table(vec![d("section", r"Intro \label{sec:intro}", 1)]);
        let record = &table.records[0];
        assert_eq!(record.values, vec!["Intro"]);
        assert_eq!(record.label_text().as_deref(), Some("sec:intro"));
        assert!(matches!(
            table.diagnostics.warnings[0],
            ParseWarning::MisplacedLabel {
                placement: LabelPlacement::NestedInValue,
                ..
            }
        ));
    }

    #[test]
    fn unclosed_block_is_a_warning() {
        let table = table(vec![d("begin", "figure", 1), bare("maketitle", 2)]);
        assert_eq!(table.records[0].expand_to, None);
        assert!(matches!(
            table.diagnostics.warnings[0],
            ParseWarning::UnclosedBlock { .. }
        ));
    }

    #[test]
    fn builder_exposes_inner_count() {
        let vocabulary = Vocabulary::default();
        let mut builder = StructureBuilder::new(&vocabulary);
        builder.push(d("begin", "figure", 1)).unwrap();
        builder.push(d("begin", "center", 2)).unwrap();
        assert_eq!(builder.inner_count(), 2);
        builder.push(d("end", "center", 3)).unwrap();
        assert_eq!(builder.inner_count(), 1);
        builder.push(d("begin", "document", 4)).unwrap();
        assert_eq!(builder.inner_count(), 1);
    }
}
