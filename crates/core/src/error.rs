use serde::Serialize;
use thiserror::Error;

use crate::vocabulary::VocabularyError;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    /// Optional file path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Line number (1-indexed)
    pub line: usize,
    /// Byte offset of the start of the physical line
    pub seek: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, seek: usize) -> Self {
        Self {
            file: None,
            line,
            seek,
        }
    }

    /// Create a source location with file information
    pub fn with_file(file: String, line: usize, seek: usize) -> Self {
        Self {
            file: Some(file),
            line,
            seek,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:{}", file, self.line)
        } else {
            write!(f, "line {}", self.line)
        }
    }
}

/// Fatal errors raised while turning a LaTeX source into a feature table.
///
/// Any of the structural variants means the document cannot be trusted past
/// the reported line; no partial table is produced.
#[derive(Debug, Error)]
pub enum StructureError {
    /// IO error while reading a document.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    /// A `[` or `{` group was still open at the end of its line.
    #[error("Malformed directive at line {line}: unterminated group in '{content}'")]
    MalformedDirective {
        /// Line number (1-indexed)
        line: usize,
        /// Raw line content
        content: String,
    },
    /// An end marker arrived while no block was open.
    #[error("Unbalanced end at line {line}: '{{{values}}}' closes no open block")]
    UnbalancedEnd {
        /// Line number of the end marker
        line: usize,
        /// Values carried by the end marker
        values: String,
    },
    /// An end marker does not close the innermost open block.
    #[error(
        "Begin/end mismatch: '{{{begin}}}' opened at line {begin_line} but '{{{end}}}' closes it at line {end_line}"
    )]
    BeginEndMismatch {
        /// Line of the innermost open begin marker
        begin_line: usize,
        /// Line of the offending end marker
        end_line: usize,
        /// Values of the begin marker
        begin: String,
        /// Values of the end marker
        end: String,
    },
    /// The recognition vocabulary could not be loaded or is inconsistent.
    #[error("Vocabulary error: {0}")]
    Vocabulary(#[from] VocabularyError),
}

impl StructureError {
    /// Create a malformed directive error
    pub fn malformed(content: impl Into<String>, line: usize) -> Self {
        Self::MalformedDirective {
            line,
            content: content.into(),
        }
    }

    /// Create an unbalanced end error
    pub fn unbalanced_end(values: &[String], line: usize) -> Self {
        Self::UnbalancedEnd {
            line,
            values: values.join("}{"),
        }
    }

    /// Create a begin/end mismatch error
    pub fn mismatch(begin: &[String], begin_line: usize, end: &[String], end_line: usize) -> Self {
        Self::BeginEndMismatch {
            begin_line,
            end_line,
            begin: begin.join("}{"),
            end: end.join("}{"),
        }
    }

    /// Line the error points at, when it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            StructureError::MalformedDirective { line, .. } => Some(*line),
            StructureError::UnbalancedEnd { line, .. } => Some(*line),
            StructureError::BeginEndMismatch { end_line, .. } => Some(*end_line),
            StructureError::IoError(_) | StructureError::Vocabulary(_) => None,
        }
    }
}

/// How a label ended up on a record other than an enclosing block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelPlacement {
    /// No block was open; the label went to the innermost open section heading.
    FoldedOntoSection,
    /// No block and no section heading were open; the label is only recorded.
    Unattached,
    /// The label directive sat inside another directive's value text.
    NestedInValue,
}

/// Non-fatal warnings that don't prevent building the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ParseWarning {
    /// Label directive whose attachment needed a corrective heuristic
    MisplacedLabel {
        /// Source location of the label
        location: SourceLocation,
        /// Label text
        label: String,
        /// What the heuristic did
        placement: LabelPlacement,
    },
    /// Begin marker still open at the end of the document
    UnclosedBlock {
        /// Source location of the begin marker
        location: SourceLocation,
        /// Environment values of the begin marker
        environment: String,
    },
}

impl ParseWarning {
    /// Get the location of this warning
    pub fn location(&self) -> &SourceLocation {
        match self {
            ParseWarning::MisplacedLabel { location, .. } => location,
            ParseWarning::UnclosedBlock { location, .. } => location,
        }
    }
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseWarning::MisplacedLabel {
                location,
                label,
                placement,
            } => {
                let what = match placement {
                    LabelPlacement::FoldedOntoSection => "outside any block, attached to section",
                    LabelPlacement::Unattached => "outside any block or section, left unattached",
                    LabelPlacement::NestedInValue => "nested inside a directive value, extracted",
                };
                write!(f, "Misplaced label '{}' ({}): {}", label, location, what)
            }
            ParseWarning::UnclosedBlock {
                location,
                environment,
            } => {
                write!(f, "Unclosed block '{{{}}}' opened at {}", environment, location)
            }
        }
    }
}

/// Collection of parse diagnostics (non-fatal warnings)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseDiagnostics {
    /// List of non-fatal warnings
    pub warnings: Vec<ParseWarning>,
}

impl ParseDiagnostics {
    /// Create a new empty diagnostics collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning to the diagnostics collection, logging it as it goes
    pub fn add_warning(&mut self, warning: ParseWarning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Get total count of all diagnostics
    pub fn count(&self) -> usize {
        self.warnings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_display_with_and_without_file() {
        assert_eq!(SourceLocation::new(12, 340).to_string(), "line 12");
        assert_eq!(
            SourceLocation::with_file("main.tex".to_string(), 12, 340).to_string(),
            "main.tex:12"
        );
    }

    #[test]
    fn mismatch_reports_both_lines() {
        let err = StructureError::mismatch(
            &["figure".to_string()],
            3,
            &["table".to_string()],
            9,
        );
        let message = err.to_string();
        assert!(message.contains("line 3"), "{message}");
        assert!(message.contains("line 9"), "{message}");
        assert!(message.contains("{figure}"), "{message}");
        assert!(message.contains("{table}"), "{message}");
        assert_eq!(err.line(), Some(9));
    }

    #[test]
    fn multi_value_environments_are_braced() {
        let err = StructureError::unbalanced_end(&["tabular".to_string(), "cc".to_string()], 4);
        assert!(err.to_string().contains("'{tabular}{cc}'"), "{err}");
    }

    #[test]
    fn diagnostics_count_warnings() {
        let mut diagnostics = ParseDiagnostics::new();
        assert!(!diagnostics.has_warnings());
        diagnostics.add_warning(ParseWarning::UnclosedBlock {
            location: SourceLocation::new(1, 0),
            environment: "figure".to_string(),
        });
        assert!(diagnostics.has_warnings());
        assert_eq!(diagnostics.count(), 1);
        assert_eq!(diagnostics.warnings[0].location().line, 1);
    }
}
