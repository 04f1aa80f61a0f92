#![deny(missing_docs)]
//! texskel core: LaTeX directive tokenizer, feature scanner and structure builder.

/// Anchor id generation for labels.
pub mod anchor;
/// Structure builder and the feature table.
pub mod builder;
/// Core error and diagnostic types.
pub mod error;
/// Document-level parse entry points.
pub mod parse;
/// Feature line selection.
pub mod scanner;
/// Directive tokenizer.
pub mod tokenizer;
/// Verbatim environment tracking.
pub mod verbatim;
/// Recognition vocabulary.
pub mod vocabulary;

pub use anchor::{AnchorSet, anchorize};
pub use builder::{FeatureRecord, FeatureTable, StructureBuilder, build};
pub use error::{LabelPlacement, ParseDiagnostics, ParseWarning, SourceLocation, StructureError};
pub use parse::{ParsedDocument, parse_document, parse_file, parse_source};
pub use scanner::{FeatureLine, scan};
pub use tokenizer::{Directive, tokenize, tokenize_line};
pub use verbatim::{LineScanOutcome, VerbatimPhase, VerbatimState, advance_verbatim_state};
pub use vocabulary::{Vocabulary, VocabularyError};
