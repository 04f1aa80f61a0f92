//! Feature scanner: selects the lines worth tokenizing.

use serde::Serialize;

use crate::tokenizer::{ESCAPE, read_key};
use crate::verbatim::{VerbatimPhase, VerbatimState, advance_verbatim_state};
use crate::vocabulary::Vocabulary;

/// Comment character; everything after an unescaped one is dropped.
pub const COMMENT: char = '%';

/// A physical source line whose leading directive is in the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureLine {
    /// The physical line without its terminator.
    pub raw: String,
    /// Normalized content: comment removed, surrounding whitespace trimmed.
    pub text: String,
    /// Byte offset where the physical line starts in the source.
    pub seek: usize,
    /// 1-based line number, counting every physical line.
    pub line_number: usize,
}

/// Scans a document and returns its feature lines in order.
///
/// Only the first directive key on a line decides selection. Lines inside
/// verbatim bodies are never selected.
pub fn scan(text: &str, vocabulary: &Vocabulary) -> Vec<FeatureLine> {
    let mut selected = Vec::new();
    let mut verbatim = VerbatimState::default();
    let mut cursor = 0usize;
    let mut line_number = 0usize;

    while let Some((line, next_cursor)) = next_line(text, cursor) {
        line_number += 1;
        let seek = cursor;
        cursor = next_cursor;

        let raw = line.trim_end_matches('\r');
        let content = if line_number == 1 {
            raw.strip_prefix('\u{feff}').unwrap_or(raw)
        } else {
            raw
        };
        let normalized = strip_comment(content).trim();

        // `%` is literal inside a verbatim body, so the closer is searched
        // in the uncommented line.
        let state_line = match verbatim.phase {
            VerbatimPhase::Inside => content.trim(),
            VerbatimPhase::Outside => normalized,
        };
        let outcome = advance_verbatim_state(state_line, verbatim, vocabulary);
        verbatim = outcome.next_state;
        if outcome.skip {
            log::trace!("Skipping verbatim line {}", line_number);
            continue;
        }

        if !normalized.starts_with(ESCAPE) {
            continue;
        }
        let (key, _) = read_key(normalized, ESCAPE.len_utf8());
        if !vocabulary.is_recognized(key) {
            continue;
        }

        log::debug!("Feature line {}: {}", line_number, normalized);
        selected.push(FeatureLine {
            raw: raw.to_string(),
            text: normalized.to_string(),
            seek,
            line_number,
        });
    }

    log::info!(
        "Parsed \"{}\" feature lines out of \"{}\" lines",
        selected.len(),
        line_number
    );
    selected
}

/// Removes an unescaped `%` comment and everything after it.
pub fn strip_comment(line: &str) -> &str {
    let mut escaped = false;
    for (i, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            ESCAPE => escaped = true,
            COMMENT => return &line[..i],
            _ => {}
        }
    }
    line
}

fn next_line(input: &str, start: usize) -> Option<(&str, usize)> {
    if start >= input.len() {
        return None;
    }

    let bytes = &input.as_bytes()[start..];
    if let Some(pos) = bytes.iter().position(|b| *b == b'\n') {
        let line_end = start + pos;
        Some((&input[start..line_end], line_end + 1))
    } else {
        Some((&input[start..], input.len()))
    }
}
