//! Directive tokenizer.
//!
//! Splits one LaTeX control line into `key[params]{values}` directives.
//! Groups are matched by depth counting on their own bracket pair, and a
//! control escape inside a group protects the next character, so `\{` does
//! not open a nested group.

use serde::Serialize;

use crate::StructureError;
use crate::scanner::FeatureLine;

/// Control-escape character that starts every directive.
pub const ESCAPE: char = '\\';
/// Opens a parameter group.
pub const PARAM_OPEN: char = '[';
/// Closes a parameter group.
pub const PARAM_CLOSE: char = ']';
/// Opens a value group.
pub const VALUE_OPEN: char = '{';
/// Closes a value group.
pub const VALUE_CLOSE: char = '}';

/// One parsed `key[params]{values}` control token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directive {
    /// Directive key without the leading escape (e.g. `section`, `begin`).
    pub key: String,
    /// Bracket-delimited parameters, in source order.
    pub params: Vec<String>,
    /// Brace-delimited values, in source order.
    pub values: Vec<String>,
    /// Byte offset of the physical line the directive came from.
    pub seek: usize,
    /// 1-based line number of that line.
    pub line_number: usize,
}

impl Directive {
    /// Creates a bare directive with no params and no values.
    pub fn new(key: impl Into<String>, seek: usize, line_number: usize) -> Self {
        Self {
            key: key.into(),
            params: Vec::new(),
            values: Vec::new(),
            seek,
            line_number,
        }
    }

    /// Adds a value group.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.values.push(value.into());
        self
    }

    /// Adds a parameter group.
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.params.push(param.into());
        self
    }
}

/// Tokenizes a line selected by the feature scanner.
pub fn tokenize(line: &FeatureLine) -> Result<Vec<Directive>, StructureError> {
    tokenize_line(&line.text, line.seek, line.line_number)
}

/// Tokenizes raw line text into its ordered directives.
///
/// Text before the first escape and between directives is opaque. An
/// unterminated group is fatal.
pub fn tokenize_line(
    text: &str,
    seek: usize,
    line_number: usize,
) -> Result<Vec<Directive>, StructureError> {
    let mut directives = Vec::new();
    let Some(mut cursor) = text.find(ESCAPE) else {
        return Ok(directives);
    };

    loop {
        let (key, mut pos) = read_key(text, cursor + ESCAPE.len_utf8());
        let mut directive = Directive::new(key, seek, line_number);

        loop {
            let rest = &text[pos..];
            let trimmed = rest.trim_start();
            let group_start = pos + (rest.len() - trimmed.len());
            let (open, close) = match trimmed.chars().next() {
                Some(PARAM_OPEN) => (PARAM_OPEN, PARAM_CLOSE),
                Some(VALUE_OPEN) => (VALUE_OPEN, VALUE_CLOSE),
                _ => break,
            };
            let (content, end) = read_group(text, group_start, open, close)
                .ok_or_else(|| StructureError::malformed(text, line_number))?;
            if open == PARAM_OPEN {
                directive.params.push(content.to_string());
            } else {
                directive.values.push(content.to_string());
            }
            pos = end;
        }

        directives.push(directive);

        match text[pos..].find(ESCAPE) {
            Some(offset) => cursor = pos + offset,
            None => break,
        }
    }

    Ok(directives)
}

/// Reads the key starting right after an escape at byte `start`.
///
/// Returns the key and the byte position where group scanning resumes. A
/// non-letter after the escape is a one-character control symbol (`\\`,
/// `\{`, `\%`). Otherwise the key run ends at the next escape, bracket or
/// brace; only its first word is the key, the rest of the run is opaque.
pub(crate) fn read_key(text: &str, start: usize) -> (&str, usize) {
    let Some(first) = text[start..].chars().next() else {
        return ("", text.len());
    };
    if !first.is_alphabetic() {
        let end = start + first.len_utf8();
        return (&text[start..end], end);
    }

    let run_end = text[start..]
        .find([ESCAPE, PARAM_OPEN, VALUE_OPEN])
        .map(|offset| start + offset)
        .unwrap_or(text.len());
    let run = &text[start..run_end];
    let key = run.split_whitespace().next().unwrap_or("");
    (key, run_end)
}

/// Matches the group opening at byte `open_at` and returns its inner text and
/// the byte position just after the closing symbol.
pub(crate) fn read_group(text: &str, open_at: usize, open: char, close: char) -> Option<(&str, usize)> {
    let mut depth = 0usize;
    let mut escaped = false;

    for (i, ch) in text[open_at..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if ch == ESCAPE {
            escaped = true;
        } else if ch == open {
            depth += 1;
        } else if ch == close {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                let inner_start = open_at + open.len_utf8();
                let close_at = open_at + i;
                return Some((&text[inner_start..close_at], close_at + close.len_utf8()));
            }
        }
    }

    None
}
