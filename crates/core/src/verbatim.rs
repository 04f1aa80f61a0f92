//! Verbatim environment tracking for the feature scanner.
//!
//! Bodies of environments such as `verbatim` or `lstlisting` hold text that
//! merely looks like LaTeX. The scanner threads a [`VerbatimState`] through
//! the document and drops every line inside such a body. The delimiter lines
//! themselves are left to normal selection.

use crate::tokenizer::{ESCAPE, VALUE_CLOSE, VALUE_OPEN, read_group};
use crate::vocabulary::Vocabulary;

/// Verbatim phases tracked across lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerbatimPhase {
    /// Not currently inside a verbatim body.
    #[default]
    Outside,
    /// Within a verbatim body.
    Inside,
}

/// Current verbatim state (phase and the environment that opened it).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VerbatimState {
    /// Current phase.
    pub phase: VerbatimPhase,
    /// Environment name captured at the opening line.
    pub environment: Option<String>,
}

/// Outcome of processing a single line for verbatim state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineScanOutcome {
    /// State to carry into the next line.
    pub next_state: VerbatimState,
    /// Whether the line belongs to a verbatim body and must be skipped.
    pub skip: bool,
}

/// Advance verbatim state based on one normalized (trimmed) line.
pub fn advance_verbatim_state(
    line: &str,
    state: VerbatimState,
    vocabulary: &Vocabulary,
) -> LineScanOutcome {
    match state.phase {
        VerbatimPhase::Outside => {
            let Some((environment, rest)) = environment_marker(line, &vocabulary.begin_key) else {
                return LineScanOutcome {
                    next_state: state,
                    skip: false,
                };
            };
            if !vocabulary.is_verbatim(environment)
                || closes_environment(rest, &vocabulary.end_key, environment)
            {
                return LineScanOutcome {
                    next_state: state,
                    skip: false,
                };
            }
            LineScanOutcome {
                next_state: VerbatimState {
                    phase: VerbatimPhase::Inside,
                    environment: Some(environment.trim().to_string()),
                },
                skip: false,
            }
        }
        VerbatimPhase::Inside => {
            let environment = state.environment.as_deref().unwrap_or_default();
            if closes_environment(line, &vocabulary.end_key, environment) {
                LineScanOutcome {
                    next_state: VerbatimState::default(),
                    skip: !line.starts_with(ESCAPE),
                }
            } else {
                LineScanOutcome {
                    next_state: state,
                    skip: true,
                }
            }
        }
    }
}

/// Parses a leading `\<key>{name}` and returns the name and the remaining text.
fn environment_marker<'a>(line: &'a str, key: &str) -> Option<(&'a str, &'a str)> {
    let after_escape = line.strip_prefix(ESCAPE)?;
    let after_key = after_escape.strip_prefix(key)?;
    let offset = line.len() - after_key.trim_start().len();
    if !line[offset..].starts_with(VALUE_OPEN) {
        return None;
    }
    let (name, end) = read_group(line, offset, VALUE_OPEN, VALUE_CLOSE)?;
    Some((name, &line[end..]))
}

/// Returns true when `text` contains `\<end_key>{environment}`.
fn closes_environment(text: &str, end_key: &str, environment: &str) -> bool {
    let mut search = text;
    while let Some(pos) = search.find(ESCAPE) {
        let candidate = &search[pos..];
        if let Some((name, _)) = environment_marker(candidate, end_key)
            && name.trim() == environment.trim()
        {
            return true;
        }
        search = &search[pos + ESCAPE.len_utf8()..];
    }
    false
}
