//! Recognition vocabulary: which directive keys the scanner and builder care about.
//!
//! The vocabulary is loaded once (from YAML or JSON, layered over the built-in
//! LaTeX defaults) and then passed by reference into the scanner and the
//! builder. Fields omitted from a file keep their default value; a field that
//! is present replaces the default wholesale.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;

static DEFAULT_VOCABULARY: Lazy<Vocabulary> = Lazy::new(Vocabulary::latex_default);

/// Errors emitted while loading or validating a vocabulary.
#[derive(Debug, Error)]
pub enum VocabularyError {
    /// The vocabulary file could not be read.
    #[error("Cannot read vocabulary '{path}': {source}")]
    Io {
        /// Path that failed
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
    /// YAML failed to parse.
    #[error("Vocabulary YAML parse error: {0}")]
    Yaml(String),
    /// JSON failed to parse.
    #[error("Vocabulary JSON parse error: {0}")]
    Json(String),
    /// File extension is not one we know how to read.
    #[error("Unsupported vocabulary format '{0}': expected .yaml, .yml or .json")]
    UnsupportedFormat(String),
    /// The vocabulary parsed but is internally inconsistent.
    #[error("Invalid vocabulary: {0}")]
    Invalid(String),
}

/// Directive keys recognized by the scanner and the structure builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    /// Sectioning keys and their hierarchy level (smaller is outer).
    pub level_keys: BTreeMap<String, i32>,
    /// Block delimiter keys (`begin`, `end`).
    pub environment_keys: BTreeSet<String>,
    /// Label-defining keys.
    pub label_keys: BTreeSet<String>,
    /// Miscellaneous keys worth recording.
    pub other_keys: BTreeSet<String>,
    /// Environment key that opens a block.
    pub begin_key: String,
    /// Environment key that closes a block.
    pub end_key: String,
    /// Environment acting as the implicit document root.
    pub root_environment: String,
    /// Keys rendered as file inclusions in the outline.
    pub inclusion_keys: BTreeSet<String>,
    /// Environments whose bodies are opaque to the scanner.
    pub verbatim_environments: BTreeSet<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        DEFAULT_VOCABULARY.clone()
    }
}

fn key_set(keys: &[&str]) -> BTreeSet<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

impl Vocabulary {
    /// Builds the default vocabulary for article-class LaTeX documents.
    ///
    /// `\part` is level 0 and `\section` level 1; `\chapter` is left out so
    /// that book-class users opt in explicitly from their own file.
    pub fn latex_default() -> Self {
        let level_keys = [
            ("part", 0),
            ("section", 1),
            ("subsection", 2),
            ("subsubsection", 3),
            ("paragraph", 4),
            ("subparagraph", 5),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Vocabulary {
            level_keys,
            environment_keys: key_set(&["begin", "end"]),
            label_keys: key_set(&["label"]),
            other_keys: key_set(&[
                "title",
                "author",
                "date",
                "maketitle",
                "tableofcontents",
                "caption",
                "input",
                "include",
                "includegraphics",
                "bibliography",
                "bibliographystyle",
                "appendix",
                "documentclass",
                "usepackage",
            ]),
            begin_key: "begin".to_string(),
            end_key: "end".to_string(),
            root_environment: "document".to_string(),
            inclusion_keys: key_set(&["input", "include", "includegraphics", "bibliography"]),
            verbatim_environments: key_set(&["verbatim", "lstlisting", "minted", "comment"]),
        }
    }

    /// Parses a YAML vocabulary and validates it.
    pub fn from_yaml_str(input: &str) -> Result<Self, VocabularyError> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        let vocabulary: Vocabulary =
            serde_yaml::from_str(input).map_err(|err| VocabularyError::Yaml(err.to_string()))?;
        vocabulary.validate()?;
        Ok(vocabulary)
    }

    /// Parses a JSON vocabulary and validates it.
    pub fn from_json_str(input: &str) -> Result<Self, VocabularyError> {
        let vocabulary: Vocabulary =
            serde_json::from_str(input).map_err(|err| VocabularyError::Json(err.to_string()))?;
        vocabulary.validate()?;
        Ok(vocabulary)
    }

    /// Loads a vocabulary file, picking the format from its extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, VocabularyError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        let read = || {
            std::fs::read_to_string(path).map_err(|source| VocabularyError::Io {
                path: path.display().to_string(),
                source,
            })
        };

        let vocabulary = match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&read()?)?,
            "json" => Self::from_json_str(&read()?)?,
            _ => return Err(VocabularyError::UnsupportedFormat(path.display().to_string())),
        };
        log::info!(
            "Loaded vocabulary from \"{}\" ({} keys)",
            path.display(),
            vocabulary.key_count()
        );
        Ok(vocabulary)
    }

    /// Checks the internal consistency of the vocabulary.
    pub fn validate(&self) -> Result<(), VocabularyError> {
        let all_keys = self
            .level_keys
            .keys()
            .chain(&self.environment_keys)
            .chain(&self.label_keys)
            .chain(&self.other_keys);
        for key in all_keys {
            if key.trim().is_empty() || key.chars().any(char::is_whitespace) {
                return Err(VocabularyError::Invalid(format!(
                    "key '{}' is empty or contains whitespace",
                    key
                )));
            }
        }

        for (role, key) in [("begin_key", &self.begin_key), ("end_key", &self.end_key)] {
            if !self.environment_keys.contains(key) {
                return Err(VocabularyError::Invalid(format!(
                    "{} '{}' is not listed in environment_keys",
                    role, key
                )));
            }
        }
        if self.begin_key == self.end_key {
            return Err(VocabularyError::Invalid(format!(
                "begin_key and end_key are both '{}'",
                self.begin_key
            )));
        }

        if let Some(key) = self
            .inclusion_keys
            .iter()
            .find(|key| !self.other_keys.contains(*key))
        {
            return Err(VocabularyError::Invalid(format!(
                "inclusion key '{}' is not listed in other_keys",
                key
            )));
        }
        Ok(())
    }

    /// Number of distinct recognized keys.
    pub fn key_count(&self) -> usize {
        self.level_keys.len()
            + self.environment_keys.len()
            + self.label_keys.len()
            + self.other_keys.len()
    }

    /// Strips the star of starred variants (`section*` -> `section`).
    pub fn canonical_key(key: &str) -> &str {
        key.strip_suffix('*').unwrap_or(key)
    }

    /// Returns true when a line whose first directive has this key is interesting.
    pub fn is_recognized(&self, key: &str) -> bool {
        let key = Self::canonical_key(key);
        self.level_keys.contains_key(key)
            || self.environment_keys.contains(key)
            || self.label_keys.contains(key)
            || self.other_keys.contains(key)
    }

    /// Hierarchy level of a sectioning key.
    pub fn level_of(&self, key: &str) -> Option<i32> {
        self.level_keys.get(Self::canonical_key(key)).copied()
    }

    /// Returns true for the block-opening key.
    pub fn is_begin(&self, key: &str) -> bool {
        key == self.begin_key
    }

    /// Returns true for the block-closing key.
    pub fn is_end(&self, key: &str) -> bool {
        key == self.end_key
    }

    /// Returns true for label-defining keys.
    pub fn is_label(&self, key: &str) -> bool {
        self.label_keys.contains(key)
    }

    /// Returns true for keys rendered as file inclusions.
    pub fn is_inclusion(&self, key: &str) -> bool {
        self.inclusion_keys.contains(Self::canonical_key(key))
    }

    /// Returns true when the environment values name the document root.
    pub fn is_root_environment(&self, values: &[String]) -> bool {
        values.first().is_some_and(|name| name.trim() == self.root_environment)
    }

    /// Returns true when the environment body should be skipped by the scanner.
    pub fn is_verbatim(&self, environment: &str) -> bool {
        self.verbatim_environments.contains(environment.trim())
    }
}
