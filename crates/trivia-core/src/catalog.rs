//! Question catalog loading.
//!
//! The catalog is a JSON array of question records, read once at startup
//! and never mutated afterwards. Every game session shares the same
//! [`Arc`] slice of questions rather than copying it.
//!
//! Loading is fail-fast: a missing, malformed or inconsistent catalog is a
//! startup error, since the engine must never serve with no questions.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use trivia_types::Question;

/// Errors that can occur when loading the question catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read question catalog {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The catalog is not a valid JSON array of questions.
    #[error("failed to parse question catalog: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The catalog holds no questions.
    #[error("question catalog is empty")]
    Empty,

    /// A question record violates a catalog invariant.
    #[error("invalid question {question_id}: {reason}")]
    InvalidQuestion {
        /// Offending question id.
        question_id: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Immutable, ordered set of questions.
#[derive(Debug, Clone)]
pub struct QuestionCatalog {
    questions: Arc<[Question]>,
}

impl QuestionCatalog {
    /// Load and validate the catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file is missing or unreadable,
    /// and any error [`parse`](Self::parse) can return.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parse and validate the catalog from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Json`] on malformed input, or
    /// [`CatalogError::Empty`] / [`CatalogError::InvalidQuestion`] when the
    /// records break catalog invariants.
    pub fn parse(json: &str) -> Result<Self, CatalogError> {
        let questions: Vec<Question> = serde_json::from_str(json)?;
        Self::new(questions)
    }

    /// Build a catalog from already-deserialized questions.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Empty`] for an empty list, or
    /// [`CatalogError::InvalidQuestion`] for duplicate ids, questions with
    /// no options, or a correct option that is not among the options.
    pub fn new(questions: Vec<Question>) -> Result<Self, CatalogError> {
        if questions.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = BTreeSet::new();
        for question in &questions {
            let invalid = |reason: &str| CatalogError::InvalidQuestion {
                question_id: question.id.to_string(),
                reason: reason.to_owned(),
            };
            if !seen.insert(question.id.clone()) {
                return Err(invalid("duplicate question id"));
            }
            if question.options.is_empty() {
                return Err(invalid("no options"));
            }
            if !question.options.contains(&question.correct_option) {
                return Err(invalid("correct option is not one of the options"));
            }
        }

        Ok(Self {
            questions: questions.into(),
        })
    }

    /// Shared handle to the ordered questions.
    pub fn questions(&self) -> Arc<[Question]> {
        Arc::clone(&self.questions)
    }

    /// Number of questions.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether the catalog holds no questions. Always false for a loaded catalog.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
