//! Error types with actionable context.
//!
//! Every failure the orchestration layer reports carries enough context
//! (model name, stage index, fold index) to reproduce it. Nothing is
//! recovered silently.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for ensenar operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the training-strategy and model-lifecycle layer.
#[derive(Error, Debug)]
pub enum Error {
    /// Requested model name is absent from the registry.
    #[error("Model not found: {name}\n  → Run `ensenar list` to see stored models")]
    NotFound { name: String },

    /// Input rejected before any mutation (plan shape, teaching batch, names).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The learner failed while fitting, evaluating or predicting.
    #[error("Training failed ({context}): {message}")]
    Training { context: String, message: String },

    /// Filesystem failure while reading or writing an artifact.
    #[error("Storage error: {context}\n  Cause: {source}")]
    Storage {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Artifact or history could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration file missing, malformed or out of range.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Word could not be encoded.
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Corpus row could not be parsed.
    #[error("Corpus error in {path}:{line}: {message}")]
    Corpus {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

impl Error {
    /// Build a training failure with the given context.
    pub fn training(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Training {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Build a storage failure with the given context.
    pub fn storage(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Storage {
            context: context.into(),
            source,
        }
    }

    /// Prefix the context of a training failure, e.g. with a model name
    /// or stage index. Other variants already name their subject and are
    /// returned unchanged.
    #[must_use]
    pub fn in_context(self, outer: impl fmt::Display) -> Self {
        match self {
            Self::Training { context, message } => Self::Training {
                context: format!("{outer}, {context}"),
                message,
            },
            other => other,
        }
    }

    /// Check if the caller can fix this error by changing its input.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Validation(_) | Self::Config(_) | Self::Corpus { .. }
        )
    }

    /// Stable error code for structured output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "E010",
            Self::Validation(_) => "E020",
            Self::Training { .. } => "E030",
            Self::Storage { .. } => "E050",
            Self::Serialization(_) => "E051",
            Self::Config(_) => "E001",
            Self::Tokenizer(_) => "E040",
            Self::Corpus { .. } => "E002",
        }
    }
}
