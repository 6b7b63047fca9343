use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::QuestionId;

/// Errors raised by the question store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to read the data file.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to write the data file.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The data file is not a valid snapshot.
    #[error("Invalid data file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to serialize snapshot: {0}")]
    Serialize(serde_json::Error),
    #[error("Question {0} does not exist")]
    QuestionNotFound(QuestionId),
    #[error("No question ids left to assign")]
    IdsExhausted,
    #[error("Question text is required")]
    MissingQuestionText,
}
