use std::path::PathBuf;
use thiserror::Error;

/// Failures at the file boundary of one subject/year unit of work.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid subject/year combination {subject} {year}: {reason}")]
    InvalidCombination {
        subject: String,
        year: String,
        reason: String,
    },

    #[error("no questions extracted from {0}")]
    NoQuestions(String),
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
