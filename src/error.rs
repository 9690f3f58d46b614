use thiserror::Error;

use crate::dom::{DomError, DomErrorKind};

#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("Document not ready: {0}")]
    NotReady(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Host DOM error: {0}")]
    Host(String),

    #[error("Invalid transcript line {line}: {message}")]
    Transcript { line: usize, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl RecorderError {
    /// Whether a later event can be expected to retry the failed work.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NotReady(_) | Self::AccessDenied(_))
    }
}

impl From<DomError> for RecorderError {
    fn from(err: DomError) -> Self {
        match err.kind() {
            DomErrorKind::NotReady => Self::NotReady(err.message().to_string()),
            DomErrorKind::AccessDenied => Self::AccessDenied(err.message().to_string()),
            DomErrorKind::Other => Self::Host(err.message().to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, RecorderError>;
