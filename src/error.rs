use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T, E = CollectError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum CollectError {
    /// Connection failures and timeouts. Retryable in principle, never retried here.
    #[error("network error: {0}")]
    TransientNetwork(String),

    /// Error status, portal result code, error envelope or a body that does not
    /// match the expected shape.
    #[error("api error: {0}")]
    Api(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("table error ({}): {message}", path.display())]
    Table { path: PathBuf, message: String },
}

impl CollectError {
    pub fn table(path: &Path, message: impl ToString) -> CollectError {
        CollectError::Table {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    /// Errors that belong to a single request rather than the whole run.
    pub fn is_request_failure(&self) -> bool {
        matches!(
            self,
            CollectError::TransientNetwork(_) | CollectError::Api(_)
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CollectError::TransientNetwork(_) => "network",
            CollectError::Api(_) => "api",
            CollectError::Configuration(_) => "configuration",
            CollectError::Table { .. } => "table",
        }
    }
}

impl From<reqwest::Error> for CollectError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            CollectError::TransientNetwork(err.to_string())
        } else {
            CollectError::Api(err.to_string())
        }
    }
}
