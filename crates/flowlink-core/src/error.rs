//! Error types for Flowlink

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("invalid selection: {0}")]
    InvalidShape(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("token error: {0}")]
    TokenError(String),

    #[error("snapshot error: {file} - {message}")]
    SnapshotError { file: String, message: String },

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_shape(reason: impl Into<String>) -> Self {
        Self::InvalidShape(reason.into())
    }

    pub fn snapshot_error(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SnapshotError {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Errors a caller caused with their request, as opposed to server faults.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized
                | Self::InvalidCredentials
                | Self::InvalidShape(_)
                | Self::InvalidRequest(_)
        )
    }
}
