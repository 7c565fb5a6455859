use testrail_core::ClientError;
use thiserror::Error;

/// Errors raised by the test harness.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("OMDb returned HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("OMDb response is missing `{0}`")]
    MissingField(&'static str),
}

/// Convenience Result type that uses HarnessError
pub type Result<T> = std::result::Result<T, HarnessError>;
