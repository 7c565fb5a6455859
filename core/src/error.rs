//! Error types for the TestRail API client.
//!
//! # Design
//! Failures fall into two kinds. `TransportError` covers everything that
//! goes wrong on our side of the wire: sockets, TLS, files, JSON that does
//! not parse, responses of an unexpected shape. `ClientError::Api` is the
//! remote saying no: any status other than 200, with the message TestRail
//! put in the body's `error` field when there was one.

use std::path::PathBuf;

use thiserror::Error;

/// Message used when a non-200 response carries no usable `error` field.
pub const NO_ERROR_MESSAGE: &str = "No additional error message received";

/// Local or I/O failures raised while talking to TestRail.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// DNS, socket, TLS, or protocol failure in the HTTP stack.
    #[error("HTTP request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected response shape: expected {expected}, found {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: &'static str,
    },

    #[error("response is missing field `{0}`")]
    MissingField(String),

    #[error("invalid request body for `{uri}`: {reason}")]
    InvalidBody { uri: String, reason: &'static str },

    #[error("path has no file name: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("`{0}` needs a local path to write the attachment to")]
    MissingDownloadPath(String),
}

/// Errors returned by every `TestRailClient` operation.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// TestRail answered with a status other than 200.
    #[error("TestRail API returned HTTP {status} ({message})")]
    Api { status: u16, message: String },
}

impl ClientError {
    /// HTTP status reported by TestRail, if this is an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(_) => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Transport(TransportError::Io(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_status_and_message() {
        let err = ClientError::Api {
            status: 400,
            message: "\"Field :name is a required field.\"".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "TestRail API returned HTTP 400 (\"Field :name is a required field.\")"
        );
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn transport_error_has_no_status() {
        let err = ClientError::from(TransportError::MissingField("id".to_string()));
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "response is missing field `id`");
    }
}
