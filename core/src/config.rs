//! Connection settings for a `TestRailClient`.

use std::time::Duration;

use serde::Deserialize;

/// Where TestRail lives and how to log in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the TestRail instance, e.g. `https://example.testrail.io/`.
    pub url: String,
    pub user: String,
    /// Password or API key.
    pub password: String,
    /// Global per-request timeout. `None` keeps the HTTP stack's default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Put the caller's error message into result comments.
    #[serde(default)]
    pub forward_error_message: bool,
}

impl ClientConfig {
    pub fn new(url: impl Into<String>, user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user: user.into(),
            password: password.into(),
            timeout_secs: None,
            forward_error_message: false,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
