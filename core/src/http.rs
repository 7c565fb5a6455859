//! HTTP transport types.
//!
//! # Design
//! Requests are described as plain data: the client builds an `HttpRequest`
//! and a `Transport` executes it. Responses keep their body as a reader so
//! attachment downloads can go straight to disk without being buffered.
//! `body: None` stands for "the server sent no body at all", which TestRail
//! does for some error statuses.

use std::fmt;
use std::io::{Cursor, Read};

/// HTTP method for a request. TestRail's API only uses these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by `TestRailClient::build_request`. Headers always include
/// `Authorization` and `Content-Type`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response handed back by a `Transport`.
pub struct HttpResponse {
    pub status: u16,
    pub body: Option<Box<dyn Read>>,
}

impl HttpResponse {
    /// Response with an in-memory body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: Some(Box::new(Cursor::new(body.into()))),
        }
    }

    /// Response for which the server provided no body stream.
    pub fn without_body(status: u16) -> Self {
        Self { status, body: None }
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}
