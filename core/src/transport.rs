//! Executes `HttpRequest` values against the network.
//!
//! `TestRailClient` only talks to the `Transport` trait, so tests can swap
//! in a recording double while production code uses the blocking ureq
//! agent below.

use std::time::Duration;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Something that can perform one blocking HTTP round-trip.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by a `ureq::Agent`.
///
/// Status codes are never turned into errors here; the client interprets
/// them so TestRail's error bodies can be read.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let response = match method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(url.as_str());
                for (name, value) in &headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()?
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(url.as_str());
                for (name, value) in &headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match body {
                    Some(bytes) => builder.send(&bytes[..])?,
                    None => builder.send_empty()?,
                }
            }
        };

        let status = response.status().as_u16();
        let reader = response.into_body().into_reader();
        Ok(HttpResponse {
            status,
            body: Some(Box::new(reader)),
        })
    }
}
