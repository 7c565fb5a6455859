//! Synchronous client for the TestRail API v2.
//!
//! # Overview
//! Authenticates with HTTP Basic credentials, sends JSON reads and writes,
//! uploads attachments as multipart form data, and downloads attachments
//! straight to disk. Three convenience operations cover what test
//! automation needs: create a run, look up a case title, and post a result.
//!
//! # Design
//! - `TestRailClient` is stateless between calls; it holds only the base
//!   URL, the credentials, and a `Transport`.
//! - Each call is split into `build_request` (plain data) and
//!   `parse_response`, with the transport executing the round-trip in
//!   between. `UreqTransport` is the blocking production transport.
//! - Responses are an `ApiResponse` variant: object, array, downloaded
//!   file, or empty.
//! - Failures are `ClientError::Transport` for local and I/O problems and
//!   `ClientError::Api` when TestRail answers with a non-200 status.

pub mod auth;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod multipart;
pub mod transport;

pub use client::{run_name, RequestBody, TestRailClient, RESULT_COMMENT};
pub use codec::ApiResponse;
pub use config::ClientConfig;
pub use error::{ClientError, TransportError, NO_ERROR_MESSAGE};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
