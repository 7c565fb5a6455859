//! Blocking client for the TestRail API v2.
//!
//! # Design
//! `TestRailClient` holds the base URL, the credentials, and a `Transport`.
//! Every call is split the same way: `build_request` turns a URI and body
//! into an `HttpRequest`, the transport executes it, and `parse_response`
//! turns the `HttpResponse` into an `ApiResponse` or an error. Both halves
//! are public so they can be exercised without a network.
//!
//! The URI decides how the body is treated. `add_attachment*` uploads a
//! local file as multipart form data, `get_attachment/*` streams the
//! response into a local file, and everything else speaks JSON.
//!
//! Nothing is cached between calls. The `Authorization` header is computed
//! for each request from the current user and password.

use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::{json, Value};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::auth::basic_auth_header;
use crate::codec::{self, ApiResponse};
use crate::config::ClientConfig;
use crate::error::{ClientError, TransportError, NO_ERROR_MESSAGE};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::multipart;
use crate::transport::{Transport, UreqTransport};

/// Path appended to the instance URL to reach API v2.
pub const API_PATH: &str = "index.php?/api/v2/";

/// Comment attached to every result posted by `add_result_for_case`.
pub const RESULT_COMMENT: &str = "Test Executed - Status updated automatically from test automation.";

const JSON_CONTENT_TYPE: &str = "application/json";

/// Body of a request.
#[derive(Debug, Clone, Copy)]
pub enum RequestBody<'a> {
    Empty,
    Json(&'a Value),
    /// Local file uploaded by `add_attachment*` endpoints.
    Attachment(&'a Path),
}

/// Synchronous TestRail API client.
#[derive(Debug, Clone)]
pub struct TestRailClient<T = UreqTransport> {
    base_url: String,
    user: String,
    password: String,
    forward_error_message: bool,
    transport: T,
}

impl TestRailClient<UreqTransport> {
    pub fn new(url: &str, user: &str, password: &str) -> Self {
        Self::from_config(&ClientConfig::new(url, user, password))
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new(config.timeout()))
    }
}

impl<T> TestRailClient<T> {
    pub fn with_transport(config: &ClientConfig, transport: T) -> Self {
        let mut base_url = config.url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        base_url.push_str(API_PATH);
        Self {
            base_url,
            user: config.user.clone(),
            password: config.password.clone(),
            forward_error_message: config.forward_error_message,
            transport,
        }
    }

    /// Base URL including the API path, e.g. `https://tr.example.com/index.php?/api/v2/`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn set_user(&mut self, user: impl Into<String>) {
        self.user = user.into();
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Describe the HTTP request for `uri` without sending it.
    pub fn build_request(
        &self,
        method: HttpMethod,
        uri: &str,
        body: RequestBody<'_>,
    ) -> Result<HttpRequest, TransportError> {
        let mut headers = vec![(
            "Authorization".to_string(),
            basic_auth_header(&self.user, &self.password),
        )];

        let payload = match (method, body) {
            (HttpMethod::Get, _) | (HttpMethod::Post, RequestBody::Empty) => None,
            (HttpMethod::Post, RequestBody::Attachment(path)) => {
                if !is_upload(uri) {
                    return Err(TransportError::InvalidBody {
                        uri: uri.to_string(),
                        reason: "only add_attachment endpoints accept a file",
                    });
                }
                headers.push(("Content-Type".to_string(), multipart::content_type()));
                Some(multipart::build_body(path)?)
            }
            (HttpMethod::Post, RequestBody::Json(value)) => {
                if is_upload(uri) {
                    return Err(TransportError::InvalidBody {
                        uri: uri.to_string(),
                        reason: "add_attachment endpoints expect a file path",
                    });
                }
                Some(codec::encode_json(value)?)
            }
        };
        if payload.is_none() || !is_upload(uri) {
            headers.push(("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()));
        }

        Ok(HttpRequest {
            method,
            url: format!("{}{uri}", self.base_url),
            headers,
            body: payload,
        })
    }

    /// Interpret the response to a request for `uri`.
    ///
    /// A successful `get_attachment/*` response is written to `download_to`.
    /// Any status other than 200 becomes `ClientError::Api`.
    pub fn parse_response(
        &self,
        uri: &str,
        download_to: Option<&Path>,
        response: HttpResponse,
    ) -> Result<ApiResponse, ClientError> {
        let HttpResponse { status, body } = response;

        let Some(mut body) = body else {
            if status != 200 {
                return Err(api_error(uri, status, NO_ERROR_MESSAGE.to_string()));
            }
            return Ok(ApiResponse::Empty);
        };

        if status == 200 && is_download(uri) {
            let path = download_to.ok_or_else(|| TransportError::MissingDownloadPath(uri.to_string()))?;
            save_attachment(&mut body, path)?;
            debug!(uri, path = %path.display(), "attachment saved");
            return Ok(ApiResponse::File(path.to_path_buf()));
        }

        let mut bytes = Vec::new();
        let read = body.read_to_end(&mut bytes);
        drop(body);

        if status == 200 {
            read?;
            let text = String::from_utf8(bytes)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            return Ok(codec::decode_json(&text)?);
        }

        let message = match read {
            Ok(_) => error_message(&String::from_utf8_lossy(&bytes)),
            Err(_) => NO_ERROR_MESSAGE.to_string(),
        };
        Err(api_error(uri, status, message))
    }
}

impl<T: Transport> TestRailClient<T> {
    /// Issue a GET against `uri` (e.g. `get_case/1`).
    ///
    /// `download_to` is only used by `get_attachment/*`, which writes the
    /// attachment there and returns `ApiResponse::File`.
    pub fn send_get(&self, uri: &str, download_to: Option<&Path>) -> Result<ApiResponse, ClientError> {
        self.send(HttpMethod::Get, uri, RequestBody::Empty, download_to)
    }

    /// Issue a POST against `uri` (e.g. `add_case/1`).
    pub fn send_post(&self, uri: &str, body: RequestBody<'_>) -> Result<ApiResponse, ClientError> {
        self.send(HttpMethod::Post, uri, body, None)
    }

    fn send(
        &self,
        method: HttpMethod,
        uri: &str,
        body: RequestBody<'_>,
        download_to: Option<&Path>,
    ) -> Result<ApiResponse, ClientError> {
        debug!(method = method.as_str(), uri, "sending TestRail request");
        let request = self.build_request(method, uri, body)?;
        let response = self.transport.execute(request)?;
        self.parse_response(uri, download_to, response)
    }

    /// Create a run in `project_id` named after the current local time and
    /// return its id.
    pub fn add_run(&self, project_id: u64) -> Result<u64, ClientError> {
        info!(project_id, "Creating test run");
        let body = json!({ "name": local_run_name() });
        let run = self
            .send_post(&format!("add_run/{project_id}"), RequestBody::Json(&body))?
            .into_object()?;
        Ok(codec::id_field(&run, "id")?)
    }

    /// Title of test case `case_id`.
    pub fn get_case_name(&self, case_id: u64) -> Result<String, ClientError> {
        info!(case_id, "Getting test case name");
        let case = self
            .send_get(&format!("get_case/{case_id}"), None)?
            .into_object()?;
        Ok(codec::text_field(&case, "title")?)
    }

    /// Record `status_id` for `case_id` in `run_id`.
    ///
    /// `error_message` only reaches TestRail when the client was configured
    /// with `forward_error_message`.
    pub fn add_result_for_case(
        &self,
        case_id: u64,
        run_id: u64,
        status_id: u32,
        error_message: &str,
    ) -> Result<(), ClientError> {
        info!(case_id, run_id, status_id, "Adding run results for test case");
        let comment = if self.forward_error_message && !error_message.is_empty() {
            format!("{RESULT_COMMENT}\n\n{error_message}")
        } else {
            RESULT_COMMENT.to_string()
        };
        let body = json!({ "status_id": status_id, "comment": comment });
        self.send_post(
            &format!("add_result_for_case/{run_id}/{case_id}"),
            RequestBody::Json(&body),
        )?;
        Ok(())
    }

    /// Upload `path` to result `result_id` and return the attachment id.
    pub fn add_attachment_to_result(&self, result_id: u64, path: &Path) -> Result<u64, ClientError> {
        info!(result_id, path = %path.display(), "Uploading attachment");
        let created = self
            .send_post(
                &format!("add_attachment_to_result/{result_id}"),
                RequestBody::Attachment(path),
            )?
            .into_object()?;
        Ok(codec::id_field(&created, "attachment_id")?)
    }

    /// Download attachment `attachment_id` into `path`.
    pub fn get_attachment(&self, attachment_id: u64, path: &Path) -> Result<PathBuf, ClientError> {
        info!(attachment_id, path = %path.display(), "Downloading attachment");
        Ok(self
            .send_get(&format!("get_attachment/{attachment_id}"), Some(path))?
            .into_file()?)
    }
}

/// Name given to runs created by `add_run`, e.g.
/// `Test run 2024-01-01 at 12:00:00 UTC`.
pub fn run_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    format!("Test run {}", at.format("%Y-%m-%d at %H:%M:%S %Z"))
}

/// `run_name` for the current time in the local zone. The zone is named
/// (`UTC`, `CEST`) when its IANA id can be resolved, otherwise the numeric
/// offset is printed.
fn local_run_name() -> String {
    let now = Utc::now();
    match local_zone() {
        Some(zone) => run_name(&now.with_timezone(&zone)),
        None => run_name(&now.with_timezone(&Local)),
    }
}

/// Local IANA zone: `TZ` first, then the system setting.
fn local_zone() -> Option<Tz> {
    let name = std::env::var("TZ")
        .ok()
        .filter(|name| !name.is_empty())
        .or_else(|| iana_time_zone::get_timezone().ok())?;
    let zone = parse_zone(&name);
    if zone.is_none() {
        debug!(zone = %name, "unknown time zone, run name uses the UTC offset");
    }
    zone
}

fn parse_zone(name: &str) -> Option<Tz> {
    name.trim_start_matches(':').parse().ok()
}

fn is_upload(uri: &str) -> bool {
    uri.starts_with("add_attachment")
}

fn is_download(uri: &str) -> bool {
    uri.starts_with("get_attachment/")
}

/// Quoted `error` field of an error body, or the canned message.
fn error_message(text: &str) -> String {
    if let Ok(ApiResponse::Object(map)) = codec::decode_json(text) {
        if let Some(Value::String(error)) = map.get("error") {
            return format!("\"{error}\"");
        }
    }
    NO_ERROR_MESSAGE.to_string()
}

fn api_error(uri: &str, status: u16, message: String) -> ClientError {
    warn!(uri, status, %message, "TestRail request failed");
    ClientError::Api { status, message }
}

/// Stream `body` into a temporary file beside `path`, then move it into
/// place. On failure the temporary file is removed and `path` is untouched.
fn save_attachment(body: &mut dyn Read, path: &Path) -> Result<(), TransportError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    io::copy(body, &mut file)?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
