//! In-memory fake of the TestRail API v2.
//!
//! TestRail routes on the query string (`/index.php?/api/v2/get_case/1`),
//! so a single handler on `/index.php` dispatches on the raw query. Every
//! request is captured for later inspection, and tests can queue scripted
//! responses that are served before normal routing.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use serde_json::{json, Value};

/// A request as the fake received it.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    /// API path after `/api/v2/`, e.g. `add_run/7`.
    pub uri: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// How many times `name` appears in the headers.
    pub fn header_count(&self, name: &str) -> usize {
        self.headers
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .count()
    }

    pub fn json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }

    /// `user:password` from a Basic `Authorization` header.
    pub fn basic_credentials(&self) -> Option<String> {
        let token = self.header("authorization")?.strip_prefix("Basic ")?;
        String::from_utf8(STANDARD.decode(token).ok()?).ok()
    }
}

/// A result posted through `add_result_for_case`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordedResult {
    pub id: u64,
    pub run_id: u64,
    pub case_id: u64,
    pub status_id: u64,
    pub comment: Option<String>,
}

/// An uploaded or seeded attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAttachment {
    pub filename: String,
    pub data: Vec<u8>,
    pub result_id: Option<u64>,
}

#[derive(Default)]
struct FakeState {
    authorization: Option<String>,
    cases: BTreeMap<u64, Value>,
    runs: BTreeMap<u64, Value>,
    results: Vec<RecordedResult>,
    attachments: BTreeMap<u64, StoredAttachment>,
    scripted: VecDeque<(u16, Vec<u8>)>,
    requests: Vec<CapturedRequest>,
    next_id: u64,
}

impl FakeState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Shared handle to the fake. Clones see the same state.
#[derive(Clone, Default)]
pub struct FakeTestRail {
    state: Arc<Mutex<FakeState>>,
}

impl FakeTestRail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a test case.
    pub fn with_case(self, id: u64, title: &str) -> Self {
        self.lock().cases.insert(
            id,
            json!({ "id": id, "title": title, "section_id": 1, "type_id": 1, "priority_id": 2 }),
        );
        self
    }

    /// Answer 401 unless requests authenticate as `user:password`.
    pub fn require_credentials(self, user: &str, password: &str) -> Self {
        let token = STANDARD.encode(format!("{user}:{password}"));
        self.lock().authorization = Some(format!("Basic {token}"));
        self
    }

    /// Queue a response served verbatim to the next request.
    pub fn script(&self, status: u16, body: impl Into<Vec<u8>>) {
        self.lock().scripted.push_back((status, body.into()));
    }

    /// Store an attachment directly and return its id.
    pub fn seed_attachment(&self, filename: &str, data: impl Into<Vec<u8>>) -> u64 {
        let mut state = self.lock();
        let id = state.next_id();
        state.attachments.insert(
            id,
            StoredAttachment {
                filename: filename.to_string(),
                data: data.into(),
                result_id: None,
            },
        );
        id
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.lock().requests.clone()
    }

    pub fn results(&self) -> Vec<RecordedResult> {
        self.lock().results.clone()
    }

    pub fn runs(&self) -> Vec<Value> {
        self.lock().runs.values().cloned().collect()
    }

    pub fn attachment(&self, id: u64) -> Option<StoredAttachment> {
        self.lock().attachments.get(&id).cloned()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/index.php", any(dispatch))
            .with_state(self.clone())
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn handle(&self, method: &Method, query: &str, headers: &HeaderMap, body: Vec<u8>) -> Response {
        let mut state = self.lock();
        let uri = query.strip_prefix("/api/v2/").unwrap_or(query).to_string();
        let captured = CapturedRequest {
            method: method.as_str().to_string(),
            uri: uri.clone(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.as_str().to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
                .collect(),
            body,
        };

        if let Some((status, bytes)) = state.scripted.pop_front() {
            state.requests.push(captured);
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            return (status, bytes).into_response();
        }

        let authorized = state
            .authorization
            .as_deref()
            .map_or(true, |expected| captured.header("authorization") == Some(expected));
        if !authorized {
            state.requests.push(captured);
            return error(
                StatusCode::UNAUTHORIZED,
                "Authentication failed: invalid or missing user/password or session cookie.",
            );
        }

        let path = uri.split('&').next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').collect();
        let response = match (method.as_str(), segments.as_slice()) {
            ("GET", ["get_case", id]) => get_case(&state, id),
            ("GET", ["get_runs", project_id]) => get_runs(&state, project_id),
            ("GET", ["get_attachment", id]) => get_attachment(&state, id),
            ("POST", ["add_run", project_id]) => add_run(&mut state, project_id, &captured),
            ("POST", ["add_result_for_case", run_id, case_id]) => {
                add_result_for_case(&mut state, run_id, case_id, &captured)
            }
            ("POST", ["add_attachment_to_result", result_id]) => {
                add_attachment_to_result(&mut state, result_id, &captured)
            }
            _ => error(StatusCode::NOT_FOUND, &format!("Unknown method '{path}'")),
        };
        state.requests.push(captured);
        response
    }
}

async fn dispatch(
    State(fake): State<FakeTestRail>,
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    fake.handle(&method, query.as_deref().unwrap_or_default(), &headers, body.to_vec())
}

fn ok(value: Value) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        value.to_string(),
    )
        .into_response()
}

fn error(status: StatusCode, message: &str) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        json!({ "error": message }).to_string(),
    )
        .into_response()
}

fn parse_id(raw: &str, field: &str) -> Result<u64, Response> {
    raw.parse()
        .map_err(|_| error(StatusCode::BAD_REQUEST, &format!("Field :{field} is not a valid ID.")))
}

fn get_case(state: &FakeState, id: &str) -> Response {
    let id = match parse_id(id, "case_id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state.cases.get(&id) {
        Some(case) => ok(case.clone()),
        None => error(StatusCode::BAD_REQUEST, "Field :case_id is not a valid test case."),
    }
}

fn get_runs(state: &FakeState, project_id: &str) -> Response {
    let project_id = match parse_id(project_id, "project_id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let runs: Vec<Value> = state
        .runs
        .values()
        .filter(|run| run["project_id"] == project_id)
        .cloned()
        .collect();
    ok(Value::Array(runs))
}

fn get_attachment(state: &FakeState, id: &str) -> Response {
    let id = match parse_id(id, "attachment_id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state.attachments.get(&id) {
        Some(attachment) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/octet-stream")],
            attachment.data.clone(),
        )
            .into_response(),
        None => error(StatusCode::BAD_REQUEST, "Field :attachment_id is not a valid attachment."),
    }
}

fn add_run(state: &mut FakeState, project_id: &str, request: &CapturedRequest) -> Response {
    let project_id = match parse_id(project_id, "project_id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let name = request
        .json()
        .and_then(|body| body["name"].as_str().map(str::to_string))
        .filter(|name| !name.is_empty());
    let Some(name) = name else {
        return error(StatusCode::BAD_REQUEST, "Field :name is a required field.");
    };
    let id = state.next_id();
    let run = json!({
        "id": id,
        "project_id": project_id,
        "name": name,
        "is_completed": false,
        "url": format!("http://testrail.local/index.php?/runs/view/{id}"),
    });
    state.runs.insert(id, run.clone());
    ok(run)
}

fn add_result_for_case(
    state: &mut FakeState,
    run_id: &str,
    case_id: &str,
    request: &CapturedRequest,
) -> Response {
    let (run_id, case_id) = match (parse_id(run_id, "run_id"), parse_id(case_id, "case_id")) {
        (Ok(run), Ok(case)) => (run, case),
        (Err(resp), _) | (_, Err(resp)) => return resp,
    };
    if !state.runs.contains_key(&run_id) {
        return error(StatusCode::BAD_REQUEST, "Field :run_id is not a valid test run.");
    }
    if !state.cases.contains_key(&case_id) {
        return error(StatusCode::BAD_REQUEST, "Field :case_id is not a valid test case.");
    }
    let body = request.json().unwrap_or(Value::Null);
    let Some(status_id) = body["status_id"].as_u64() else {
        return error(StatusCode::BAD_REQUEST, "Field :status_id is a required field.");
    };
    let result = RecordedResult {
        id: state.next_id(),
        run_id,
        case_id,
        status_id,
        comment: body["comment"].as_str().map(str::to_string),
    };
    state.results.push(result.clone());
    ok(json!({
        "id": result.id,
        "test_id": case_id,
        "status_id": status_id,
        "comment": result.comment,
    }))
}

fn add_attachment_to_result(state: &mut FakeState, result_id: &str, request: &CapturedRequest) -> Response {
    let result_id = match parse_id(result_id, "result_id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if !state.results.iter().any(|r| r.id == result_id) {
        return error(StatusCode::BAD_REQUEST, "Field :result_id is not a valid result.");
    }
    let upload = request
        .header("content-type")
        .and_then(|ct| ct.strip_prefix("multipart/form-data; boundary="))
        .and_then(|boundary| parse_upload(&request.body, boundary));
    let Some((filename, data)) = upload else {
        return error(StatusCode::BAD_REQUEST, "No file attached or upload size was exceeded.");
    };
    let id = state.next_id();
    state.attachments.insert(
        id,
        StoredAttachment {
            filename,
            data,
            result_id: Some(result_id),
        },
    );
    ok(json!({ "attachment_id": id }))
}

/// Extract the filename and payload of the single part in a form body.
pub fn parse_upload(body: &[u8], boundary: &str) -> Option<(String, Vec<u8>)> {
    let opening = format!("--{boundary}\r\n");
    let start = find(body, opening.as_bytes())? + opening.len();
    let rest = &body[start..];

    let header_end = find(rest, b"\r\n\r\n")?;
    let part_header = std::str::from_utf8(&rest[..header_end]).ok()?;
    let filename = part_header
        .split("filename=\"")
        .nth(1)?
        .split('"')
        .next()?
        .to_string();

    let data = &rest[header_end + 4..];
    let closing = format!("\r\n--{boundary}--");
    let end = data
        .windows(closing.len())
        .rposition(|w| w == closing.as_bytes())?;
    Some((filename, data[..end].to_vec()))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_upload_extracts_single_part() {
        let body = b"\n\n--B\r\nContent-Disposition: form-data; name=\"attachment\"; filename=\"a.png\"\r\n\r\n\x00\x01\r\n\x02\r\n--B--\r\n";
        let (filename, data) = parse_upload(body, "B").unwrap();
        assert_eq!(filename, "a.png");
        assert_eq!(data, b"\x00\x01\r\n\x02");
    }

    #[test]
    fn parse_upload_rejects_missing_boundary() {
        assert!(parse_upload(b"no parts here", "B").is_none());
    }

    #[test]
    fn captured_request_decodes_basic_credentials() {
        let req = CapturedRequest {
            method: "GET".to_string(),
            uri: "get_case/1".to_string(),
            headers: vec![("authorization".to_string(), "Basic YTpi".to_string())],
            body: Vec::new(),
        };
        assert_eq!(req.basic_credentials().as_deref(), Some("a:b"));
        assert_eq!(req.header_count("Authorization"), 1);
    }
}
