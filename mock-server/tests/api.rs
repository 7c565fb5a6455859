use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{omdb, FakeTestRail};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn api(method: &str, path: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(format!("/index.php?/api/v2/{path}"))
        .header(http::header::CONTENT_TYPE, "application/json")
        .header(http::header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(body.to_string())
        .unwrap()
}

// --- get_case ---

#[tokio::test]
async fn get_case_returns_seeded_case() {
    let fake = FakeTestRail::new().with_case(17, "Login works");
    let resp = fake.router().oneshot(api("GET", "get_case/17", "")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let case = body_json(resp).await;
    assert_eq!(case["title"], "Login works");
}

#[tokio::test]
async fn get_case_unknown_is_400_with_error() {
    let fake = FakeTestRail::new();
    let resp = fake.router().oneshot(api("GET", "get_case/99", "")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Field :case_id is not a valid test case.");
}

// --- add_run ---

#[tokio::test]
async fn add_run_requires_name() {
    let fake = FakeTestRail::new();
    let resp = fake.router().oneshot(api("POST", "add_run/7", "{}")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Field :name is a required field.");
}

#[tokio::test]
async fn add_run_then_result() {
    let fake = FakeTestRail::new().with_case(4, "Search");

    let resp = fake
        .router()
        .oneshot(api("POST", "add_run/7", r#"{"name":"Test run"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let run = body_json(resp).await;
    let run_id = run["id"].as_u64().unwrap();
    assert_eq!(run["project_id"], 7);

    let resp = fake
        .router()
        .oneshot(api(
            "POST",
            &format!("add_result_for_case/{run_id}/4"),
            r#"{"status_id":1,"comment":"ok"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let results = fake.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].run_id, run_id);
    assert_eq!(results[0].case_id, 4);
    assert_eq!(results[0].status_id, 1);
    assert_eq!(results[0].comment.as_deref(), Some("ok"));
}

#[tokio::test]
async fn add_result_for_unknown_run_is_rejected() {
    let fake = FakeTestRail::new().with_case(4, "Search");
    let resp = fake
        .router()
        .oneshot(api("POST", "add_result_for_case/123/4", r#"{"status_id":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(fake.results().is_empty());
}

#[tokio::test]
async fn get_runs_lists_project_runs() {
    let fake = FakeTestRail::new();
    for (project, name) in [(1, "a"), (2, "b"), (1, "c")] {
        fake.router()
            .oneshot(api("POST", &format!("add_run/{project}"), &format!(r#"{{"name":"{name}"}}"#)))
            .await
            .unwrap();
    }

    let resp = fake.router().oneshot(api("GET", "get_runs/1", "")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let runs = body_json(resp).await;
    let names: Vec<&str> = runs
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["a", "c"]);
}

// --- attachments ---

#[tokio::test]
async fn get_attachment_returns_raw_bytes() {
    let fake = FakeTestRail::new();
    let id = fake.seed_attachment("out.bin", vec![0u8, 1, 2, 255]);

    let resp = fake
        .router()
        .oneshot(api("GET", &format!("get_attachment/{id}"), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(&body_bytes(resp).await[..], &[0u8, 1, 2, 255]);
}

// --- cross-cutting behaviour ---

#[tokio::test]
async fn scripted_response_is_served_first() {
    let fake = FakeTestRail::new().with_case(1, "x");
    fake.script(500, "");

    let resp = fake.router().oneshot(api("GET", "get_case/1", "")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_bytes(resp).await.is_empty());

    let resp = fake.router().oneshot(api("GET", "get_case/1", "")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(fake.requests().len(), 2);
}

#[tokio::test]
async fn wrong_credentials_get_401() {
    let fake = FakeTestRail::new().with_case(1, "x").require_credentials("user", "other");
    let resp = fake.router().oneshot(api("GET", "get_case/1", "")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("Authentication failed"));
}

#[tokio::test]
async fn unknown_method_is_404() {
    let fake = FakeTestRail::new();
    let resp = fake.router().oneshot(api("GET", "get_everything", "")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn requests_are_captured() {
    let fake = FakeTestRail::new();
    fake.router()
        .oneshot(api("POST", "add_run/3", r#"{"name":"n"}"#))
        .await
        .unwrap();

    let captured = fake.requests();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].method, "POST");
    assert_eq!(captured[0].uri, "add_run/3");
    assert_eq!(captured[0].basic_credentials().as_deref(), Some("user:pass"));
    assert_eq!(captured[0].json().unwrap()["name"], "n");
}

// --- omdb ---

fn omdb_request(query: &str) -> Request<String> {
    Request::builder()
        .uri(format!("/?{query}"))
        .body(String::new())
        .unwrap()
}

#[tokio::test]
async fn omdb_requires_api_key() {
    let resp = omdb::router("k")
        .oneshot(omdb_request("i=tt1810525"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn omdb_lookup_by_id() {
    let resp = omdb::router("k")
        .oneshot(omdb_request("apikey=k&i=tt1810525"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let movie = body_json(resp).await;
    assert_eq!(movie["Released"], "23 Nov 2010");
    assert_eq!(movie["Director"], "Mike Feurstein");
}

#[tokio::test]
async fn omdb_lookup_by_title() {
    let resp = omdb::router("k")
        .oneshot(omdb_request("apikey=k&t=The%20STEM%20Journals"))
        .await
        .unwrap();
    let movie = body_json(resp).await;
    assert_eq!(movie["Runtime"], "22 min");
}
