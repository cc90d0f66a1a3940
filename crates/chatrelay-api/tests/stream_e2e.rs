//! End-to-end tests: real router, real SQLite, mock upstream engine.

use std::net::SocketAddr;

use axum::Router;
use axum::body::Body;
use axum::response::IntoResponse;
use axum::routing::{get, post};

use chatrelay_api::http::router::build_router;
use chatrelay_api::state::AppState;

// AppState::init reads CHATRELAY_DATA_DIR; serialize setup across tests.
static ENV_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

/// Spawn a mock Ollama server returning the given NDJSON body.
async fn spawn_upstream(lines: &'static str) -> SocketAddr {
    let app = Router::new()
        .route(
            "/api/generate",
            post(move || async move { Body::from(lines).into_response() }),
        )
        .route(
            "/api/tags",
            get(|| async { axum::Json(serde_json::json!({ "models": [] })) }),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Build app state against a scratch data dir and the given upstream, then
/// serve the real router on an ephemeral port.
async fn spawn_api(upstream: SocketAddr) -> (SocketAddr, tempfile::TempDir) {
    spawn_api_with_idle(upstream, 120).await
}

async fn spawn_api_with_idle(
    upstream: SocketAddr,
    idle_timeout_secs: u64,
) -> (SocketAddr, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = format!(
        "[upstream]\nbase_url = \"http://{upstream}\"\nidle_timeout_secs = {idle_timeout_secs}\n"
    );
    std::fs::write(dir.path().join("config.toml"), config).unwrap();

    let state = {
        let _guard = ENV_LOCK.lock().await;
        unsafe { std::env::set_var("CHATRELAY_DATA_DIR", dir.path()) };
        let state = AppState::init().await.unwrap();
        unsafe { std::env::remove_var("CHATRELAY_DATA_DIR") };
        state
    };

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, dir)
}

/// Collect `(event, data)` pairs from an SSE body, ignoring keep-alives.
fn parse_sse(body: &str) -> Vec<(String, String)> {
    let mut events = Vec::new();
    let mut current_event = String::new();
    for line in body.lines() {
        if let Some(name) = line.strip_prefix("event: ") {
            current_event = name.to_string();
        } else if let Some(data) = line.strip_prefix("data: ") {
            if !current_event.is_empty() {
                events.push((current_event.clone(), data.to_string()));
            }
        } else if line.is_empty() {
            current_event.clear();
        }
    }
    events
}

#[tokio::test]
async fn test_full_turn_streams_and_persists() {
    let upstream = spawn_upstream(concat!(
        "{\"response\":\"Hello\",\"done\":false}\n",
        "{\"response\":\" there\",\"done\":false}\n",
        "{\"response\":\"\",\"done\":true}\n",
    ))
    .await;
    let (api, _dir) = spawn_api(upstream).await;
    let client = reqwest::Client::new();

    let body = client
        .post(format!("http://{api}/api/v1/chat/stream"))
        .json(&serde_json::json!({ "message": "Say hello" }))
        .send()
        .await
        .unwrap()
        .error_for_status()
        .unwrap()
        .text()
        .await
        .unwrap();

    let events = parse_sse(&body);
    assert_eq!(events[0].0, "conversation");
    let started: serde_json::Value = serde_json::from_str(&events[0].1).unwrap();
    assert_eq!(started["created"], true);
    let conversation_id = started["conversation_id"].as_str().unwrap().to_string();

    let chunks: Vec<&str> = events
        .iter()
        .filter(|(name, _)| name == "chunk")
        .map(|(_, data)| data.as_str())
        .collect();
    assert_eq!(chunks.len(), 2);
    assert_eq!(events.last().unwrap().0, "done");

    // Both sides of the turn were persisted in order.
    let messages: serde_json::Value = client
        .get(format!(
            "http://{api}/api/v1/conversations/{conversation_id}/messages"
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let data = messages["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["role"], "user");
    assert_eq!(data[0]["content"], "Say hello");
    assert_eq!(data[1]["role"], "assistant");
    assert_eq!(data[1]["content"], "Hello there");

    // Listing shows the derived title and the message count.
    let list: serde_json::Value = client
        .get(format!("http://{api}/api/v1/conversations"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let summaries = list["data"].as_array().unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0]["title"], "Say hello");
    assert_eq!(summaries[0]["message_count"], 2);
}

#[tokio::test]
async fn test_empty_message_is_rejected_with_400() {
    let upstream = spawn_upstream("").await;
    let (api, _dir) = spawn_api(upstream).await;

    let response = reqwest::Client::new()
        .post(format!("http://{api}/api/v1/chat/stream"))
        .json(&serde_json::json!({ "message": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["errors"][0]["code"], "invalid_request");
}

#[tokio::test]
async fn test_unknown_conversation_is_404() {
    let upstream = spawn_upstream("").await;
    let (api, _dir) = spawn_api(upstream).await;

    let response = reqwest::Client::new()
        .post(format!("http://{api}/api/v1/chat/stream"))
        .json(&serde_json::json!({
            "conversation_id": uuid::Uuid::now_v7().to_string(),
            "message": "hello",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_upstream_failure_arrives_as_error_event() {
    let upstream = spawn_upstream("{\"error\":\"model 'nope' not found\"}\n").await;
    let (api, _dir) = spawn_api(upstream).await;

    let body = reqwest::Client::new()
        .post(format!("http://{api}/api/v1/chat/stream"))
        .json(&serde_json::json!({ "message": "hello", "model": "nope" }))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    let events = parse_sse(&body);
    let (name, data) = events.last().unwrap();
    assert_eq!(name, "error");
    let error: serde_json::Value = serde_json::from_str(data).unwrap();
    assert_eq!(error["kind"], "upstream_reported_error");
}

#[tokio::test]
async fn test_silent_upstream_times_out_keeping_user_message_only() {
    // Upstream accepts the request then never sends a byte.
    let app = Router::new().route(
        "/api/generate",
        post(|| async {
            let body = Body::from_stream(async_stream::stream! {
                tokio::time::sleep(std::time::Duration::from_secs(60)).await;
                yield Ok::<_, std::io::Error>("");
            });
            body.into_response()
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let upstream = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let (api, _dir) = spawn_api_with_idle(upstream, 1).await;
    let client = reqwest::Client::new();

    let body = client
        .post(format!("http://{api}/api/v1/chat/stream"))
        .json(&serde_json::json!({ "message": "anyone there?" }))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    let events = parse_sse(&body);
    let started: serde_json::Value = serde_json::from_str(&events[0].1).unwrap();
    let conversation_id = started["conversation_id"].as_str().unwrap().to_string();
    let (name, data) = events.last().unwrap();
    assert_eq!(name, "error");
    let error: serde_json::Value = serde_json::from_str(data).unwrap();
    assert_eq!(error["kind"], "upstream_timeout");

    // Only the user message survived the failed turn.
    let messages: serde_json::Value = client
        .get(format!(
            "http://{api}/api/v1/conversations/{conversation_id}/messages"
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let data = messages["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["role"], "user");
}

#[tokio::test]
async fn test_rename_and_delete_conversation() {
    let upstream = spawn_upstream(concat!(
        "{\"response\":\"hi\",\"done\":false}\n",
        "{\"response\":\"\",\"done\":true}\n",
    ))
    .await;
    let (api, _dir) = spawn_api(upstream).await;
    let client = reqwest::Client::new();

    let body = client
        .post(format!("http://{api}/api/v1/chat/stream"))
        .json(&serde_json::json!({ "message": "first" }))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    let events = parse_sse(&body);
    let started: serde_json::Value = serde_json::from_str(&events[0].1).unwrap();
    let conversation_id = started["conversation_id"].as_str().unwrap().to_string();

    let renamed: serde_json::Value = client
        .put(format!(
            "http://{api}/api/v1/conversations/{conversation_id}/title"
        ))
        .json(&serde_json::json!({ "title": "Renamed" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(renamed["data"]["title"], "Renamed");

    let deleted = client
        .delete(format!("http://{api}/api/v1/conversations/{conversation_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), 200);

    let gone = client
        .get(format!("http://{api}/api/v1/conversations/{conversation_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status(), 404);
}

#[tokio::test]
async fn test_health_reports_upstream() {
    let upstream = spawn_upstream("").await;
    let (api, _dir) = spawn_api(upstream).await;

    let health: serde_json::Value = reqwest::Client::new()
        .get(format!("http://{api}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["upstream"], "reachable");
}
