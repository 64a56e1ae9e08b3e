//! In-process stand-in for the hosted assistants API
//!
//! Serves the handful of routes the interviewer uses and records every call so
//! tests can assert on provider traffic.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ai_interviewer::interview::{AgentConfig, InterviewerAgent};
use ai_interviewer::OpenAiClient;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

/// Everything the mock saw, plus knobs for how runs behave
#[derive(Default)]
pub struct ProviderLog {
    calls: Mutex<Vec<String>>,
    instructions: Mutex<Vec<String>>,
    user_messages: Mutex<Vec<String>>,
    run_polls: Mutex<HashMap<String, usize>>,
    next_id: AtomicUsize,
    /// In-progress answers given before a run completes
    pub polls_before_done: AtomicUsize,
    /// Finish runs as `failed` instead of `completed`
    pub fail_runs: AtomicBool,
    /// Answer chat completions with `"content": null`
    pub refuse_completions: AtomicBool,
}

impl ProviderLog {
    fn record(&self, operation: &str) {
        self.calls.lock().unwrap().push(operation.to_string());
    }

    fn id(&self, prefix: &str) -> String {
        format!("{}_{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.calls().iter().filter(|c| *c == operation).count()
    }

    pub fn instructions(&self) -> Vec<String> {
        self.instructions.lock().unwrap().clone()
    }

    pub fn user_messages(&self) -> Vec<String> {
        self.user_messages.lock().unwrap().clone()
    }
}

/// Handle to a running mock provider
pub struct MockProvider {
    pub base_url: String,
    pub log: Arc<ProviderLog>,
}

impl MockProvider {
    /// A client pointed at this mock
    pub fn client(&self) -> OpenAiClient {
        OpenAiClient::new(&self.base_url, "sk-test")
    }

    /// An agent that polls quickly against this mock
    pub fn agent(&self) -> InterviewerAgent {
        InterviewerAgent::new(self.client(), fast_config())
    }
}

pub fn fast_config() -> AgentConfig {
    AgentConfig {
        poll_interval: Duration::from_millis(5),
        ..AgentConfig::default()
    }
}

/// Start a mock provider on an ephemeral port
pub async fn spawn_mock_provider() -> MockProvider {
    let log = Arc::new(ProviderLog::default());
    log.polls_before_done.store(1, Ordering::SeqCst);

    let app = Router::new()
        .route("/v1/threads", post(create_thread))
        .route("/v1/assistants", post(create_assistant))
        .route(
            "/v1/threads/:thread_id/messages",
            post(create_message).get(list_messages),
        )
        .route("/v1/threads/:thread_id/runs", post(create_run))
        .route("/v1/threads/:thread_id/runs/:run_id", get(retrieve_run))
        .route("/v1/chat/completions", post(chat_completion))
        .with_state(Arc::clone(&log));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockProvider {
        base_url: format!("http://{}/v1", addr),
        log,
    }
}

type Log = State<Arc<ProviderLog>>;

async fn create_thread(State(log): Log) -> Json<Value> {
    log.record("create_thread");
    Json(json!({ "id": log.id("thread"), "object": "thread" }))
}

async fn create_assistant(State(log): Log, Json(body): Json<Value>) -> Json<Value> {
    log.record("create_assistant");
    log.instructions
        .lock()
        .unwrap()
        .push(body["instructions"].as_str().unwrap_or_default().to_string());
    Json(json!({ "id": log.id("asst"), "object": "assistant" }))
}

async fn create_message(
    State(log): Log,
    Path(thread_id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    log.record("create_message");
    let content = body["content"].as_str().unwrap_or_default().to_string();
    log.user_messages.lock().unwrap().push(content.clone());
    Json(json!({
        "id": log.id("msg"),
        "thread_id": thread_id,
        "role": "user",
        "content": [{ "type": "text", "text": { "value": content, "annotations": [] } }]
    }))
}

async fn create_run(State(log): Log, Path(thread_id): Path<String>) -> Json<Value> {
    log.record("create_run");
    Json(json!({ "id": log.id("run"), "thread_id": thread_id, "status": "queued" }))
}

async fn retrieve_run(
    State(log): Log,
    Path((_thread_id, run_id)): Path<(String, String)>,
) -> Json<Value> {
    log.record("retrieve_run");
    let polls = {
        let mut polls = log.run_polls.lock().unwrap();
        let n = polls.entry(run_id.clone()).or_insert(0);
        *n += 1;
        *n
    };

    if polls <= log.polls_before_done.load(Ordering::SeqCst) {
        return Json(json!({ "id": run_id, "status": "in_progress", "last_error": null }));
    }

    if log.fail_runs.load(Ordering::SeqCst) {
        Json(json!({
            "id": run_id,
            "status": "failed",
            "last_error": { "code": "server_error", "message": "model overloaded" }
        }))
    } else {
        Json(json!({ "id": run_id, "status": "completed", "last_error": null }))
    }
}

// Newest first, like the real API with order=desc.
async fn list_messages(State(log): Log, Path(thread_id): Path<String>) -> Json<Value> {
    log.record("list_messages");
    let last_user = log.user_messages().last().cloned().unwrap_or_default();
    let reply = format!("Interviewer reply to: {}", last_user);
    Json(json!({
        "object": "list",
        "data": [
            {
                "id": log.id("msg"),
                "thread_id": thread_id,
                "role": "assistant",
                "content": [{ "type": "text", "text": { "value": reply, "annotations": [] } }]
            },
            {
                "id": log.id("msg"),
                "thread_id": thread_id,
                "role": "user",
                "content": [{ "type": "text", "text": { "value": last_user, "annotations": [] } }]
            }
        ]
    }))
}

async fn chat_completion(State(log): Log, Json(body): Json<Value>) -> Json<Value> {
    log.record("chat_completion");
    let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
    if log.refuse_completions.load(Ordering::SeqCst) {
        return Json(json!({
            "id": log.id("chatcmpl"),
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": null, "refusal": "I can't help with that." }
            }]
        }));
    }
    Json(json!({
        "id": log.id("chatcmpl"),
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": format!("Completion for: {}", prompt) }
        }]
    }))
}
