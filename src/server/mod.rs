//! HTTP API consumed by the interview UI
//!
//! Every interview endpoint answers with the `{response, status}` envelope and
//! an HTTP status equal to `status`.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::interview::prompts::DEFAULT_BEHAVIORAL_ROLE;
use crate::interview::{
    AgentError, AgentResponse, Difficulty, InterviewerAgent, SessionConfig, Turn, UserInput,
};
use crate::metrics::{self, ERRORS_TOTAL, HTTP_REQUESTS, HTTP_REQUEST_DURATION};
use crate::security::{RateLimitError, RateLimiter};

/// Shared handler state
///
/// One agent per process; the mutex serializes interview requests.
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<Mutex<InterviewerAgent>>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(agent: InterviewerAgent, rate_limiter: RateLimiter) -> Self {
        Self {
            agent: Arc::new(Mutex::new(agent)),
            rate_limiter: Arc::new(rate_limiter),
        }
    }
}

/// Body of `POST /review_code`
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub question: String,
    pub code: String,
}

/// Body of `POST /technical_question`
#[derive(Debug, Default, Deserialize)]
pub struct QuestionRequest {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

/// Body of `POST /behavioral_question`
#[derive(Debug, Default, Deserialize)]
pub struct BehavioralRequest {
    #[serde(default)]
    pub role: Option<String>,
}

/// Body of `POST /critique_answer`
#[derive(Debug, Deserialize)]
pub struct CritiqueRequest {
    pub answer: String,
}

/// Response of `GET /transcript`
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptView {
    pub configured: bool,
    pub turns: usize,
    /// Most recent interviewer reply, if any
    pub last_reply: Option<String>,
    pub messages: Vec<Turn>,
}

impl IntoResponse for AgentResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/set_session_data", post(set_session_data))
        .route("/process", post(process_input))
        .route("/get_summary", post(get_summary))
        .route("/review_code", post(review_code))
        .route("/technical_question", post(technical_question))
        .route("/behavioral_question", post(behavioral_question))
        .route("/critique_answer", post(critique_answer))
        .route("/transcript", get(transcript))
        .route("/health", get(health))
        .route("/metrics", get(metrics_page))
        .layer(middleware::from_fn(track_request))
        .layer(middleware::from_fn(allow_any_origin))
        .with_state(state)
}

// ═══════════════════════════════════════════════════════════════════════════
// Interview endpoints
// ═══════════════════════════════════════════════════════════════════════════

async fn set_session_data(
    State(state): State<AppState>,
    Json(config): Json<SessionConfig>,
) -> AgentResponse {
    let mut agent = state.agent.lock().await;
    agent.set_session_data(config)
}

async fn process_input(
    State(state): State<AppState>,
    Json(input): Json<UserInput>,
) -> AgentResponse {
    let mut agent = state.agent.lock().await;

    // Unconfigured sessions are answered locally and cost nothing.
    if agent.session().is_some() {
        if let Err(limited) = state.rate_limiter.check() {
            return rate_limited(limited);
        }
    }

    agent
        .process_input(&input.input)
        .await
        .unwrap_or_else(error_response)
}

async fn get_summary(State(state): State<AppState>) -> AgentResponse {
    let mut agent = state.agent.lock().await;

    if agent.turns() >= 2 {
        if let Err(limited) = state.rate_limiter.check() {
            return rate_limited(limited);
        }
    }

    agent.get_summary().await.unwrap_or_else(error_response)
}

// ═══════════════════════════════════════════════════════════════════════════
// Practice helpers (no session required)
// ═══════════════════════════════════════════════════════════════════════════

async fn review_code(
    State(state): State<AppState>,
    Json(request): Json<ReviewRequest>,
) -> AgentResponse {
    if let Err(limited) = state.rate_limiter.check() {
        return rate_limited(limited);
    }

    let agent = state.agent.lock().await;
    agent
        .review_code(&request.question, &request.code)
        .await
        .unwrap_or_else(error_response)
}

async fn technical_question(
    State(state): State<AppState>,
    Json(request): Json<QuestionRequest>,
) -> AgentResponse {
    if let Err(limited) = state.rate_limiter.check() {
        return rate_limited(limited);
    }

    let topic = request.topic.as_deref().unwrap_or("binary trees");
    let difficulty = request.difficulty.unwrap_or(Difficulty::Medium);

    let agent = state.agent.lock().await;
    agent
        .technical_question(topic, difficulty.as_str())
        .await
        .unwrap_or_else(error_response)
}

async fn behavioral_question(
    State(state): State<AppState>,
    Json(request): Json<BehavioralRequest>,
) -> AgentResponse {
    if let Err(limited) = state.rate_limiter.check() {
        return rate_limited(limited);
    }

    let role = request
        .role
        .as_deref()
        .filter(|r| !r.trim().is_empty())
        .unwrap_or(DEFAULT_BEHAVIORAL_ROLE);

    let agent = state.agent.lock().await;
    agent
        .behavioral_question(role)
        .await
        .unwrap_or_else(error_response)
}

async fn critique_answer(
    State(state): State<AppState>,
    Json(request): Json<CritiqueRequest>,
) -> AgentResponse {
    if request.answer.trim().is_empty() {
        return AgentResponse::new("Answer must not be empty", StatusCode::BAD_REQUEST.as_u16());
    }
    if let Err(limited) = state.rate_limiter.check() {
        return rate_limited(limited);
    }

    let agent = state.agent.lock().await;
    agent
        .critique_answer(&request.answer)
        .await
        .unwrap_or_else(error_response)
}

// ═══════════════════════════════════════════════════════════════════════════
// Introspection
// ═══════════════════════════════════════════════════════════════════════════

async fn transcript(State(state): State<AppState>) -> Json<TranscriptView> {
    let agent = state.agent.lock().await;
    let transcript = agent.transcript();
    Json(TranscriptView {
        configured: agent.session().is_some(),
        turns: agent.turns(),
        last_reply: transcript.last_reply().map(str::to_owned),
        messages: transcript.turns().to_vec(),
    })
}

async fn health() -> &'static str {
    "ok"
}

async fn metrics_page() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render(),
    )
}

// ═══════════════════════════════════════════════════════════════════════════
// Envelope helpers
// ═══════════════════════════════════════════════════════════════════════════

fn error_response(err: AgentError) -> AgentResponse {
    ERRORS_TOTAL.with_label_values(&[err.kind()]).inc();
    warn!(error = %err, "Request failed");
    AgentResponse::new(err.to_string(), err.status_code())
}

fn rate_limited(err: RateLimitError) -> AgentResponse {
    ERRORS_TOTAL.with_label_values(&["rate_limited"]).inc();
    warn!(retry_after = ?err.retry_after, "Rate limit exceeded");
    AgentResponse::new(err.to_string(), StatusCode::TOO_MANY_REQUESTS.as_u16())
}

// ═══════════════════════════════════════════════════════════════════════════
// Middleware
// ═══════════════════════════════════════════════════════════════════════════

/// Wrap each request in a span carrying a trace id and record HTTP metrics
async fn track_request(request: Request, next: Next) -> Response {
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let trace_id = request
        .headers()
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::now_v7().to_string());

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %request.method(),
        endpoint = %endpoint,
    );

    let start = Instant::now();
    let mut response = next.run(request).instrument(span.clone()).await;
    let elapsed = start.elapsed();
    let status = response.status();

    HTTP_REQUESTS
        .with_label_values(&[&endpoint, status.as_str()])
        .inc();
    HTTP_REQUEST_DURATION
        .with_label_values(&[&endpoint])
        .observe(elapsed.as_secs_f64());

    span.in_scope(|| {
        info!(
            status = status.as_u16(),
            duration_ms = elapsed.as_secs_f64() * 1000.0,
            "Request completed"
        )
    });

    if let Ok(value) = HeaderValue::from_str(&trace_id) {
        response.headers_mut().insert("x-trace-id", value);
    }
    response
}

/// The browser UI is served from a different origin than the API.
async fn allow_any_origin(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("*"),
    );
    response
}
