//! HTTP client for the hosted assistants and chat-completions APIs

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::types::{
    Assistant, ChatCompletionRequest, ChatCompletionResponse, ChatMessage,
    CreateAssistantRequest, CreateMessageRequest, CreateRunRequest, MessageList, Run, Thread,
    ThreadMessage,
};
use crate::metrics::PROVIDER_CALLS;

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Error type for provider operations
#[derive(Debug)]
pub enum ProviderError {
    /// Transport-level failure (DNS, TLS, connection reset, ...)
    Request(reqwest::Error),
    /// Non-2xx answer from the provider
    Status { status: u16, body: String },
    /// Body did not match the expected shape
    Parse(serde_json::Error),
    EmptyResponse,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::Request(e) => write!(f, "Request error: {}", e),
            ProviderError::Status { status, body } => {
                write!(f, "Provider returned HTTP {}: {}", status, body)
            }
            ProviderError::Parse(e) => write!(f, "Parse error: {}", e),
            ProviderError::EmptyResponse => write!(f, "Empty response from provider"),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Request(e)
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Parse(e)
    }
}

/// Client for the provider's REST API
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - API root, e.g. "https://api.openai.com/v1" (no trailing slash needed)
    /// * `api_key` - Bearer token sent with every request
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create an empty conversation thread
    pub async fn create_thread(&self) -> Result<Thread, ProviderError> {
        self.post("create_thread", "/threads", &serde_json::json!({}))
            .await
    }

    /// Create an assistant carrying the interviewer instructions
    pub async fn create_assistant(
        &self,
        request: &CreateAssistantRequest,
    ) -> Result<Assistant, ProviderError> {
        self.post("create_assistant", "/assistants", request).await
    }

    /// Append a user message to a thread
    pub async fn create_message(
        &self,
        thread_id: &str,
        content: &str,
    ) -> Result<ThreadMessage, ProviderError> {
        let body = CreateMessageRequest {
            role: "user".to_string(),
            content: content.to_string(),
        };
        self.post(
            "create_message",
            &format!("/threads/{}/messages", thread_id),
            &body,
        )
        .await
    }

    /// Start a run of `assistant_id` over the thread
    pub async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run, ProviderError> {
        let body = CreateRunRequest {
            assistant_id: assistant_id.to_string(),
        };
        self.post("create_run", &format!("/threads/{}/runs", thread_id), &body)
            .await
    }

    /// Fetch the current state of a run
    pub async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run, ProviderError> {
        self.get(
            "retrieve_run",
            &format!("/threads/{}/runs/{}", thread_id, run_id),
        )
        .await
    }

    /// List thread messages, newest first
    pub async fn list_messages(&self, thread_id: &str) -> Result<MessageList, ProviderError> {
        self.get(
            "list_messages",
            &format!("/threads/{}/messages?order=desc&limit=20", thread_id),
        )
        .await
    }

    /// One-shot chat completion, returning the first choice's text
    pub async fn chat_completion(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
        temperature: f32,
    ) -> Result<String, ProviderError> {
        let body = ChatCompletionRequest {
            model: model.to_string(),
            messages,
            temperature,
        };

        let response: ChatCompletionResponse =
            self.post("chat_completion", "/chat/completions", &body).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(ProviderError::EmptyResponse)
    }

    async fn post<B, T>(&self, operation: &str, path: &str, body: &B) -> Result<T, ProviderError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        PROVIDER_CALLS.with_label_values(&[operation]).inc();
        debug!(operation, path, "POST to provider");

        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", "assistants=v2")
            .json(body)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn get<T>(&self, operation: &str, path: &str) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
    {
        PROVIDER_CALLS.with_label_values(&[operation]).inc();
        debug!(operation, path, "GET from provider");

        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", "assistants=v2")
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ProviderError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        Ok(serde_json::from_str(&text)?)
    }
}
