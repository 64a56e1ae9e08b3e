//! Interviewer agent - session state plus the model-turn loop
//!
//! The agent owns everything that lives for one interview: the submitted
//! configuration, the local transcript and the provider-side thread and
//! assistant handles. Submitting a new configuration drops all of it.

use std::time::{Duration, Instant};

use tracing::{debug, info, info_span, warn, Instrument};

use super::prompts::{self, NOT_ENOUGH_CONVERSATION, SUMMARY_PROMPT};
use super::session::{AgentResponse, SessionConfig};
use super::transcript::{Role, Transcript};
use crate::metrics::{RUNS_TOTAL, RUN_DURATION, RUN_POLLS_TOTAL, SESSION_RESETS_TOTAL, TURNS_TOTAL};
use crate::openai::types::CreateAssistantRequest;
use crate::openai::{ChatMessage, OpenAiClient, ProviderError, Run, RunStatus};

/// Text returned when a turn arrives before any configuration
pub const SESSION_NOT_SET: &str = "Session data not set";

/// Text returned after a configuration is accepted
pub const SESSION_SET: &str = "Session data set successfully";

/// Configuration for the interviewer agent
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Model backing the assistant (e.g., "gpt-4o")
    pub model: String,
    /// Sampling temperature for interview turns
    pub temperature: f32,
    /// Display name given to the provider-side assistant
    pub assistant_name: String,
    /// Delay between run status polls
    pub poll_interval: Duration,
    /// Give up on a run after this long; `None` waits forever
    pub max_run_wait: Option<Duration>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            temperature: 0.7,
            assistant_name: "AI Interviewer".to_string(),
            poll_interval: Duration::from_secs(2),
            max_run_wait: None,
        }
    }
}

/// Error type for agent operations
#[derive(Debug)]
pub enum AgentError {
    /// The provider could not be reached or answered badly
    Provider(ProviderError),
    /// A run ended in a terminal state other than `completed`
    RunFailed(String),
    /// A run was still pending when `max_run_wait` elapsed
    RunTimedOut { run_id: String, waited: Duration },
    /// The run completed but the thread holds no assistant text
    NoAssistantReply,
}

impl AgentError {
    /// Envelope status reported for this error
    pub fn status_code(&self) -> u16 {
        match self {
            AgentError::Provider(_) => 500,
            AgentError::RunFailed(_) | AgentError::NoAssistantReply => 502,
            AgentError::RunTimedOut { .. } => 504,
        }
    }

    /// Short label used for the errors metric
    pub fn kind(&self) -> &'static str {
        match self {
            AgentError::Provider(_) => "provider_error",
            AgentError::RunFailed(_) => "run_failed",
            AgentError::RunTimedOut { .. } => "run_timed_out",
            AgentError::NoAssistantReply => "no_assistant_reply",
        }
    }
}

impl std::fmt::Display for AgentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentError::Provider(e) => write!(f, "Provider error: {}", e),
            AgentError::RunFailed(reason) => write!(f, "Model run failed: {}", reason),
            AgentError::RunTimedOut { run_id, waited } => {
                write!(f, "Model run {} still pending after {:?}", run_id, waited)
            }
            AgentError::NoAssistantReply => write!(f, "Model run produced no assistant reply"),
        }
    }
}

impl std::error::Error for AgentError {}

impl From<ProviderError> for AgentError {
    fn from(e: ProviderError) -> Self {
        AgentError::Provider(e)
    }
}

/// Mock interviewer driving one conversation at a time
pub struct InterviewerAgent {
    client: OpenAiClient,
    config: AgentConfig,
    session: Option<SessionConfig>,
    system_prompt: Option<String>,
    transcript: Transcript,
    thread_id: Option<String>,
    assistant_id: Option<String>,
    turns: usize,
}

impl InterviewerAgent {
    /// Create an agent with no session configured
    pub fn new(client: OpenAiClient, config: AgentConfig) -> Self {
        Self {
            client,
            config,
            session: None,
            system_prompt: None,
            transcript: Transcript::new(),
            thread_id: None,
            assistant_id: None,
            turns: 0,
        }
    }

    pub fn session(&self) -> Option<&SessionConfig> {
        self.session.as_ref()
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Number of answered interview turns in this session
    pub fn turns(&self) -> usize {
        self.turns
    }

    /// Provider thread backing the session, once the first turn created it
    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    /// Replace the session configuration, discarding all conversation state
    pub fn set_session_data(&mut self, config: SessionConfig) -> AgentResponse {
        self.reset();

        info!(
            company = %config.company,
            position = %config.position,
            interview_type = %config.interview_type,
            "Session data set"
        );

        self.system_prompt = Some(prompts::system_prompt(&config));
        self.session = Some(config);
        SESSION_RESETS_TOTAL.inc();

        AgentResponse::ok(SESSION_SET)
    }

    fn reset(&mut self) {
        if let Some(thread_id) = self.thread_id.take() {
            debug!(thread_id = %thread_id, "Dropping provider thread");
        }
        self.assistant_id = None;
        self.session = None;
        self.system_prompt = None;
        self.transcript.clear();
        self.turns = 0;
    }

    /// Answer one candidate turn
    ///
    /// Returns a 400 envelope without touching the provider when no session
    /// is configured.
    pub async fn process_input(&mut self, input: &str) -> Result<AgentResponse, AgentError> {
        let Some(system_prompt) = self.system_prompt.clone() else {
            warn!("Input received before session data was set");
            return Ok(AgentResponse::new(SESSION_NOT_SET, 400));
        };

        let span = info_span!("interview_turn", turn = self.turns + 1, model = %self.config.model);
        let reply = self.get_ai_response(input).instrument(span).await?;

        info!(turn = self.turns + 1, reply_len = reply.len(), "Processed input");

        // A turn is only recorded once the model has answered it.
        if self.transcript.is_empty() {
            self.transcript.push(Role::System, system_prompt);
        }
        self.transcript.push(Role::User, input);
        self.transcript.push(Role::Assistant, reply.clone());
        self.turns += 1;
        TURNS_TOTAL.inc();

        Ok(AgentResponse::ok(reply))
    }

    /// Ask the model for feedback and a study plan
    ///
    /// Needs at least two answered turns; otherwise returns a fixed message
    /// without contacting the provider.
    pub async fn get_summary(&mut self) -> Result<AgentResponse, AgentError> {
        if self.turns < 2 {
            debug!(turns = self.turns, "Summary requested too early");
            return Ok(AgentResponse::ok(NOT_ENOUGH_CONVERSATION));
        }

        let span = info_span!("interview_summary", turns = self.turns);
        let summary = self.get_ai_response(SUMMARY_PROMPT).instrument(span).await?;
        info!(summary_len = summary.len(), "Summary generated");

        Ok(AgentResponse::ok(summary))
    }

    /// Review a candidate's solution (independent of the interview thread)
    pub async fn review_code(&self, question: &str, code: &str) -> Result<AgentResponse, AgentError> {
        let prompt = prompts::code_review_prompt(question, code);
        self.complete(prompt)
            .instrument(info_span!("code_review", code_len = code.len()))
            .await
    }

    /// Generate a practice question (independent of the interview thread)
    pub async fn technical_question(
        &self,
        topic: &str,
        difficulty: &str,
    ) -> Result<AgentResponse, AgentError> {
        let prompt = prompts::technical_question_prompt(topic, difficulty);
        self.complete(prompt)
            .instrument(info_span!("technical_question", topic = %topic, difficulty = %difficulty))
            .await
    }

    /// Ask a STAR-formatted behavioural question for `role`
    pub async fn behavioral_question(&self, role: &str) -> Result<AgentResponse, AgentError> {
        let prompt = prompts::behavioral_question_prompt(role);
        self.complete(prompt)
            .instrument(info_span!("behavioral_question", role = %role))
            .await
    }

    /// Critique a STAR answer for specificity and metrics
    pub async fn critique_answer(&self, answer: &str) -> Result<AgentResponse, AgentError> {
        let prompt = prompts::critique_answer_prompt(answer);
        self.complete(prompt)
            .instrument(info_span!("critique_answer", answer_len = answer.len()))
            .await
    }

    /// Single chat completion outside the interview thread
    async fn complete(&self, prompt: String) -> Result<AgentResponse, AgentError> {
        let text = self
            .client
            .chat_completion(&self.config.model, vec![ChatMessage::user(prompt)], self.config.temperature)
            .await?;
        Ok(AgentResponse::ok(text))
    }

    async fn ensure_thread(&mut self) -> Result<String, AgentError> {
        if let Some(id) = &self.thread_id {
            return Ok(id.clone());
        }
        let thread = self.client.create_thread().await?;
        info!(thread_id = %thread.id, "Created provider thread");
        self.thread_id = Some(thread.id.clone());
        Ok(thread.id)
    }

    async fn ensure_assistant(&mut self) -> Result<String, AgentError> {
        if let Some(id) = &self.assistant_id {
            return Ok(id.clone());
        }
        let request = CreateAssistantRequest {
            name: self.config.assistant_name.clone(),
            instructions: self.system_prompt.clone().unwrap_or_default(),
            model: self.config.model.clone(),
            temperature: self.config.temperature,
        };
        let assistant = self.client.create_assistant(&request).await?;
        info!(assistant_id = %assistant.id, model = %self.config.model, "Created provider assistant");
        self.assistant_id = Some(assistant.id.clone());
        Ok(assistant.id)
    }

    /// Post `content` to the thread, run the assistant and return its reply
    async fn get_ai_response(&mut self, content: &str) -> Result<String, AgentError> {
        // Provider resources are created on first use
        let assistant_id = self.ensure_assistant().await?;
        let thread_id = self.ensure_thread().await?;

        // Post the message and start the assistant on the thread
        self.client.create_message(&thread_id, content).await?;
        let run = self.client.create_run(&thread_id, &assistant_id).await?;
        debug!(run_id = %run.id, status = %run.status, "Run created");

        // Block until the run settles
        let run = self.wait_for_run(&thread_id, &run.id).await?;

        if run.status != RunStatus::Completed {
            let reason = run
                .last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| format!("run ended with status {}", run.status));
            warn!(run_id = %run.id, status = %run.status, reason = %reason, "Run failed");
            return Err(AgentError::RunFailed(reason));
        }

        // Newest assistant message on the thread is the reply
        self.latest_assistant_reply(&thread_id).await
    }

    /// Poll a run at `poll_interval` until it reaches a terminal state
    async fn wait_for_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AgentError> {
        let started = Instant::now();
        let mut polls = 0u32;

        loop {
            let run = self.client.retrieve_run(thread_id, run_id).await?;
            polls += 1;
            RUN_POLLS_TOTAL.inc();
            debug!(run_id, status = %run.status, polls, "Current run status");

            if run.status.is_terminal() {
                RUN_DURATION.observe(started.elapsed().as_secs_f64());
                RUNS_TOTAL.with_label_values(&[run.status.as_str()]).inc();
                return Ok(run);
            }

            if let Some(limit) = self.config.max_run_wait {
                let waited = started.elapsed();
                if waited >= limit {
                    RUNS_TOTAL.with_label_values(&["timed_out"]).inc();
                    return Err(AgentError::RunTimedOut {
                        run_id: run_id.to_string(),
                        waited,
                    });
                }
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    async fn latest_assistant_reply(&self, thread_id: &str) -> Result<String, AgentError> {
        let messages = self.client.list_messages(thread_id).await?;
        debug!(count = messages.data.len(), "Listed thread messages");

        messages
            .data
            .iter()
            .filter(|m| m.role == "assistant")
            .find_map(|m| m.text())
            .ok_or(AgentError::NoAssistantReply)
    }
}
