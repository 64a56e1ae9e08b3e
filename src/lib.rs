//! AI Interviewer - mock interview backend over a hosted language model
//!
//! The backend keeps one interview session in memory, turns the submitted
//! interview parameters into interviewer instructions, and relays candidate
//! turns to an assistants-style provider API, polling each run to completion.
//!
//! # Modules
//!
//! - `interview` - session state, prompt templates, transcript, turn orchestration
//! - `openai` - provider client (threads, messages, runs, chat completions)
//! - `server` - axum router exposing the interview endpoints
//! - `security` - token-bucket admission for provider-backed endpoints
//! - `metrics` - Prometheus metrics
//! - `telemetry` - tracing subscriber and optional OTLP export
//! - `config` - environment-driven server configuration
//!
//! # Quick Start
//!
//! ```ignore
//! use ai_interviewer::{AgentConfig, InterviewerAgent, OpenAiClient};
//!
//! let client = OpenAiClient::new("https://api.openai.com/v1", api_key);
//! let mut agent = InterviewerAgent::new(client, AgentConfig::default());
//! agent.set_session_data(session);
//! let reply = agent.process_input("Let's start!").await?;
//! ```

pub mod config;
pub mod interview;
pub mod metrics;
pub mod openai;
pub mod security;
pub mod server;
pub mod telemetry;

pub use config::ServerConfig;
pub use interview::{AgentConfig, AgentResponse, InterviewerAgent, SessionConfig};
pub use openai::OpenAiClient;
pub use server::{create_router, AppState};
