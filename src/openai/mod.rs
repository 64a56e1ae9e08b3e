//! Hosted language-model provider integration
//!
//! This module provides a client for the assistants API (threads, messages,
//! asynchronous runs) and for one-shot chat completions.

pub mod client;
pub mod types;

pub use client::{OpenAiClient, ProviderError, DEFAULT_BASE_URL};
pub use types::{ChatMessage, Run, RunError, RunStatus, ThreadMessage};
