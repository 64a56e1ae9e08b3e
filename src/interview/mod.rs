//! Mock interview orchestration
//!
//! ```text
//! POST /set_session_data → InterviewerAgent::set_session_data (reset + render prompt)
//! POST /process          → append turn → thread message → run → poll → reply
//! POST /get_summary      → same path with the fixed summary instruction
//! ```

pub mod agent;
pub mod prompts;
pub mod session;
pub mod transcript;

pub use agent::{AgentConfig, AgentError, InterviewerAgent, SESSION_NOT_SET, SESSION_SET};
pub use session::{AgentResponse, Difficulty, InterviewType, SessionConfig, UserInput};
pub use transcript::{Role, Transcript, Turn};
