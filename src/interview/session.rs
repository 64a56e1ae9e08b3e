//! Interview session configuration and the response envelope

use serde::{Deserialize, Serialize};

/// Kind of interview the model should conduct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterviewType {
    Coding,
    #[serde(rename = "Product Sense")]
    ProductSense,
}

impl InterviewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewType::Coding => "Coding",
            InterviewType::ProductSense => "Product Sense",
        }
    }
}

impl std::fmt::Display for InterviewType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Starting difficulty of the questions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(alias = "easy")]
    Easy,
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "hard")]
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interview parameters submitted from the sidebar form
///
/// `recruiterMaterial` and `difficulty` may be omitted; the rendered prompt
/// then keeps their placeholders verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub company: String,
    pub position: String,
    pub interview_type: InterviewType,
    #[serde(default)]
    pub recruiter_material: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

/// Body of `POST /process`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInput {
    pub input: String,
}

/// Uniform result of every backend operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub response: String,
    pub status: u16,
}

impl AgentResponse {
    pub fn new(response: impl Into<String>, status: u16) -> Self {
        Self {
            response: response.into(),
            status,
        }
    }

    pub fn ok(response: impl Into<String>) -> Self {
        Self::new(response, 200)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
