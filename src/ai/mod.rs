//! AI-assist: similar-question generation and answer explanation.
//!
//! The provider is reached through [`TextGenerator`], a prompt-in/text-out
//! seam. [`gemini::GeminiClient`] is the production implementation; tests
//! substitute scripted generators.

use std::fmt;

use async_trait::async_trait;

pub mod assist;
pub mod gemini;

pub use assist::{explain_question, generate_similar_question};
pub use gemini::GeminiClient;

/// Why a generation attempt produced nothing usable.
#[derive(Debug)]
pub enum AiError {
    /// Connection failure, timeout or non-success status.
    Transport(String),
    /// The provider answered but the content was empty or malformed.
    InvalidReply(String),
}

impl fmt::Display for AiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiError::Transport(msg) => write!(f, "AI transport error: {}", msg),
            AiError::InvalidReply(msg) => write!(f, "AI reply rejected: {}", msg),
        }
    }
}

impl std::error::Error for AiError {}

impl From<AiError> for crate::error::AppError {
    fn from(err: AiError) -> Self {
        crate::error::AppError::AiUnavailable(err.to_string())
    }
}

/// An opaque text-generation service.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the model's raw reply to `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, AiError>;
}
