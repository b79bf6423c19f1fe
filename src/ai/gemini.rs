//! Minimal client for the Generative Language `generateContent` endpoint.
//!
//! One prompt in, the first candidate's text out. Calls are instrumented with
//! model name, prompt length and latency. Prompt contents and the API key are
//! never logged.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{AiError, TextGenerator};
use crate::config::Config;

#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Builds the client with the configured key, model, endpoint and timeout.
    pub fn from_config(config: &Config) -> Result<Self, AiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.ai_timeout_secs))
            .build()
            .map_err(|e| AiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.ai_api_key.clone(),
            base_url: config.ai_base_url.trim_end_matches('/').to_string(),
            model: config.ai_model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    #[instrument(level = "info", skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let req = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt.to_string() }],
            }],
        };

        let start = Instant::now();
        let res = self
            .client
            .post(self.endpoint())
            .header(USER_AGENT, concat!("past-exams/", env!("CARGO_PKG_VERSION")))
            .header(CONTENT_TYPE, "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&req)
            .send()
            .await
            .map_err(|e| AiError::Transport(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            let msg = extract_error_message(&body).unwrap_or(body);
            return Err(AiError::Transport(format!("HTTP {}: {}", status, msg)));
        }

        let body: GenerateContentResponse = res
            .json()
            .await
            .map_err(|e| AiError::InvalidReply(e.to_string()))?;

        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect::<String>())
            .unwrap_or_default();

        info!(elapsed = ?start.elapsed(), reply_len = text.len(), "Model response received");

        if text.trim().is_empty() {
            return Err(AiError::InvalidReply("empty candidate list or text".to_string()));
        }

        Ok(text)
    }
}

/// Pulls `error.message` out of a provider error body.
fn extract_error_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct Envelope {
        error: ErrorBody,
    }
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    serde_json::from_str::<Envelope>(body)
        .ok()
        .map(|e| e.error.message)
}

// --- Wire DTOs ---

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}
