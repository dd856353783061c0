use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("API error (status {status}): {body}")]
    ApiError { status: u16, body: String },
    #[error("Malformed response: {0}")]
    Decode(String),
    #[error("Response contained no candidates")]
    EmptyResponse,
}

#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    /// `None` when `GEMINI_API_KEY` is unset; the chat path is then disabled.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").ok()?;

        Some(Self {
            api_key,
            model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-flash-latest".to_string()),
            api_base: std::env::var("GEMINI_API_BASE").unwrap_or_else(|_| {
                "https://generativelanguage.googleapis.com/v1beta".to_string()
            }),
            timeout: Duration::from_secs(
                std::env::var("GEMINI_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(20),
            ),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }

    fn request_url(&self) -> String {
        format!(
            "{}?key={}",
            self.endpoint(),
            urlencoding::encode(&self.api_key)
        )
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Text of the first part of the first candidate.
fn first_candidate_text(body: &str) -> Result<String, GeminiError> {
    let parsed: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| GeminiError::Decode(e.to_string()))?;

    parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or(GeminiError::EmptyResponse)
}

#[derive(Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, GeminiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GeminiError::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Single-turn generation: the system prompt and the user's message go out
    /// as two parts of one turn. No retries.
    pub async fn generate(&self, system_prompt: &str, message: &str) -> Result<String, GeminiError> {
        let body = json!({
            "contents": [{
                "parts": [
                    { "text": system_prompt },
                    { "text": format!("User message: {}", message) },
                ],
            }],
            "generationConfig": {
                "temperature": 0.7,
                "topK": 40,
                "topP": 0.95,
                "maxOutputTokens": 1024,
            },
        });

        let response = self
            .client
            .post(self.config.request_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| GeminiError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GeminiError::Network(e.to_string()))?;

        if !status.is_success() {
            warn!("Gemini returned {}: {}", status, text);
            return Err(GeminiError::ApiError {
                status: status.as_u16(),
                body: text,
            });
        }

        let reply = first_candidate_text(&text)?;
        info!(model = %self.config.model, chars = reply.len(), "Gemini reply received");
        Ok(reply)
    }
}
