//! Greeting generation service boundary.
//!
//! # Responsibility
//! - Define the async seam to an external text-generation service.
//! - Provide the Gemini `generateContent` client used in production.
//! - Collapse every failure into a fixed fallback greeting.
//!
//! # Invariants
//! - `resolve_greeting` always yields non-empty text and never errors.
//! - Fallback text is tagged so it never enters the rotation pool.
//! - The API key is never written to logs.

use futures_util::future::BoxFuture;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

/// Topic sent with every manual refresh.
pub const REFRESH_TOPIC: &str = "关于时间、哲学、新年的感悟";
/// Used when the service answers with blank text.
pub const EMPTY_RESPONSE_FALLBACK: &str = "在理性的微醺中，迎接跨越维度的2026。";
/// Used when the service call fails.
pub const FAILURE_FALLBACK: &str = "智慧如星辰，照亮2026的未知旅程。";

/// Env var holding the Gemini API key.
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
/// Legacy env var accepted when `GEMINI_API_KEY` is unset.
pub const ENV_API_KEY: &str = "API_KEY";
/// Env var overriding the Gemini model name.
pub const ENV_GEMINI_MODEL: &str = "WATA_GEMINI_MODEL";

const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TEMPERATURE: f32 = 0.85;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Failures of one generation attempt.
#[derive(Debug)]
pub enum GreetingError {
    MissingApiKey,
    Transport(reqwest::Error),
    Status(u16),
    EmptyResponse,
}

impl Display for GreetingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "greeting service api key is not configured"),
            Self::Transport(err) => write!(f, "greeting service request failed: {err}"),
            Self::Status(code) => write!(f, "greeting service returned http {code}"),
            Self::EmptyResponse => write!(f, "greeting service returned no candidates"),
        }
    }
}

impl Error for GreetingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GreetingError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value)
    }
}

/// External generator of short celebratory lines.
pub trait GreetingGenerator: Send + Sync {
    fn generate<'a>(&'a self, topic: &'a str) -> BoxFuture<'a, Result<String, GreetingError>>;
}

/// Result of one refresh attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GreetingOutcome {
    /// Trimmed, non-empty service output.
    Generated(String),
    /// Fixed text shown in place of a missing or failed generation.
    Fallback(&'static str),
}

impl GreetingOutcome {
    pub fn text(&self) -> &str {
        match self {
            Self::Generated(text) => text,
            Self::Fallback(text) => text,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, Self::Generated(_))
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Generated(text) => text,
            Self::Fallback(text) => text.to_string(),
        }
    }
}

/// Runs one generation attempt and degrades to a fixed fallback.
pub async fn resolve_greeting(generator: &dyn GreetingGenerator, topic: &str) -> GreetingOutcome {
    match generator.generate(topic).await {
        Ok(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                info!("event=greeting_generated module=greeting status=empty_fallback");
                GreetingOutcome::Fallback(EMPTY_RESPONSE_FALLBACK)
            } else {
                info!(
                    "event=greeting_generated module=greeting status=ok chars={}",
                    trimmed.chars().count()
                );
                GreetingOutcome::Generated(trimmed.to_string())
            }
        }
        Err(err) => {
            warn!(
                "event=greeting_generated module=greeting status=error_fallback error={}",
                err
            );
            GreetingOutcome::Fallback(FAILURE_FALLBACK)
        }
    }
}

/// Generator used when no service is configured; always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGreetingGenerator;

impl GreetingGenerator for OfflineGreetingGenerator {
    fn generate<'a>(&'a self, _topic: &'a str) -> BoxFuture<'a, Result<String, GreetingError>> {
        Box::pin(async { Err(GreetingError::MissingApiKey) })
    }
}

/// Gemini client settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub temperature: f32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl GeminiConfig {
    /// Reads the key from `GEMINI_API_KEY`, then `API_KEY`.
    pub fn from_env() -> Self {
        let api_key = [ENV_GEMINI_API_KEY, ENV_API_KEY]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty());
        let model = std::env::var(ENV_GEMINI_MODEL)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Self {
            api_key,
            model,
            ..Self::default()
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Builds the tavern-keeper prompt around one keyword.
pub fn build_prompt(topic: &str) -> String {
    format!(
        "你是一个深思熟虑、博学且浪漫的学术酒吧主理人。请为“瓦塔社区酒馆”创作一条2026跨年祝福语。\n\
         调性：理性与感性并重，可以涉及科学、哲学、文学或艺术，字数不超过40字。\n\
         关键词：{topic}"
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TextPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

/// Extracts the concatenated text of the first candidate.
fn first_candidate_text(response: GenerateContentResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text = content
        .parts
        .into_iter()
        .map(|part| part.text)
        .collect::<String>();
    Some(text)
}

/// Gemini `generateContent` client.
pub struct GeminiGreetingService {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiGreetingService {
    pub fn new(config: GeminiConfig) -> Result<Self, GreetingError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, config })
    }

    async fn request(&self, topic: &str) -> Result<String, GreetingError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(GreetingError::MissingApiKey)?;
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        );
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![TextPart {
                    text: build_prompt(topic),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
            },
        };

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GreetingError::Status(status.as_u16()));
        }
        let parsed = response.json::<GenerateContentResponse>().await?;
        first_candidate_text(parsed).ok_or(GreetingError::EmptyResponse)
    }
}

impl GreetingGenerator for GeminiGreetingService {
    fn generate<'a>(&'a self, topic: &'a str) -> BoxFuture<'a, Result<String, GreetingError>> {
        Box::pin(self.request(topic))
    }
}

/// Gemini when an API key is configured, the offline generator otherwise.
pub fn generator_from_config(config: GeminiConfig) -> Arc<dyn GreetingGenerator> {
    if !config.has_api_key() {
        info!("event=greeting_generator module=greeting kind=offline reason=no_api_key");
        return Arc::new(OfflineGreetingGenerator);
    }
    let model = config.model.clone();
    match GeminiGreetingService::new(config) {
        Ok(service) => {
            info!("event=greeting_generator module=greeting kind=gemini model={model}");
            Arc::new(service)
        }
        Err(err) => {
            warn!("event=greeting_generator module=greeting kind=offline error={err}");
            Arc::new(OfflineGreetingGenerator)
        }
    }
}
