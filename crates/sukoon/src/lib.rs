//! Bilingual (English/Urdu) guidance pipeline on top of an OpenAI-compatible
//! chat completions API.
//!
//! `sukoon` takes a line of user text and turns it into a displayable set of
//! segments: an English reply, a supporting verse or reference, and an Urdu
//! rendering. The work is split into four small stages that the
//! [`GuidancePipeline`](guidance::pipeline::GuidancePipeline) runs in order:
//!
//! ```text
//! user text ─▶ SafetyGate ─▶ ContextRetriever ─▶ PromptComposer ─▶ model ─▶ ResponseParser
//!                  │
//!                  └─ crisis: stop, show helpline
//! ```
//!
//! # Getting started
//!
//! ```ignore
//! use std::sync::Arc;
//! use sukoon::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), GuidanceError> {
//!     let config = GuidanceConfig::from_file("sukoon.json")?;
//!     let corpus = PassageCorpus::load("corpus.json")?;
//!     let model = ChatModel::from_config(&config)?;
//!
//!     let pipeline = GuidancePipeline::new(config, Arc::new(corpus), Arc::new(model))?;
//!
//!     match pipeline.respond("I feel anxious about exams").await {
//!         GuidanceOutcome::Guidance(response) => println!("{}", response.english_segment),
//!         other => println!("{other:?}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Where to find things
//!
//! - **Crisis short-circuit:** [`SafetyGate`](guidance::safety::SafetyGate).
//! - **Passage lookup:** the [`ContextRetriever`](guidance::retriever::ContextRetriever)
//!   trait and the file-backed [`PassageCorpus`](guidance::retriever::PassageCorpus).
//! - **Prompt text:** [`PromptComposer`](guidance::prompt::PromptComposer), built on
//!   [`PromptBuilder`](guidance::prompt::PromptBuilder).
//! - **Splitting model output:** [`ResponseParser`](guidance::parser::ResponseParser)
//!   and the shared [`Markers`](guidance::markers::Markers).
//! - **Model seam, timeout, retry:** [`api::completion`] and [`api::retry`].
//! - **Observing a request:** [`EventHandler`](guidance::events::EventHandler).

pub mod api;
pub mod guidance;
pub mod prelude;

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

// ── Constants ──────────────────────────────────────────────────────

pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model for guidance completions.
pub const DEFAULT_MODEL: &str = "meta-llama/llama-3.3-70b-instruct";

/// Environment variable holding the API key unless the config names another.
pub const DEFAULT_API_KEY_ENV: &str = "OPENROUTER_KEY";

// ── Wire types ─────────────────────────────────────────────────────

/// Chat completion request body. The pipeline sends one user turn per call.
#[derive(Serialize, Debug)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: &'static str,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

#[derive(Deserialize)]
struct CompletionBody {
    choices: Option<Vec<Choice>>,
    error: Option<ApiError>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
}

/// Text of the first choice returned by [`ChatClient::chat`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ChatCompletion {
    pub content: Option<String>,
    pub finish_reason: Option<String>,
}

/// Decode a 2xx response body. A body without choices is an empty completion.
fn decode_completion(body: &str) -> Result<ChatCompletion, String> {
    let body: CompletionBody =
        serde_json::from_str(body).map_err(|e| format!("failed to parse response: {e}"))?;

    if let Some(err) = body.error {
        return Err(format!("completion API error: {}", err.message));
    }
    if let Some(usage) = &body.usage {
        debug!(
            prompt_tokens = usage.prompt_tokens.unwrap_or(0),
            completion_tokens = usage.completion_tokens.unwrap_or(0),
            "completion usage"
        );
    }

    Ok(body
        .choices
        .into_iter()
        .flatten()
        .next()
        .map(|c| ChatCompletion {
            content: c.message.content,
            finish_reason: c.finish_reason,
        })
        .unwrap_or_default())
}

// ── Client ─────────────────────────────────────────────────────────

/// Async HTTP client for an OpenAI-compatible chat completions endpoint.
///
/// Defaults to OpenRouter; point it at any compatible URL (Groq, a local
/// server) with [`with_endpoint`](Self::with_endpoint).
pub struct ChatClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl ChatClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, String> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("sukoon/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            endpoint: OPENROUTER_URL.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// POST one request. Non-2xx statuses become `completion API HTTP {status}: {body}`.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatCompletion, String> {
        let start = Instant::now();
        let resp = self
            .http
            .post(self.endpoint.as_str())
            .bearer_auth(&self.api_key)
            .header("X-Title", "sukoon")
            .json(request)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| format!("failed to read response: {e}"))?;
        debug!(
            model = %request.model,
            %status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            bytes = body.len(),
            "completion response"
        );

        if !status.is_success() {
            return Err(format!("completion API HTTP {status}: {body}"));
        }
        decode_completion(&body)
    }
}
