//! The completion seam.
//!
//! The pipeline only needs "prompt in, text out". [`CompletionModel`] is that
//! seam; [`ChatModel`] implements it over [`ChatClient`] by sending the
//! composed prompt as a single user message. Timeouts and retries are applied
//! by the caller, not here.

use std::future::Future;
use std::pin::Pin;

use tracing::debug;

use crate::guidance::config::GuidanceConfig;
use crate::guidance::error::GuidanceError;
use crate::{ChatClient, ChatRequest, Message};

/// Boxed future returned by [`CompletionModel::complete`].
///
/// `Err` carries a transport or API detail string suitable for
/// [`is_transient_error`](super::retry::is_transient_error).
pub type CompletionFuture<'a> = Pin<Box<dyn Future<Output = Result<String, String>> + Send + 'a>>;

/// A text-generation backend.
pub trait CompletionModel: Send + Sync {
    /// Generate raw output for one instruction.
    fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a>;

    /// Identifier used in logs.
    fn name(&self) -> &str {
        "completion-model"
    }
}

/// [`CompletionModel`] over an OpenAI-compatible chat completions API.
pub struct ChatModel {
    client: ChatClient,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl ChatModel {
    pub fn new(client: ChatClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            max_tokens: 1024,
            temperature: 0.5,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Build a model from config. Reads the API key from the environment.
    pub fn from_config(config: &GuidanceConfig) -> Result<Self, GuidanceError> {
        let api_key = config.api_key()?;
        let client = ChatClient::new(api_key)
            .map_err(GuidanceError::InvalidConfig)?
            .with_endpoint(config.endpoint.clone());
        Ok(Self::new(client, config.model.clone())
            .with_max_tokens(config.max_tokens)
            .with_temperature(config.temperature))
    }

    fn request(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![Message::user(prompt)],
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
        }
    }
}

impl CompletionModel for ChatModel {
    fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a> {
        Box::pin(async move {
            let completion = self.client.chat(&self.request(prompt)).await?;
            if let Some(reason) = completion.finish_reason.as_deref() {
                debug!(model = %self.model, finish_reason = reason, "completion finished");
            }
            Ok(completion.content.unwrap_or_default())
        })
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl CompletionModel for Echo {
        fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a> {
            Box::pin(async move { Ok(prompt.to_uppercase()) })
        }
    }

    #[tokio::test]
    async fn trait_objects_can_complete() {
        let model: Box<dyn CompletionModel> = Box::new(Echo);
        assert_eq!(model.complete("salaam").await.unwrap(), "SALAAM");
        assert_eq!(model.name(), "completion-model");
    }

    #[test]
    fn request_wraps_prompt_as_single_user_message() {
        let client = ChatClient::new("key").unwrap();
        let model = ChatModel::new(client, "test-model")
            .with_max_tokens(256)
            .with_temperature(0.2);
        let req = model.request("composed prompt");
        assert_eq!(req.model, "test-model");
        assert_eq!(req.messages.len(), 1);
        assert_eq!(req.messages[0].content, "composed prompt");
        assert_eq!(req.max_tokens, Some(256));
        assert_eq!(req.temperature, Some(0.2));
        assert_eq!(model.name(), "test-model");
    }

    #[test]
    fn from_config_requires_api_key() {
        let config = GuidanceConfig {
            api_key_env: "SUKOON_COMPLETION_TEST_KEY_UNSET".into(),
            ..Default::default()
        };
        let err = ChatModel::from_config(&config).err().unwrap();
        assert!(matches!(err, GuidanceError::InvalidConfig(_)));
    }
}
