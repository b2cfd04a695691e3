//! The request orchestrator.
//!
//! [`GuidancePipeline`] runs one submission through the stages in order:
//!
//! 1. Empty check. Whitespace-only input is a no-op.
//! 2. [`SafetyGate`]. A crisis keyword stops the request before any
//!    retrieval or model call.
//! 3. [`ContextRetriever`]. Exactly one reference passage.
//! 4. [`PromptComposer`]. A fresh instruction naming the markers.
//! 5. [`CompletionModel`]. Each attempt is bounded by the configured timeout;
//!    transient failures are retried per [`RetryConfig`](crate::api::RetryConfig).
//! 6. [`ResponseParser`]. Always yields a displayable response.
//!
//! The pipeline holds no per-request or presentation state and is shared
//! behind an `Arc`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::config::GuidanceConfig;
use super::error::GuidanceError;
use super::events::{EventHandler, GuidanceEvent, LoggingHandler, generate_request_id};
use super::parser::{GuidanceResponse, ResponseParser};
use super::prompt::PromptComposer;
use super::retriever::{ContextRetriever, PassageCorpus};
use super::safety::{SafetyGate, SafetyVerdict};
use crate::api::completion::{ChatModel, CompletionModel};

/// One user submission. Only constructed for non-blank text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuidanceRequest {
    raw_text: String,
}

impl GuidanceRequest {
    /// `None` for empty or whitespace-only input.
    pub fn new(raw_text: impl Into<String>) -> Option<Self> {
        let raw_text = raw_text.into();
        if raw_text.trim().is_empty() {
            None
        } else {
            Some(Self { raw_text })
        }
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }
}

/// What presentation code receives for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GuidanceOutcome {
    /// Empty input: nothing to show, no state change.
    NoSubmission,
    /// A crisis keyword matched. `helpline` is the configured message.
    Crisis { helpline: String },
    Guidance(GuidanceResponse),
    /// The model call failed or timed out.
    Apology { message: String },
}

impl GuidanceOutcome {
    pub fn is_displayable(&self) -> bool {
        !matches!(self, Self::NoSubmission)
    }
}

pub struct GuidancePipeline {
    config: GuidanceConfig,
    gate: SafetyGate,
    retriever: Arc<dyn ContextRetriever>,
    composer: PromptComposer,
    model: Arc<dyn CompletionModel>,
    parser: ResponseParser,
    handler: Arc<dyn EventHandler>,
}

impl GuidancePipeline {
    /// Validate `config` and assemble a pipeline around an already-built
    /// retriever and model. Events go to [`LoggingHandler`] unless replaced.
    pub fn new(
        config: GuidanceConfig,
        retriever: Arc<dyn ContextRetriever>,
        model: Arc<dyn CompletionModel>,
    ) -> Result<Self, GuidanceError> {
        config.validate()?;
        Ok(Self {
            gate: SafetyGate::from_config(&config.safety),
            composer: PromptComposer::new(config.markers.clone()),
            parser: ResponseParser::new(config.markers.clone()),
            retriever,
            model,
            handler: Arc::new(LoggingHandler),
            config,
        })
    }

    /// Build the bundled stack from config: the [`PassageCorpus`] at
    /// `corpus_path` and a [`ChatModel`] for the configured endpoint.
    pub fn from_config(config: GuidanceConfig) -> Result<Self, GuidanceError> {
        let corpus_path = config.corpus_path.as_deref().ok_or_else(|| {
            GuidanceError::RetrievalUnavailable("no corpus_path configured".into())
        })?;
        let corpus = PassageCorpus::load(corpus_path)?;
        let model = ChatModel::from_config(&config)?;
        Self::new(config, Arc::new(corpus), Arc::new(model))
    }

    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.handler = handler;
        self
    }

    pub fn config(&self) -> &GuidanceConfig {
        &self.config
    }

    pub fn helpline_message(&self) -> &str {
        self.gate.helpline_message()
    }

    pub fn apology_message(&self) -> &str {
        &self.config.apology_message
    }

    /// Run one submission and map every outcome to something displayable.
    /// Error details are logged, never returned.
    pub async fn respond(&self, raw_text: &str) -> GuidanceOutcome {
        match self.try_respond(raw_text).await {
            Ok(response) => GuidanceOutcome::Guidance(response),
            Err(GuidanceError::EmptyInput) => GuidanceOutcome::NoSubmission,
            Err(GuidanceError::CrisisDetected) => GuidanceOutcome::Crisis {
                helpline: self.helpline_message().to_string(),
            },
            Err(e) => {
                warn!(kind = %e.kind(), "request ended with apology: {e}");
                GuidanceOutcome::Apology {
                    message: self.config.apology_message.clone(),
                }
            }
        }
    }

    /// Run one submission, returning the typed error on failure.
    pub async fn try_respond(&self, raw_text: &str) -> Result<GuidanceResponse, GuidanceError> {
        let request = GuidanceRequest::new(raw_text).ok_or(GuidanceError::EmptyInput)?;
        let raw_text = request.raw_text();
        let request_id = generate_request_id();
        let request_id = request_id.as_str();

        self.handler.on_event(&GuidanceEvent::Submitted {
            request_id,
            chars: raw_text.chars().count(),
        });

        if let SafetyVerdict::Crisis { keyword } = self.gate.evaluate(raw_text) {
            self.handler.on_event(&GuidanceEvent::CrisisDetected {
                request_id,
                keyword,
            });
            return Err(GuidanceError::CrisisDetected);
        }

        let passage = self.retriever.retrieve(raw_text);
        self.handler.on_event(&GuidanceEvent::PassageRetrieved {
            request_id,
            passage: &passage,
        });

        let prompt = self.composer.compose(raw_text, &passage);
        self.handler.on_event(&GuidanceEvent::PromptComposed {
            request_id,
            chars: prompt.len(),
        });

        let raw_output = self.call_model(request_id, prompt.as_str()).await?;
        let response = self.parser.parse(&raw_output);

        if response.is_degraded() {
            self.handler.on_event(&GuidanceEvent::ParseDegraded {
                request_id,
                quality: response.quality,
            });
        }
        self.handler.on_event(&GuidanceEvent::Completed {
            request_id,
            quality: response.quality,
        });
        Ok(response)
    }

    /// Call the model with a per-attempt timeout and retry on transient errors.
    async fn call_model(&self, request_id: &str, prompt: &str) -> Result<String, GuidanceError> {
        let retry = self.config.retry_config();
        let timeout = self.config.timeout();
        let max_attempts = retry.max_attempts();

        let mut attempt = 0;
        loop {
            attempt += 1;
            self.handler.on_event(&GuidanceEvent::ModelAttempt {
                request_id,
                attempt,
                max_attempts,
            });

            let err = match tokio::time::timeout(timeout, self.model.complete(prompt)).await {
                Ok(Ok(output)) if !output.trim().is_empty() => return Ok(output),
                Ok(Ok(_)) => GuidanceError::ModelCallFailed(format!(
                    "{} returned an empty completion",
                    self.model.name()
                )),
                Ok(Err(detail)) => GuidanceError::ModelCallFailed(detail),
                Err(_) => GuidanceError::ModelTimeout(timeout),
            };

            let will_retry = attempt < max_attempts && err.is_retryable();
            self.handler.on_event(&GuidanceEvent::ModelFailed {
                request_id,
                kind: err.kind(),
                detail: &err.to_string(),
                will_retry,
            });
            if !will_retry {
                return Err(err);
            }
            tokio::time::sleep(retry.delay_for_attempt(attempt - 1)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::completion::CompletionFuture;
    use crate::guidance::retriever::ReferencePassage;

    struct FixedRetriever;

    impl ContextRetriever for FixedRetriever {
        fn retrieve(&self, _raw_text: &str) -> ReferencePassage {
            ReferencePassage::new("Patience is the key to relief.")
        }
    }

    struct FixedModel(&'static str);

    impl CompletionModel for FixedModel {
        fn complete<'a>(&'a self, _prompt: &'a str) -> CompletionFuture<'a> {
            let output = self.0.to_string();
            Box::pin(async move { Ok(output) })
        }
    }

    fn pipeline(output: &'static str) -> GuidancePipeline {
        GuidancePipeline::new(
            GuidanceConfig::default(),
            Arc::new(FixedRetriever),
            Arc::new(FixedModel(output)),
        )
        .unwrap()
    }

    #[test]
    fn request_rejects_blank_text() {
        assert!(GuidanceRequest::new("   \n").is_none());
        assert_eq!(
            GuidanceRequest::new(" hi ").unwrap().raw_text(),
            " hi "
        );
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = GuidanceConfig {
            apology_message: String::new(),
            ..Default::default()
        };
        let result = GuidancePipeline::new(
            config,
            Arc::new(FixedRetriever),
            Arc::new(FixedModel("x")),
        );
        assert!(matches!(result, Err(GuidanceError::InvalidConfig(_))));
    }

    #[test]
    fn from_config_without_corpus_is_unavailable() {
        let result = GuidancePipeline::from_config(GuidanceConfig::default());
        assert!(matches!(result, Err(GuidanceError::RetrievalUnavailable(_))));
    }

    #[tokio::test]
    async fn empty_model_output_is_an_apology() {
        let outcome = pipeline("   ").respond("hello").await;
        assert_eq!(
            outcome,
            GuidanceOutcome::Apology {
                message: crate::guidance::config::DEFAULT_APOLOGY_MESSAGE.to_string()
            }
        );
    }

    #[tokio::test]
    async fn empty_model_output_is_model_call_failed() {
        let err = pipeline("").try_respond("hello").await.unwrap_err();
        assert!(matches!(err, GuidanceError::ModelCallFailed(_)));
    }

    #[test]
    fn new_rejects_timeout_beyond_duration_range() {
        let config = GuidanceConfig::from_json(r#"{"timeout_secs": 1e20}"#).unwrap();
        let result = GuidancePipeline::new(
            config,
            Arc::new(FixedRetriever),
            Arc::new(FixedModel("x")),
        );
        assert!(matches!(result, Err(GuidanceError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn crisis_event_names_the_gate_keyword() {
        use crate::guidance::events::FnEventHandler;
        use std::sync::Mutex;

        let keywords = Arc::new(Mutex::new(Vec::new()));
        let sink = keywords.clone();
        let pipeline = pipeline("unused").with_event_handler(Arc::new(FnEventHandler::new(
            move |event: &GuidanceEvent<'_>| {
                if let GuidanceEvent::CrisisDetected { keyword, .. } = event {
                    sink.lock().unwrap().push(keyword.to_string());
                }
            },
        )));

        let err = pipeline.try_respond("Main KHUDKUSHI ka soch raha hoon").await.unwrap_err();
        assert!(matches!(err, GuidanceError::CrisisDetected));
        assert_eq!(*keywords.lock().unwrap(), vec!["khudkushi".to_string()]);
    }

    #[tokio::test]
    async fn outcome_serializes_with_kind_tag() {
        let outcome = pipeline("ENG_PART: a VERSE_PART: b URDU_PART: c")
            .respond("hello")
            .await;
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["kind"], "guidance");
        assert_eq!(json["english_segment"], "a");
        assert_eq!(json["quality"], "complete");

        let crisis = serde_json::to_value(GuidanceOutcome::Crisis {
            helpline: "h".into(),
        })
        .unwrap();
        assert_eq!(crisis["kind"], "crisis");
        assert_eq!(crisis["helpline"], "h");
        assert!(!GuidanceOutcome::NoSubmission.is_displayable());
    }
}
