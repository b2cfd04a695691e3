//! The guidance pipeline and its stages.
//!
//! - [`pipeline::GuidancePipeline`]: runs one submission end to end. Start here.
//! - [`config::GuidanceConfig`]: model, timeout, retries, markers, safety
//!   keywords, and display messages.
//! - [`safety`]: [`SafetyGate`], the crisis keyword short-circuit.
//! - [`retriever`]: [`ContextRetriever`] trait and the [`PassageCorpus`]
//!   implementation.
//! - [`prompt`]: [`PromptComposer`] and the [`PromptBuilder`] it uses.
//! - [`parser`]: [`ResponseParser`] and the [`GuidanceResponse`] it returns.
//! - [`markers`]: the [`Markers`] shared by composer and parser.
//! - [`events`]: [`EventHandler`] trait and [`GuidanceEvent`] enum for
//!   observing requests.
//! - [`error`]: [`GuidanceError`] and its [`ErrorKind`].

pub mod config;
pub mod error;
pub mod events;
pub mod markers;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod retriever;
pub mod safety;

pub use config::{GuidanceConfig, SafetyConfig};
pub use error::{ErrorKind, GuidanceError};
pub use events::{EventHandler, FnEventHandler, GuidanceEvent, LoggingHandler, NoopHandler};
pub use markers::Markers;
pub use parser::{GuidanceResponse, ParseQuality, ResponseParser, parse_response};
pub use pipeline::{GuidanceOutcome, GuidancePipeline, GuidanceRequest};
pub use prompt::{ComposedPrompt, PromptBuilder, PromptComposer};
pub use retriever::{ContextRetriever, PassageCorpus, ReferencePassage};
pub use safety::{SafetyGate, SafetyVerdict};
