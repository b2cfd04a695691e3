//! Convenience re-exports for common `sukoon` types.
//!
//! ```ignore
//! use sukoon::prelude::*;
//! ```
//!
//! Pulls in the pipeline and its config, the retriever and model seams with
//! their bundled implementations, the outcome types, and event handlers.
//! Lower-level pieces (prompt builder, retry policy, raw chat types) are
//! left to their modules.

// ── Core types ──────────────────────────────────────────────────────
pub use crate::{ChatClient, ChatRequest, Message};

// ── Model seam ──────────────────────────────────────────────────────
pub use crate::api::{ChatModel, CompletionFuture, CompletionModel};

// ── Pipeline ────────────────────────────────────────────────────────
pub use crate::guidance::{
    ContextRetriever, ErrorKind, EventHandler, FnEventHandler, GuidanceConfig, GuidanceError,
    GuidanceEvent, GuidanceOutcome, GuidancePipeline, GuidanceResponse, LoggingHandler, Markers,
    NoopHandler, ParseQuality, PassageCorpus, ReferencePassage, ResponseParser, SafetyGate,
};
