//! Events emitted by the [`GuidancePipeline`](super::pipeline::GuidancePipeline).
//!
//! Every event carries the request id so the lines for one submission can
//! be grouped in logs.
//!
//! | Handler | Use case |
//! |---------|----------|
//! | [`LoggingHandler`] | Structured logging via `tracing` (default) |
//! | [`NoopHandler`] | Tests or silent runs |
//! | [`FnEventHandler`] | Quick closures |

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use tracing::{debug, info, warn};

use super::error::ErrorKind;
use super::parser::ParseQuality;
use super::retriever::ReferencePassage;

/// Generate a unique id for one submission.
pub fn generate_request_id() -> String {
    let ts = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("rq-{ts:x}-{count:04x}")
}

#[derive(Debug)]
pub enum GuidanceEvent<'a> {
    /// Non-empty text accepted for processing.
    Submitted { request_id: &'a str, chars: usize },
    /// The safety gate tripped; nothing else runs for this request.
    CrisisDetected { request_id: &'a str, keyword: &'a str },
    PassageRetrieved {
        request_id: &'a str,
        passage: &'a ReferencePassage,
    },
    PromptComposed { request_id: &'a str, chars: usize },
    /// A model call is about to start (1-indexed attempt).
    ModelAttempt {
        request_id: &'a str,
        attempt: u32,
        max_attempts: u32,
    },
    /// A model attempt failed. `detail` is internal and never displayed.
    ModelFailed {
        request_id: &'a str,
        kind: ErrorKind,
        detail: &'a str,
        will_retry: bool,
    },
    /// The model output did not fully match the marker contract.
    ParseDegraded {
        request_id: &'a str,
        quality: ParseQuality,
    },
    Completed {
        request_id: &'a str,
        quality: ParseQuality,
    },
}

/// Observer for pipeline events.
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: &GuidanceEvent<'_>);
}

/// Does nothing.
pub struct NoopHandler;

impl EventHandler for NoopHandler {
    fn on_event(&self, _event: &GuidanceEvent<'_>) {}
}

/// Logs events through `tracing`.
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn on_event(&self, event: &GuidanceEvent<'_>) {
        match event {
            GuidanceEvent::Submitted { request_id, chars } => {
                info!(request_id, chars, "guidance request received");
            }
            GuidanceEvent::CrisisDetected {
                request_id,
                keyword,
            } => {
                warn!(request_id, keyword, "crisis keyword matched, showing helpline");
            }
            GuidanceEvent::PassageRetrieved {
                request_id,
                passage,
            } => {
                debug!(
                    request_id,
                    source = passage.source.as_deref().unwrap_or("-"),
                    chars = passage.text.len(),
                    "reference passage retrieved"
                );
            }
            GuidanceEvent::PromptComposed { request_id, chars } => {
                debug!(request_id, chars, "prompt composed");
            }
            GuidanceEvent::ModelAttempt {
                request_id,
                attempt,
                max_attempts,
            } => {
                debug!(request_id, "model call attempt {attempt}/{max_attempts}");
            }
            GuidanceEvent::ModelFailed {
                request_id,
                kind,
                detail,
                will_retry,
            } => {
                warn!(request_id, %kind, will_retry, "model call failed: {detail}");
            }
            GuidanceEvent::ParseDegraded {
                request_id,
                quality,
            } => {
                warn!(request_id, ?quality, "PARSE_DEGRADED: model output did not follow markers");
            }
            GuidanceEvent::Completed {
                request_id,
                quality,
            } => {
                info!(request_id, ?quality, "guidance response ready");
            }
        }
    }
}

/// Wraps a closure as an [`EventHandler`].
pub struct FnEventHandler<F>(F);

impl<F> FnEventHandler<F>
where
    F: Fn(&GuidanceEvent<'_>) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> EventHandler for FnEventHandler<F>
where
    F: Fn(&GuidanceEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &GuidanceEvent<'_>) {
        (self.0)(event)
    }
}
