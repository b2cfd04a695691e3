//! Model-call layer: the completion seam and retry policy.
//!
//! - [`completion`]: the [`CompletionModel`] trait the pipeline calls, and
//!   [`ChatModel`], its implementation over [`ChatClient`](crate::ChatClient).
//! - [`retry`]: transient error detection (429, 5xx, network timeouts) with
//!   exponential backoff and jitter. Never retries 400/401 errors.

pub mod completion;
pub mod retry;

pub use completion::{ChatModel, CompletionFuture, CompletionModel};
pub use retry::RetryConfig;
