//! Error kinds for the guidance pipeline.
//!
//! Only [`GuidanceError::EmptyInput`] and [`GuidanceError::CrisisDetected`]
//! are decided before any external call. Model failures are recovered by the
//! pipeline into a generic apology; the detail strings carried here are for
//! logs only and never reach the person using the widget.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::api::retry::is_transient_error;

/// Stable, display-free classification of pipeline failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    EmptyInput,
    CrisisDetected,
    RetrievalUnavailable,
    ModelCallFailed,
    ModelTimeout,
    /// Not a failure: the parser fell back or produced empty segments.
    ParseDegraded,
    InvalidConfig,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmptyInput => "EMPTY_INPUT",
            Self::CrisisDetected => "CRISIS_DETECTED",
            Self::RetrievalUnavailable => "RETRIEVAL_UNAVAILABLE",
            Self::ModelCallFailed => "MODEL_CALL_FAILED",
            Self::ModelTimeout => "MODEL_TIMEOUT",
            Self::ParseDegraded => "PARSE_DEGRADED",
            Self::InvalidConfig => "INVALID_CONFIG",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum GuidanceError {
    #[error("no text submitted")]
    EmptyInput,
    #[error("crisis keyword detected")]
    CrisisDetected,
    #[error("retrieval unavailable: {0}")]
    RetrievalUnavailable(String),
    #[error("model call failed: {0}")]
    ModelCallFailed(String),
    #[error("model call timed out after {:.1}s", .0.as_secs_f64())]
    ModelTimeout(Duration),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GuidanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyInput => ErrorKind::EmptyInput,
            Self::CrisisDetected => ErrorKind::CrisisDetected,
            Self::RetrievalUnavailable(_) => ErrorKind::RetrievalUnavailable,
            Self::ModelCallFailed(_) => ErrorKind::ModelCallFailed,
            Self::ModelTimeout(_) => ErrorKind::ModelTimeout,
            Self::InvalidConfig(_) => ErrorKind::InvalidConfig,
        }
    }

    /// Whether another model attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ModelTimeout(_) => true,
            Self::ModelCallFailed(detail) => is_transient_error(detail),
            _ => false,
        }
    }
}
