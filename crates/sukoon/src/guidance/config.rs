//! Pipeline configuration with sensible defaults.
//!
//! [`GuidanceConfig`] is plain data: load it from a JSON file (every field
//! optional, missing fields take defaults), override fields from the
//! command line, then hand it to
//! [`GuidancePipeline::new`](super::pipeline::GuidancePipeline::new).
//!
//! ```json
//! {
//!   "model": "llama-3.3-70b-versatile",
//!   "endpoint": "https://api.groq.com/openai/v1/chat/completions",
//!   "api_key_env": "GROQ_API_KEY",
//!   "safety": {
//!     "crisis_keywords": ["suicide", "khudkushi"],
//!     "helpline_message": "Please call Umang at ..."
//!   }
//! }
//! ```
//!
//! Crisis keywords and the helpline text are configuration rather than code:
//! the right list and contact details depend on the audience and region.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::GuidanceError;
use super::markers::Markers;
use crate::api::retry::RetryConfig;
use crate::{DEFAULT_API_KEY_ENV, DEFAULT_MODEL, OPENROUTER_URL};

/// Built-in crisis keywords: English, Roman Urdu, and Urdu script.
pub const DEFAULT_CRISIS_KEYWORDS: &[&str] = &[
    "suicide",
    "suicidal",
    "kill myself",
    "end my life",
    "self-harm",
    "self harm",
    "hurt myself",
    "want to die",
    "wanna die",
    "better off dead",
    "khudkushi",
    "khud kushi",
    "marna chahta",
    "marna chahti",
    "mar jana chahta",
    "mar jana chahti",
    "خودکشی",
    "خود کشی",
    "مرنا چاہتا",
    "مرنا چاہتی",
];

pub const DEFAULT_HELPLINE_MESSAGE: &str = "You matter, and you do not have to carry this alone. \
Please reach out right now to your local emergency number or a suicide-prevention helpline, \
or to someone you trust who can stay with you.\n\
آپ اکیلے نہیں ہیں۔ براہ کرم ابھی اپنے مقامی ایمرجنسی نمبر یا کسی ہیلپ لائن سے رابطہ کریں، \
یا کسی قابل اعتماد شخص کو اپنے پاس بلائیں۔";

pub const DEFAULT_APOLOGY_MESSAGE: &str = "I'm sorry, I couldn't reflect on that right now. \
Please try again in a moment.\n\
معذرت، ابھی جواب دینا ممکن نہیں۔ براہ کرم تھوڑی دیر بعد دوبارہ کوشش کریں۔";

/// Default per-attempt model timeout.
pub const DEFAULT_TIMEOUT_SECS: f64 = 30.0;

/// Safety gate configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// Substrings (case-insensitive) that trigger the crisis short-circuit.
    pub crisis_keywords: Vec<String>,
    /// Shown verbatim when a keyword matches.
    pub helpline_message: String,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            crisis_keywords: DEFAULT_CRISIS_KEYWORDS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            helpline_message: DEFAULT_HELPLINE_MESSAGE.to_string(),
        }
    }
}

/// Configuration for a guidance pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidanceConfig {
    /// Model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,
    /// Chat completions URL. Default: OpenRouter.
    pub endpoint: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Maximum tokens per completion. Default: `1024`.
    pub max_tokens: u32,
    /// Sampling temperature. Default: `0.5`.
    pub temperature: f32,
    /// Per-attempt model timeout in seconds. Default: `30`.
    pub timeout_secs: f64,
    /// Retries for transient model failures. Default: `0`.
    pub max_retries: u32,
    pub markers: Markers,
    pub safety: SafetyConfig,
    /// Generic message shown when the model call fails or times out.
    pub apology_message: String,
    /// Prebuilt passage corpus loaded at start-up.
    pub corpus_path: Option<PathBuf>,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: OPENROUTER_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            max_tokens: 1024,
            temperature: 0.5,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: 0,
            markers: Markers::default(),
            safety: SafetyConfig::default(),
            apology_message: DEFAULT_APOLOGY_MESSAGE.to_string(),
            corpus_path: None,
        }
    }
}

impl GuidanceConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Load a config from a JSON file. Missing fields take defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GuidanceError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GuidanceError::InvalidConfig(format!(
                "failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_json(&content).map_err(|e| match e {
            GuidanceError::InvalidConfig(detail) => {
                GuidanceError::InvalidConfig(format!("{}: {detail}", path.display()))
            }
            other => other,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, GuidanceError> {
        serde_json::from_str(json)
            .map_err(|e| GuidanceError::InvalidConfig(format!("failed to parse config: {e}")))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs_f64();
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    pub fn with_crisis_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.safety.crisis_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_helpline_message(mut self, message: impl Into<String>) -> Self {
        self.safety.helpline_message = message.into();
        self
    }

    pub fn with_corpus_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.corpus_path = Some(path.into());
        self
    }

    /// Per-attempt timeout. Falls back to [`DEFAULT_TIMEOUT_SECS`] when
    /// `timeout_secs` is out of range, which [`validate`](Self::validate)
    /// rejects.
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_secs)
            .unwrap_or(Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS))
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::with_retries(self.max_retries)
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String, GuidanceError> {
        std::env::var(&self.api_key_env).map_err(|_| {
            GuidanceError::InvalidConfig(format!(
                "{} environment variable is not set",
                self.api_key_env
            ))
        })
    }

    /// Check the settings the pipeline relies on.
    pub fn validate(&self) -> Result<(), GuidanceError> {
        self.markers.validate()?;
        match Duration::try_from_secs_f64(self.timeout_secs) {
            Ok(timeout) if !timeout.is_zero() => {}
            _ => {
                return Err(GuidanceError::InvalidConfig(format!(
                    "timeout_secs must be a positive number of seconds, got {}",
                    self.timeout_secs
                )));
            }
        }
        if !self
            .safety
            .crisis_keywords
            .iter()
            .any(|k| !k.trim().is_empty())
        {
            return Err(GuidanceError::InvalidConfig(
                "at least one crisis keyword is required".into(),
            ));
        }
        if self.safety.helpline_message.trim().is_empty() {
            return Err(GuidanceError::InvalidConfig(
                "helpline_message must not be empty".into(),
            ));
        }
        if self.apology_message.trim().is_empty() {
            return Err(GuidanceError::InvalidConfig(
                "apology_message must not be empty".into(),
            ));
        }
        Ok(())
    }
}
