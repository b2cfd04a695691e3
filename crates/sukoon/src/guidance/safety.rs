//! Crisis keyword gate.
//!
//! Runs before retrieval and before any model call. A match stops the
//! request and the caller shows the configured helpline message. This is a
//! hard stop filter that tolerates false positives, not a risk assessment.

use serde::Serialize;
use tracing::debug;

use super::config::SafetyConfig;

/// Result of [`SafetyGate::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum SafetyVerdict<'a> {
    Safe,
    /// `keyword` is the configured keyword that matched, lower-cased.
    Crisis { keyword: &'a str },
}

impl SafetyVerdict<'_> {
    pub fn is_crisis(&self) -> bool {
        matches!(self, Self::Crisis { .. })
    }
}

/// Case-insensitive substring matcher over a fixed keyword list.
#[derive(Debug, Clone)]
pub struct SafetyGate {
    /// Lower-cased, non-blank keywords.
    keywords: Vec<String>,
    helpline_message: String,
}

impl SafetyGate {
    pub fn new<I, S>(keywords: I, helpline_message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self {
            keywords,
            helpline_message: helpline_message.into(),
        }
    }

    pub fn from_config(config: &SafetyConfig) -> Self {
        Self::new(&config.crisis_keywords, config.helpline_message.clone())
    }

    /// The gate decision for one submission. The pipeline stops on
    /// [`SafetyVerdict::Crisis`].
    pub fn evaluate(&self, raw_text: &str) -> SafetyVerdict<'_> {
        match self.matched_keyword(raw_text) {
            Some(keyword) => {
                debug!(keyword, "crisis keyword matched");
                SafetyVerdict::Crisis { keyword }
            }
            None => SafetyVerdict::Safe,
        }
    }

    /// First configured keyword found in `raw_text`, if any.
    pub fn matched_keyword(&self, raw_text: &str) -> Option<&str> {
        let lowered = raw_text.to_lowercase();
        self.keywords
            .iter()
            .find(|k| lowered.contains(k.as_str()))
            .map(String::as_str)
    }

    /// The static message to show when the gate trips.
    pub fn helpline_message(&self) -> &str {
        &self.helpline_message
    }

    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_gate() -> SafetyGate {
        SafetyGate::from_config(&SafetyConfig::default())
    }

    #[test]
    fn ordinary_worries_are_safe() {
        let gate = default_gate();
        assert_eq!(gate.evaluate("I feel anxious about exams"), SafetyVerdict::Safe);
        assert_eq!(gate.evaluate("میں پریشان ہوں"), SafetyVerdict::Safe);
    }

    #[test]
    fn english_keyword_any_case_is_crisis() {
        let gate = default_gate();
        assert_eq!(
            gate.evaluate("I want to die"),
            SafetyVerdict::Crisis { keyword: "want to die" }
        );
        assert!(gate.evaluate("I WANT TO DIE").is_crisis());
        assert_eq!(
            gate.evaluate("thinking about Suicide lately"),
            SafetyVerdict::Crisis { keyword: "suicide" }
        );
    }

    #[test]
    fn roman_urdu_and_urdu_keywords_are_crisis() {
        let gate = default_gate();
        assert!(gate.evaluate("main khudkushi karna chahta hoon").is_crisis());
        assert!(gate.evaluate("میں خودکشی کے بارے میں سوچ رہا ہوں").is_crisis());
    }

    #[test]
    fn match_is_substring_based() {
        let gate = SafetyGate::new(["harm"], "help");
        assert_eq!(gate.matched_keyword("self-harming thoughts"), Some("harm"));
    }

    #[test]
    fn keywords_are_normalized() {
        let gate = SafetyGate::new(["  Hopeless ", "", "   "], "help");
        assert_eq!(gate.keyword_count(), 1);
        assert_eq!(
            gate.evaluate("I feel so HOPELESS"),
            SafetyVerdict::Crisis { keyword: "hopeless" }
        );
    }

    #[test]
    fn verdict_serializes_with_keyword() {
        let gate = SafetyGate::new(["hopeless"], "help");
        let json = serde_json::to_value(gate.evaluate("so hopeless")).unwrap();
        assert_eq!(json["verdict"], "crisis");
        assert_eq!(json["keyword"], "hopeless");
        let json = serde_json::to_value(gate.evaluate("fine")).unwrap();
        assert_eq!(json["verdict"], "safe");
    }

    #[test]
    fn helpline_message_is_verbatim() {
        let gate = SafetyGate::new(["x"], "Call 1122");
        assert_eq!(gate.helpline_message(), "Call 1122");
    }
}
