//! Segment markers shared by the prompt composer and the response parser.
//!
//! The composer instructs the model to prefix each segment with its marker
//! exactly once, in order. The model is not guaranteed to comply, so the
//! parser treats the markers as a best-effort contract.

use serde::{Deserialize, Serialize};

use super::error::GuidanceError;

pub const ENGLISH_MARKER: &str = "ENG_PART:";
pub const VERSE_MARKER: &str = "VERSE_PART:";
pub const URDU_MARKER: &str = "URDU_PART:";

/// The three marker literals, in the order they must appear in model output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markers {
    pub english: String,
    pub verse: String,
    pub urdu: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            english: ENGLISH_MARKER.to_string(),
            verse: VERSE_MARKER.to_string(),
            urdu: URDU_MARKER.to_string(),
        }
    }
}

impl Markers {
    pub fn new(
        english: impl Into<String>,
        verse: impl Into<String>,
        urdu: impl Into<String>,
    ) -> Self {
        Self {
            english: english.into(),
            verse: verse.into(),
            urdu: urdu.into(),
        }
    }

    /// Markers in output order: English, verse, Urdu.
    pub fn in_order(&self) -> [&str; 3] {
        [self.english.as_str(), self.verse.as_str(), self.urdu.as_str()]
    }

    /// Reject markers the parser could not split on unambiguously.
    ///
    /// Each marker must contain a non-whitespace character, and no marker
    /// may contain another (otherwise the first occurrence of the shorter
    /// one could land inside the longer one).
    pub fn validate(&self) -> Result<(), GuidanceError> {
        let all = self.in_order();
        for marker in all {
            if marker.trim().is_empty() {
                return Err(GuidanceError::InvalidConfig(
                    "segment markers must not be blank".into(),
                ));
            }
        }
        for (i, a) in all.iter().enumerate() {
            for (j, b) in all.iter().enumerate() {
                if i != j && a.contains(*b) {
                    return Err(GuidanceError::InvalidConfig(format!(
                        "segment marker {a:?} contains marker {b:?}"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_markers_are_valid() {
        let markers = Markers::default();
        assert!(markers.validate().is_ok());
        assert_eq!(markers.in_order(), ["ENG_PART:", "VERSE_PART:", "URDU_PART:"]);
    }

    #[test]
    fn blank_marker_rejected() {
        let markers = Markers::new("ENG:", "  ", "URDU:");
        assert!(markers.validate().is_err());
    }

    #[test]
    fn nested_markers_rejected() {
        let markers = Markers::new("PART:", "VERSE_PART:", "URDU:");
        let err = markers.validate().unwrap_err();
        assert!(err.to_string().contains("contains marker"));
    }

    #[test]
    fn duplicate_markers_rejected() {
        let markers = Markers::new("X:", "X:", "Y:");
        assert!(markers.validate().is_err());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let markers: Markers = serde_json::from_str(r#"{"verse": "HADITH:"}"#).unwrap();
        assert_eq!(markers.english, ENGLISH_MARKER);
        assert_eq!(markers.verse, "HADITH:");
    }
}
