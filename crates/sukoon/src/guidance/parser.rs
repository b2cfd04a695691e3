//! Splitting model output into display segments.
//!
//! The model is asked to tag its reply with three markers in a fixed order.
//! It does not always comply, so [`ResponseParser::parse`] is total: any
//! input yields a [`GuidanceResponse`] that display code can render without
//! special-casing failure.
//!
//! Rules, first match wins:
//!
//! 1. The first occurrence of each marker appears in order without
//!    overlapping: each segment is the text between its marker and the next
//!    one (or the end), trimmed. Text before the first marker is dropped.
//!    Empty segments are kept and flagged [`ParseQuality::EmptySegments`].
//! 2. Anything else (missing markers, wrong order, empty input): the whole
//!    trimmed text becomes the English segment, flagged
//!    [`ParseQuality::Unsegmented`].

use serde::{Deserialize, Serialize};

use super::markers::Markers;

/// How cleanly the model output matched the marker contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseQuality {
    /// All three segments present and non-empty.
    Complete,
    /// Markers found in order but at least one segment is empty.
    EmptySegments,
    /// Markers missing or out of order; the raw text is shown whole.
    Unsegmented,
}

/// Parsed, displayable result of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidanceResponse {
    pub english_segment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verse_segment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urdu_segment: Option<String>,
    pub quality: ParseQuality,
}

impl GuidanceResponse {
    /// A fully segmented response. Segments are trimmed.
    pub fn segmented(english: &str, verse: &str, urdu: &str) -> Self {
        let (english, verse, urdu) = (english.trim(), verse.trim(), urdu.trim());
        let quality = if english.is_empty() || verse.is_empty() || urdu.is_empty() {
            ParseQuality::EmptySegments
        } else {
            ParseQuality::Complete
        };
        Self {
            english_segment: english.to_string(),
            verse_segment: Some(verse.to_string()),
            urdu_segment: Some(urdu.to_string()),
            quality,
        }
    }

    /// Whole-text fallback display.
    pub fn unsegmented(raw_output: &str) -> Self {
        Self {
            english_segment: raw_output.trim().to_string(),
            verse_segment: None,
            urdu_segment: None,
            quality: ParseQuality::Unsegmented,
        }
    }

    pub fn is_segmented(&self) -> bool {
        self.quality != ParseQuality::Unsegmented
    }

    pub fn is_degraded(&self) -> bool {
        self.quality != ParseQuality::Complete
    }

    /// Rebuild a marker-tagged string that parses back to the same segments.
    pub fn to_tagged(&self, markers: &Markers) -> String {
        match (&self.verse_segment, &self.urdu_segment) {
            (Some(verse), Some(urdu)) if self.is_segmented() => format!(
                "{} {}\n{} {verse}\n{} {urdu}",
                markers.english, self.english_segment, markers.verse, markers.urdu,
            ),
            _ => self.english_segment.clone(),
        }
    }
}

/// Marker-based splitter for raw model output.
#[derive(Debug, Clone, Default)]
pub struct ResponseParser {
    markers: Markers,
}

impl ResponseParser {
    pub fn new(markers: Markers) -> Self {
        Self { markers }
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    /// Never panics; always returns a displayable response.
    pub fn parse(&self, raw_output: &str) -> GuidanceResponse {
        parse_response(raw_output, &self.markers)
    }
}

/// Parse `raw_output` against `markers`. See the module docs for the rules.
pub fn parse_response(raw_output: &str, markers: &Markers) -> GuidanceResponse {
    match split_segments(raw_output, markers) {
        Some((english, verse, urdu)) => GuidanceResponse::segmented(english, verse, urdu),
        None => GuidanceResponse::unsegmented(raw_output),
    }
}

/// Split on the first occurrence of each marker, if they are in order.
fn split_segments<'a>(raw: &'a str, markers: &Markers) -> Option<(&'a str, &'a str, &'a str)> {
    let [english, verse, urdu] = markers.in_order();

    let english_at = raw.find(english)?;
    let verse_at = raw.find(verse)?;
    let urdu_at = raw.find(urdu)?;
    if english_at + english.len() > verse_at || verse_at + verse.len() > urdu_at {
        return None;
    }

    // With the order checked, each split below lands on the same first
    // occurrence found above.
    let (_, rest) = raw.split_once(english)?;
    let (english_text, rest) = rest.split_once(verse)?;
    let (verse_text, urdu_text) = rest.split_once(urdu)?;
    Some((english_text, verse_text, urdu_text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ResponseParser {
        ResponseParser::default()
    }

    #[test]
    fn all_markers_in_order_split_cleanly() {
        let response = parser().parse(
            "ENG_PART: Stay strong. VERSE_PART: Patience is the key to relief. URDU_PART: صبر کلید ہے۔",
        );
        assert_eq!(response.english_segment, "Stay strong.");
        assert_eq!(
            response.verse_segment.as_deref(),
            Some("Patience is the key to relief.")
        );
        assert_eq!(response.urdu_segment.as_deref(), Some("صبر کلید ہے۔"));
        assert_eq!(response.quality, ParseQuality::Complete);
    }

    #[test]
    fn multiline_segments_are_trimmed() {
        let response =
            parser().parse("\n\nENG_PART:\n  Be gentle.\n\nVERSE_PART:\n Ease follows.\nURDU_PART:\nآسانی\n");
        assert_eq!(response.english_segment, "Be gentle.");
        assert_eq!(response.verse_segment.as_deref(), Some("Ease follows."));
        assert_eq!(response.urdu_segment.as_deref(), Some("آسانی"));
    }

    #[test]
    fn preamble_before_first_marker_is_dropped() {
        let response = parser().parse("Sure! Here you go.\nENG_PART: a VERSE_PART: b URDU_PART: c");
        assert_eq!(response.english_segment, "a");
        assert!(!response.is_degraded());
    }

    #[test]
    fn no_markers_falls_back_to_whole_text() {
        let response = parser().parse("  Take a deep breath. Things will get better.  ");
        assert_eq!(response.english_segment, "Take a deep breath. Things will get better.");
        assert!(response.verse_segment.is_none());
        assert!(response.urdu_segment.is_none());
        assert_eq!(response.quality, ParseQuality::Unsegmented);
    }

    #[test]
    fn missing_marker_falls_back() {
        let raw = "ENG_PART: hello VERSE_PART: verse only";
        let response = parser().parse(raw);
        assert_eq!(response.english_segment, raw);
        assert!(!response.is_segmented());
    }

    #[test]
    fn out_of_order_markers_fall_back() {
        let raw = "VERSE_PART: v ENG_PART: e URDU_PART: u";
        let response = parser().parse(raw);
        assert_eq!(response.english_segment, raw);
        assert_eq!(response.quality, ParseQuality::Unsegmented);
    }

    #[test]
    fn adjacent_markers_give_empty_segments() {
        let response = parser().parse("ENG_PART:VERSE_PART: v URDU_PART:");
        assert_eq!(response.english_segment, "");
        assert_eq!(response.verse_segment.as_deref(), Some("v"));
        assert_eq!(response.urdu_segment.as_deref(), Some(""));
        assert_eq!(response.quality, ParseQuality::EmptySegments);
        assert!(response.is_segmented());
        assert!(response.is_degraded());
    }

    #[test]
    fn only_first_occurrence_of_each_marker_counts() {
        let response = parser().parse(
            "ENG_PART: one ENG_PART: two VERSE_PART: v URDU_PART: u1 VERSE_PART: late URDU_PART: u2",
        );
        assert_eq!(response.english_segment, "one ENG_PART: two");
        assert_eq!(response.verse_segment.as_deref(), Some("v"));
        assert_eq!(
            response.urdu_segment.as_deref(),
            Some("u1 VERSE_PART: late URDU_PART: u2")
        );
    }

    #[test]
    fn early_stray_marker_forces_fallback() {
        // The first URDU_PART: precedes ENG_PART:, so the order check fails.
        let raw = "URDU_PART: ENG_PART: e VERSE_PART: v URDU_PART: u";
        assert_eq!(parser().parse(raw).quality, ParseQuality::Unsegmented);
    }

    #[test]
    fn empty_output_is_empty_unsegmented() {
        let response = parser().parse("");
        assert_eq!(response.english_segment, "");
        assert_eq!(response.quality, ParseQuality::Unsegmented);
    }

    #[test]
    fn custom_markers_are_honored() {
        let markers = Markers::new("English:", "Hadith_Urdu:", "Explanation_Urdu:");
        let response = parse_response(
            "English: Be calm. Hadith_Urdu: صبر Explanation_Urdu: وضاحت",
            &markers,
        );
        assert_eq!(response.english_segment, "Be calm.");
        assert_eq!(response.verse_segment.as_deref(), Some("صبر"));
        assert_eq!(response.urdu_segment.as_deref(), Some("وضاحت"));
    }

    #[test]
    fn round_trip_known_segments() {
        let markers = Markers::default();
        let segments = [
            ("Stay strong.", "Patience is the key to relief.", "صبر کلید ہے۔"),
            ("Multi\nline", "With hardship comes ease.", "آسانی"),
        ];
        for (english, verse, urdu) in segments {
            let raw = format!(
                "{} {english}\n{} {verse}\n{} {urdu}",
                markers.english, markers.verse, markers.urdu
            );
            let response = parse_response(&raw, &markers);
            assert_eq!(response.english_segment, english);
            assert_eq!(response.verse_segment.as_deref(), Some(verse));
            assert_eq!(response.urdu_segment.as_deref(), Some(urdu));
        }
    }

    #[test]
    fn reparse_of_tagged_output_is_stable() {
        let markers = Markers::default();
        let inputs = [
            "ENG_PART: a VERSE_PART: b URDU_PART: c",
            "ENG_PART: a ENG_PART: b VERSE_PART: c URDU_PART: d VERSE_PART: e",
            "ENG_PART:VERSE_PART:URDU_PART:",
            "plain text",
            "VERSE_PART: x ENG_PART: y URDU_PART: z",
            "",
        ];
        for input in inputs {
            let first = parse_response(input, &markers);
            let second = parse_response(&first.to_tagged(&markers), &markers);
            assert_eq!(first, second, "unstable re-parse for {input:?}");
        }
    }

    #[test]
    fn parse_is_total_over_odd_input() {
        let inputs = [
            "ENG_PA",
            "ENG_PART:",
            "URDU_PART:URDU_PART:URDU_PART:",
            "ENG_PART:VERSE_PART",
            "\u{0}\u{200f}ENG_PART:\u{200f}VERSE_PART:🌿URDU_PART:🌿",
            "سکون ENG_PART: سکون VERSE_PART: سکون URDU_PART: سکون",
            "   \n\t  ",
        ];
        for input in inputs {
            let response = parser().parse(input);
            if !response.is_segmented() {
                assert_eq!(response.english_segment, input.trim());
            }
        }
    }

    #[test]
    fn unsegmented_serializes_without_optional_segments() {
        let json = serde_json::to_value(GuidanceResponse::unsegmented("hi")).unwrap();
        assert_eq!(json["english_segment"], "hi");
        assert_eq!(json["quality"], "unsegmented");
        assert!(json.get("verse_segment").is_none());
    }
}
