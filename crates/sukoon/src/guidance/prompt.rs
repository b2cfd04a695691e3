//! Prompt assembly.
//!
//! [`PromptBuilder`] joins a preamble and headed sections; [`PromptComposer`]
//! uses it to build the single instruction sent to the model for each
//! request: role framing, the reference passage, the user's text, and the
//! output-format contract naming the three [`Markers`].

use super::markers::Markers;
use super::retriever::ReferencePassage;

/// Builder for multi-section prompts.
///
/// Sections are joined with double newlines. Empty sections are skipped.
///
/// # Example
///
/// ```
/// use sukoon::guidance::prompt::PromptBuilder;
///
/// let prompt = PromptBuilder::new("You are a gentle mentor.")
///     .section("Reference passage", "Patience is the key to relief.")
///     .section_opt("Source", None::<String>)
///     .build();
///
/// assert!(prompt.contains("## Reference passage"));
/// assert!(!prompt.contains("## Source"));
/// ```
pub struct PromptBuilder {
    sections: Vec<String>,
}

impl PromptBuilder {
    /// Create a builder with a preamble that has no heading.
    pub fn new(preamble: impl Into<String>) -> Self {
        Self {
            sections: vec![preamble.into()],
        }
    }

    /// Append a `##` section. Skipped if `content` is empty.
    pub fn section(mut self, heading: &str, content: impl Into<String>) -> Self {
        let content = content.into();
        if !content.is_empty() {
            self.sections.push(format!("## {heading}\n\n{content}"));
        }
        self
    }

    /// Append a section only if the content is `Some`.
    pub fn section_opt(self, heading: &str, content: Option<impl Into<String>>) -> Self {
        match content {
            Some(c) => self.section(heading, c),
            None => self,
        }
    }

    pub fn build(self) -> String {
        self.sections.join("\n\n")
    }
}

/// The instruction text sent to the model for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub instruction_text: String,
}

impl ComposedPrompt {
    pub fn as_str(&self) -> &str {
        &self.instruction_text
    }

    pub fn len(&self) -> usize {
        self.instruction_text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruction_text.is_empty()
    }
}

const ROLE_FRAMING: &str = "\
You are a gentle mentor offering spiritual comfort. Someone has shared what is \
on their heart. Respond with warmth, humility, and hope, grounded in the \
reference passage below. Do not lecture, diagnose, or give medical advice.";

/// Builds the per-request instruction around a fixed set of markers.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    markers: Markers,
}

impl PromptComposer {
    pub fn new(markers: Markers) -> Self {
        Self { markers }
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    /// Marker literals inside the passage or user text are broken up, so the
    /// output format section is the only place each marker appears.
    pub fn compose(&self, raw_text: &str, passage: &ReferencePassage) -> ComposedPrompt {
        let instruction_text = PromptBuilder::new(ROLE_FRAMING)
            .section("Reference passage", self.neutralize(passage.text.trim()))
            .section_opt(
                "Passage source",
                passage.source.as_deref().map(|s| self.neutralize(s.trim())),
            )
            .section("User message", self.neutralize(raw_text.trim()))
            .section("Output format", self.format_contract())
            .build();
        ComposedPrompt { instruction_text }
    }

    fn neutralize(&self, text: &str) -> String {
        let mut out = text.to_string();
        for marker in self.markers.in_order() {
            if out.contains(marker) {
                out = out.replace(marker, &broken_marker(marker));
            }
        }
        out
    }

    /// Names each marker exactly once, in output order.
    fn format_contract(&self) -> String {
        let m = &self.markers;
        format!(
            "Reply in exactly three parts, in this order. Start each part with its \
marker and use each marker exactly once. Write nothing before the first marker.\n\n\
{english} a short, comforting message in English (two to four sentences).\n\
{verse} the reference passage above, quoted or closely paraphrased.\n\
{urdu} a gentle explanation of the message in Urdu script.",
            english = m.english,
            verse = m.verse,
            urdu = m.urdu,
        )
    }
}

/// `marker` with a word joiner after its first character. A one-character
/// marker has nothing to split and becomes U+FFFD.
fn broken_marker(marker: &str) -> String {
    let mut chars = marker.chars();
    match chars.next() {
        Some(first) if !chars.as_str().is_empty() => {
            format!("{first}\u{2060}{}", chars.as_str())
        }
        _ => "\u{FFFD}".to_string(),
    }
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new(Markers::default())
    }
}
