//! Reference passage lookup.
//!
//! [`ContextRetriever`] is the seam the pipeline calls: one lookup, one
//! passage, no per-request failure. A retriever that cannot serve requests
//! must fail when it is built, before the process starts taking input.
//!
//! [`PassageCorpus`] is the bundled implementation over a prebuilt JSON
//! corpus. Its scoring is a plain term-frequency cosine; swap in an
//! embedding-backed retriever by implementing the trait.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::GuidanceError;

/// The single passage returned for a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferencePassage {
    pub text: String,
    /// Citation label, e.g. "Qur'an 94:5".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ReferencePassage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Nearest-passage lookup (k = 1).
pub trait ContextRetriever: Send + Sync {
    fn retrieve(&self, raw_text: &str) -> ReferencePassage;
}

/// Corpus file entry: a bare string or an object with an optional source.
#[derive(Deserialize)]
#[serde(untagged)]
enum CorpusEntry {
    Text(String),
    Passage(ReferencePassage),
}

struct IndexedPassage {
    passage: ReferencePassage,
    terms: HashMap<String, f32>,
    norm: f32,
}

/// Read-only, in-memory passage corpus loaded once at start-up.
pub struct PassageCorpus {
    entries: Vec<IndexedPassage>,
}

impl PassageCorpus {
    /// Build a corpus from passages. Blank passages are skipped; an empty
    /// result is [`GuidanceError::RetrievalUnavailable`].
    pub fn from_passages(
        passages: impl IntoIterator<Item = ReferencePassage>,
    ) -> Result<Self, GuidanceError> {
        let entries: Vec<IndexedPassage> = passages
            .into_iter()
            .filter(|p| !p.text.trim().is_empty())
            .map(|passage| {
                let terms = term_frequencies(&passage.text);
                let norm = vector_norm(&terms);
                IndexedPassage {
                    passage,
                    terms,
                    norm,
                }
            })
            .collect();

        if entries.is_empty() {
            return Err(GuidanceError::RetrievalUnavailable(
                "corpus contains no passages".into(),
            ));
        }
        Ok(Self { entries })
    }

    /// Parse a JSON array of strings or `{"text", "source"}` objects.
    pub fn from_json(json: &str) -> Result<Self, GuidanceError> {
        let raw: Vec<CorpusEntry> = serde_json::from_str(json).map_err(|e| {
            GuidanceError::RetrievalUnavailable(format!("failed to parse corpus: {e}"))
        })?;
        Self::from_passages(raw.into_iter().map(|entry| match entry {
            CorpusEntry::Text(text) => ReferencePassage::new(text),
            CorpusEntry::Passage(p) => p,
        }))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, GuidanceError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GuidanceError::RetrievalUnavailable(format!(
                "failed to read corpus '{}': {e}",
                path.display()
            ))
        })?;
        let corpus = Self::from_json(&content)?;
        info!(
            "Loaded {} passage(s) from {}",
            corpus.len(),
            path.display()
        );
        Ok(corpus)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index and cosine score of the best passage. Ties keep the earliest.
    fn best_match(&self, raw_text: &str) -> (usize, f32) {
        let query = term_frequencies(raw_text);
        let query_norm = vector_norm(&query);

        let mut best = (0, 0.0_f32);
        if query_norm == 0.0 {
            return best;
        }
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.norm == 0.0 {
                continue;
            }
            let dot: f32 = query
                .iter()
                .filter_map(|(term, q)| entry.terms.get(term).map(|p| q * p))
                .sum();
            let score = dot / (query_norm * entry.norm);
            if score > best.1 {
                best = (i, score);
            }
        }
        best
    }
}

impl ContextRetriever for PassageCorpus {
    fn retrieve(&self, raw_text: &str) -> ReferencePassage {
        let (index, score) = self.best_match(raw_text);
        debug!(index, score, "retrieved reference passage");
        // `from_passages` guarantees at least one entry.
        self.entries[index].passage.clone()
    }
}

fn term_frequencies(text: &str) -> HashMap<String, f32> {
    let mut terms = HashMap::new();
    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        *terms.entry(token.to_lowercase()).or_insert(0.0) += 1.0;
    }
    terms
}

fn vector_norm(terms: &HashMap<String, f32>) -> f32 {
    terms.values().map(|v| v * v).sum::<f32>().sqrt()
}
