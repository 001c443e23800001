//! Entity tagger implementations.
//!
//! `HttpEntityTagger` delegates to an NER service (for example a small spaCy
//! wrapper) and maps its labels. `HeuristicTagger` needs no service: it
//! chunks runs of capitalized words and tags every chunk as an organization,
//! leaving the keyword classifier to decide what the chunk is about.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::config::TaggerConfig;
use super::error::ExtractionError;
use super::traits::EntityTagger;
use crate::classifier::{EntityKind, TaggedEntity};

/// Lowercase words allowed inside a capitalized phrase.
const CONNECTORS: &[&str] = &[
    "de", "del", "la", "las", "los", "el", "y", "e", "of", "the", "and", "for",
];

/// Capitalized-phrase chunker.
#[derive(Debug, Clone, Default)]
pub struct HeuristicTagger;

impl HeuristicTagger {
    pub fn new() -> Self {
        Self
    }

    /// Splits `text` into capitalized phrases in order of appearance.
    pub fn phrases(text: &str) -> Vec<String> {
        let mut chunker = Chunker::default();
        for raw in text.split_whitespace() {
            chunker.push(raw);
        }
        chunker.finish()
    }
}

#[async_trait]
impl EntityTagger for HeuristicTagger {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn tag(&self, text: &str) -> Result<Vec<TaggedEntity>, ExtractionError> {
        Ok(Self::phrases(text)
            .into_iter()
            .map(|phrase| TaggedEntity::new(phrase, EntityKind::Organization))
            .collect())
    }
}

#[derive(Default)]
struct Chunker {
    phrases: Vec<String>,
    current: Vec<String>,
    pending_connectors: Vec<String>,
    pending_ordinal: Option<String>,
    last_was_capitalized: bool,
}

impl Chunker {
    fn push(&mut self, raw: &str) {
        let word = raw.trim_matches(|c: char| !c.is_alphanumeric());
        if word.is_empty() {
            self.flush();
            return;
        }

        if is_ordinal(word) {
            if self.last_was_capitalized && self.pending_connectors.is_empty() {
                self.current.push(word.to_string());
            } else {
                self.flush();
                self.pending_ordinal = Some(word.to_string());
            }
            self.last_was_capitalized = false;
        } else if is_capitalized(word) {
            if self.current.is_empty() {
                if let Some(ordinal) = self.pending_ordinal.take() {
                    self.current.push(ordinal);
                }
            } else {
                self.current.append(&mut self.pending_connectors);
            }
            self.current.push(word.to_string());
            self.last_was_capitalized = true;
        } else if !self.current.is_empty() && CONNECTORS.contains(&word) {
            self.pending_connectors.push(word.to_string());
            self.last_was_capitalized = false;
        } else {
            self.flush();
        }

        if ends_clause(raw, word) {
            self.flush();
        }
    }

    fn flush(&mut self) {
        self.pending_connectors.clear();
        self.pending_ordinal = None;
        self.last_was_capitalized = false;

        let words = std::mem::take(&mut self.current);
        let has_content = words.iter().any(|w| {
            is_capitalized(w) && !CONNECTORS.contains(&w.to_lowercase().as_str())
        });
        if has_content {
            self.phrases.push(words.join(" "));
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.phrases
    }
}

fn is_capitalized(word: &str) -> bool {
    word.chars().next().is_some_and(|c| c.is_uppercase())
}

/// `3rd`, `21`, `4a`, `1º`.
fn is_ordinal(word: &str) -> bool {
    let digits = word.chars().take_while(|c| c.is_ascii_digit()).count();
    digits > 0 && word.chars().count() - digits <= 2
}

/// Clause punctuation ends a phrase, except after short abbreviations like `No.`.
fn ends_clause(raw: &str, word: &str) -> bool {
    match raw.chars().last() {
        Some(',' | ';' | ':' | '!' | '?' | ')') => true,
        Some('.') => word.chars().count() > 2,
        _ => false,
    }
}

/// Request body sent to the NER service.
#[derive(Debug, Serialize)]
struct TagRequest<'a> {
    text: &'a str,
}

/// One entity in the NER service response.
#[derive(Debug, Deserialize)]
struct ServiceEntity {
    text: String,
    label: String,
}

/// Either a bare list or `{"entities": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TagResponse {
    List(Vec<ServiceEntity>),
    Wrapped { entities: Vec<ServiceEntity> },
}

impl TagResponse {
    fn into_entities(self) -> Vec<TaggedEntity> {
        let raw = match self {
            TagResponse::List(list) => list,
            TagResponse::Wrapped { entities } => entities,
        };
        raw.into_iter()
            .map(|e| TaggedEntity::new(e.text, EntityKind::from_label(&e.label)))
            .collect()
    }
}

/// Tags entities by POSTing text to an NER service.
pub struct HttpEntityTagger {
    client: Client,
    url: String,
}

impl HttpEntityTagger {
    /// Create a new tagger from configuration.
    pub fn new(config: &TaggerConfig) -> Result<Self, ExtractionError> {
        let url = config
            .url
            .clone()
            .ok_or_else(|| ExtractionError::tagging("tagger.url is not configured"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExtractionError::tagging(format!("failed to build client: {}", e)))?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl EntityTagger for HttpEntityTagger {
    fn name(&self) -> &str {
        "http"
    }

    async fn tag(&self, text: &str) -> Result<Vec<TaggedEntity>, ExtractionError> {
        let response = self
            .client
            .post(&self.url)
            .json(&TagRequest { text })
            .send()
            .await
            .map_err(|e| ExtractionError::tagging(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::tagging(format!(
                "service returned {}: {}",
                status, body
            )));
        }

        let parsed: TagResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::tagging(format!("invalid response: {}", e)))?;

        Ok(parsed.into_entities())
    }
}
