//! Data models for vocabulary flashcards.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Numeric study group identifier.
pub type GroupId = i64;

/// Dataset-wide unique ordering key.
pub type SequenceKey = i64;

/// One meaning of a word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    /// Part-of-speech label, e.g. "noun".
    pub part_of_speech: String,
    /// Definition text.
    pub definition: String,
    /// Example sentence. May contain inline markup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentence: Option<String>,
    /// Synonyms, in dataset order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,
}

impl Definition {
    /// Create a definition without sentence or synonyms.
    pub fn new(part_of_speech: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            part_of_speech: part_of_speech.into(),
            definition: definition.into(),
            sentence: None,
            synonyms: Vec::new(),
        }
    }

    /// Set the example sentence.
    pub fn with_sentence(mut self, sentence: impl Into<String>) -> Self {
        self.sentence = Some(sentence.into());
        self
    }

    /// Add a synonym.
    pub fn with_synonym(mut self, synonym: impl Into<String>) -> Self {
        self.synonyms.push(synonym.into());
        self
    }
}

/// A single vocabulary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabItem {
    /// Unique sequence key.
    pub key: SequenceKey,
    /// Study group this word belongs to.
    pub group: GroupId,
    /// Display word.
    pub word: String,
    /// Meanings, never empty in a validated dataset.
    pub definitions: Vec<Definition>,
}

impl VocabItem {
    /// Create a new item with a single definition.
    pub fn new(key: SequenceKey, group: GroupId, word: impl Into<String>, definition: Definition) -> Self {
        Self {
            key,
            group,
            word: word.into(),
            definitions: vec![definition],
        }
    }
}

/// Why a sequence of items is not an acceptable dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("expected a JSON array of vocabulary items")]
    NotAnArray,
    #[error("malformed vocabulary data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate sequence key {0}")]
    DuplicateKey(SequenceKey),
    #[error("word {word:?} (key {key}) has no definitions")]
    NoDefinitions { key: SequenceKey, word: String },
}

/// Validated, immutable vocabulary dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    items: Vec<VocabItem>,
}

impl Dataset {
    /// Validate items: unique keys and at least one definition each.
    pub fn new(items: Vec<VocabItem>) -> Result<Self, DatasetError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.key) {
                return Err(DatasetError::DuplicateKey(item.key));
            }
            if item.definitions.is_empty() {
                return Err(DatasetError::NoDefinitions {
                    key: item.key,
                    word: item.word.clone(),
                });
            }
        }
        Ok(Self { items })
    }

    /// Items in dataset (file) order.
    pub fn items(&self) -> &[VocabItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
