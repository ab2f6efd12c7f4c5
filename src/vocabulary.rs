//! Closed, ordered category vocabularies.
//!
//! Label ids are `position + 1`; id `0` is reserved for background.

use std::collections::HashMap;

use crate::error::{ConvertError, Result};

/// Detection categories of BDD100K, in label-id order.
pub const DEEPDRIVE_LABELS: &[&str] = &[
    "bus",
    "traffic light",
    "traffic sign",
    "person",
    "bike",
    "truck",
    "motor",
    "car",
    "train",
    "rider",
];

pub const DEEPDRIVE_VOCABULARY_VERSION: &str = "bdd100k-det-v1";

/// An immutable category-to-id lookup table tagged with a version name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelVocabulary {
    version: String,
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelVocabulary {
    /// Build a vocabulary from an ordered label list. Later duplicates are ignored.
    pub fn new<I, S>(version: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ordered = Vec::new();
        let mut index = HashMap::new();
        for label in labels {
            let label = label.into();
            if index.contains_key(&label) {
                continue;
            }
            index.insert(label.clone(), ordered.len());
            ordered.push(label);
        }

        Self {
            version: version.into(),
            labels: ordered,
            index,
        }
    }

    pub fn deepdrive() -> Self {
        Self::new(DEEPDRIVE_VOCABULARY_VERSION, DEEPDRIVE_LABELS.iter().copied())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label id of `category`, or `None` if it is not in the vocabulary.
    pub fn get(&self, category: &str) -> Option<i64> {
        self.index.get(category).map(|&pos| pos as i64 + 1)
    }

    pub fn resolve(&self, category: &str) -> Result<i64> {
        self.get(category)
            .ok_or_else(|| ConvertError::UnknownCategory {
                category: category.to_string(),
                vocabulary: self.version.clone(),
            })
    }
}

impl Default for LabelVocabulary {
    fn default() -> Self {
        Self::deepdrive()
    }
}
