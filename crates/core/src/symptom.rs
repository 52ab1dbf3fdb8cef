//! Canonical symptom tags.

use serde::{Deserialize, Serialize};

/// A normalised symptom tag such as `headache` or `sore throat`.
///
/// Tags are produced by the matcher from the clinical tables, so they are always lowercase
/// and trimmed. They are the unit of comparison against follow-up templates and condition
/// descriptions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symptom(String);

impl Symptom {
    /// Creates a tag, normalising case and surrounding whitespace.
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(tag.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symptom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symptom {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
