//! Static clinical lookup tables.
//!
//! The synonym table, follow-up templates, emergency keywords and disclaimer are read once at
//! start-up from a YAML document and shared immutably afterwards. A default document is
//! embedded in the crate; deployments can point `MEDBOT_TABLES_FILE` at their own copy (see
//! [`crate::config::resolve_clinical_tables`]).
//!
//! ## Document shape
//!
//! ```yaml
//! disclaimer: "..."
//! emergency_keywords: [chest pain, ...]
//! synonyms:
//!   - canonical: headache
//!     phrases: [my head is hurting, ...]
//! followups:
//!   headache: [How long have you had your headache?, ...]
//! ```

use crate::error::{TriageError, TriageResult};
use crate::symptom::Symptom;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// The tables shipped with the crate.
pub const BUILTIN_TABLES_YAML: &str = include_str!("../tables/clinical_tables.yaml");

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TablesWire {
    disclaimer: String,
    #[serde(default)]
    emergency_keywords: Vec<String>,
    synonyms: Vec<SynonymGroupWire>,
    #[serde(default)]
    followups: HashMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SynonymGroupWire {
    canonical: String,
    phrases: Vec<String>,
}

/// Immutable clinical lookup data.
#[derive(Debug, Clone)]
pub struct ClinicalTables {
    disclaimer: String,
    emergency_keywords: Vec<String>,
    synonyms: Vec<(String, Symptom)>,
    canonicals: Vec<Symptom>,
    followups: HashMap<Symptom, Vec<String>>,
}

impl ClinicalTables {
    /// Parses the embedded default tables.
    ///
    /// # Errors
    ///
    /// Returns an error only if the embedded document is broken, which the unit tests guard.
    pub fn builtin() -> TriageResult<Self> {
        Self::parse(BUILTIN_TABLES_YAML)
    }

    /// Reads and parses a tables document from disk.
    ///
    /// # Errors
    ///
    /// Returns `TriageError::TablesRead` if the file cannot be read, and the errors of
    /// [`ClinicalTables::parse`] otherwise.
    pub fn from_file(path: &Path) -> TriageResult<Self> {
        let text = std::fs::read_to_string(path).map_err(TriageError::TablesRead)?;
        Self::parse(&text)
    }

    /// Parses and validates a tables document.
    ///
    /// Phrases, canonicals, keywords and template keys are trimmed and lowercased, since all
    /// matching happens against lowercased user text.
    ///
    /// # Errors
    ///
    /// Returns `TriageError::TablesParse` when the YAML does not fit the schema (the message
    /// names the offending path) and `TriageError::InvalidTables` when the content is unusable:
    /// an empty disclaimer, no synonyms, or a blank phrase, canonical or question.
    pub fn parse(yaml_text: &str) -> TriageResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let wire = match serde_path_to_error::deserialize::<_, TablesWire>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(TriageError::TablesParse(format!(
                    "schema mismatch at {path}: {source}"
                )));
            }
        };

        Self::from_wire(wire)
    }

    fn from_wire(wire: TablesWire) -> TriageResult<Self> {
        let disclaimer = wire.disclaimer.trim().to_string();
        if disclaimer.is_empty() {
            return Err(TriageError::InvalidTables("disclaimer cannot be empty".into()));
        }

        let mut synonyms = Vec::new();
        for group in wire.synonyms {
            let canonical = Symptom::new(&group.canonical);
            if canonical.as_str().is_empty() {
                return Err(TriageError::InvalidTables(
                    "synonym group has a blank canonical".into(),
                ));
            }
            for phrase in group.phrases {
                let phrase = phrase.trim().to_lowercase();
                if phrase.is_empty() {
                    return Err(TriageError::InvalidTables(format!(
                        "blank phrase in synonym group '{canonical}'"
                    )));
                }
                synonyms.push((phrase, canonical.clone()));
            }
        }
        if synonyms.is_empty() {
            return Err(TriageError::InvalidTables(
                "at least one synonym phrase is required".into(),
            ));
        }

        let canonicals = synonyms
            .iter()
            .map(|(_, canonical)| canonical.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut followups = HashMap::new();
        for (symptom, questions) in wire.followups {
            let questions: Vec<String> = questions
                .into_iter()
                .map(|q| q.trim().to_string())
                .collect();
            if questions.iter().any(|q| q.is_empty()) {
                return Err(TriageError::InvalidTables(format!(
                    "blank follow-up question for '{}'",
                    symptom.trim()
                )));
            }
            followups.insert(Symptom::new(&symptom), questions);
        }

        let emergency_keywords = wire
            .emergency_keywords
            .into_iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        Ok(Self {
            disclaimer,
            emergency_keywords,
            synonyms,
            canonicals,
            followups,
        })
    }

    pub fn disclaimer(&self) -> &str {
        &self.disclaimer
    }

    pub fn emergency_keywords(&self) -> &[String] {
        &self.emergency_keywords
    }

    /// `(phrase, canonical)` pairs in document order.
    pub fn synonyms(&self) -> &[(String, Symptom)] {
        &self.synonyms
    }

    /// Distinct canonical symptoms, sorted.
    pub fn canonicals(&self) -> &[Symptom] {
        &self.canonicals
    }

    /// Follow-up questions for a symptom.
    ///
    /// Symptoms without a (non-empty) template get a generic duration question and a generic
    /// severity question naming the symptom.
    pub fn followups_for(&self, symptom: &Symptom) -> Vec<String> {
        match self.followups.get(symptom) {
            Some(questions) if !questions.is_empty() => questions.clone(),
            _ => vec![
                format!("How long have you had your {symptom}?"),
                format!("On a scale of 1-10, how severe is your {symptom}?"),
            ],
        }
    }
}
