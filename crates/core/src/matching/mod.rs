//! Symptom extraction from free text.
//!
//! Three passes run over the lowercased message and their results are unioned:
//!
//! 1. **Phrases**: every synonym phrase found verbatim adds its canonical symptom.
//! 2. **Words**: each token (with `.` and `,` removed) is fuzzy-matched against the canonical
//!    vocabulary at [`WORD_MATCH_CUTOFF`].
//! 3. **Windows**: each run of 2 and 3 consecutive tokens is fuzzy-matched at
//!    [`PHRASE_MATCH_CUTOFF`].
//!
//! Symptoms are returned in the order they were first found, without duplicates.

pub mod sequence;

use crate::constants::{PHRASE_MATCH_CUTOFF, PHRASE_WINDOW_SIZES, WORD_MATCH_CUTOFF};
use crate::symptom::Symptom;
use crate::tables::ClinicalTables;
use std::sync::Arc;

/// Maps free text to canonical symptoms using the clinical synonym table.
#[derive(Debug, Clone)]
pub struct SymptomMatcher {
    tables: Arc<ClinicalTables>,
}

impl SymptomMatcher {
    pub fn new(tables: Arc<ClinicalTables>) -> Self {
        Self { tables }
    }

    /// Extracts canonical symptoms from `text`.
    ///
    /// The result has no duplicates and lists symptoms in discovery order: phrase matches in
    /// table order, then word matches, then window matches.
    pub fn extract(&self, text: &str) -> Vec<Symptom> {
        let lowered = text.to_lowercase();
        let mut found: Vec<Symptom> = Vec::new();
        let mut add = |symptom: &Symptom| {
            if !found.contains(symptom) {
                found.push(symptom.clone());
            }
        };

        for (phrase, canonical) in self.tables.synonyms() {
            if lowered.contains(phrase.as_str()) {
                add(canonical);
            }
        }

        let stripped = lowered.replace(['.', ','], "");
        let words: Vec<&str> = stripped.split_whitespace().collect();
        let canonicals = self.tables.canonicals();

        for word in &words {
            if let Some(symptom) = sequence::best_match(word, canonicals, WORD_MATCH_CUTOFF) {
                add(symptom);
            }
        }

        for &size in PHRASE_WINDOW_SIZES {
            for window in words.windows(size) {
                let phrase = window.join(" ");
                if let Some(symptom) = sequence::best_match(&phrase, canonicals, PHRASE_MATCH_CUTOFF)
                {
                    add(symptom);
                }
            }
        }

        found
    }
}
