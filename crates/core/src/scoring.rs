//! Condition ranking by description-keyword overlap.

use crate::store::Condition;
use crate::symptom::Symptom;
use serde::Serialize;

/// A condition with its share of the reported symptoms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCondition {
    pub condition_id: i64,
    pub condition: String,
    pub confidence: f64,
}

/// Ranks `conditions` against `symptoms`.
///
/// A condition scores one point per distinct symptom that appears in its lowercased
/// description. Conditions without points are dropped. Confidence is the score divided by the
/// number of distinct symptoms, rounded to two decimals (ties to even). The sort is stable, so
/// equal confidences keep the order of `conditions`.
pub fn score_conditions(symptoms: &[Symptom], conditions: &[Condition]) -> Vec<ScoredCondition> {
    let mut distinct: Vec<&Symptom> = Vec::with_capacity(symptoms.len());
    for symptom in symptoms {
        if !distinct.contains(&symptom) {
            distinct.push(symptom);
        }
    }
    if distinct.is_empty() {
        return Vec::new();
    }

    let mut ranked: Vec<ScoredCondition> = conditions
        .iter()
        .filter_map(|condition| {
            let description = condition.description.as_deref().unwrap_or("").to_lowercase();
            let score = distinct
                .iter()
                .filter(|s| description.contains(s.as_str()))
                .count();
            (score > 0).then(|| ScoredCondition {
                condition_id: condition.id,
                condition: condition.name.clone(),
                confidence: round_confidence(score as f64 / distinct.len() as f64),
            })
        })
        .collect();

    ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    ranked
}

fn round_confidence(ratio: f64) -> f64 {
    (ratio * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SeverityLevel;

    fn condition(id: i64, name: &str, description: &str) -> Condition {
        Condition {
            id,
            name: name.into(),
            description: Some(description.into()),
            severity_level: SeverityLevel::Mild,
        }
    }

    fn symptoms(tags: &[&str]) -> Vec<Symptom> {
        tags.iter().map(Symptom::new).collect()
    }

    fn reference_conditions() -> Vec<Condition> {
        vec![
            condition(
                1,
                "Common Cold",
                "A viral infection causing sneezing, sore throat, and runny nose.",
            ),
            condition(
                2,
                "Migraine",
                "A severe Headache often accompanied by nausea and sensitivity to light.",
            ),
            condition(
                3,
                "Vertigo",
                "A sensation of spinning or dizziness. Symptoms include dizziness, loss of balance, and nausea.",
            ),
        ]
    }

    #[test]
    fn test_single_symptom_full_confidence() {
        let ranked = score_conditions(&symptoms(&["headache"]), &reference_conditions());
        assert_eq!(
            ranked,
            vec![ScoredCondition {
                condition_id: 2,
                condition: "Migraine".into(),
                confidence: 1.0,
            }]
        );
    }

    #[test]
    fn test_half_confidence_for_one_of_two() {
        let ranked = score_conditions(&symptoms(&["headache", "cough"]), &reference_conditions());
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].confidence, 0.5);
    }

    #[test]
    fn test_ranked_descending_with_stable_ties() {
        let ranked = score_conditions(
            &symptoms(&["nausea", "dizziness", "sore throat"]),
            &reference_conditions(),
        );
        let names: Vec<&str> = ranked.iter().map(|r| r.condition.as_str()).collect();
        assert_eq!(names, vec!["Vertigo", "Common Cold", "Migraine"]);
        assert_eq!(ranked[0].confidence, 0.67);
        assert_eq!(ranked[1].confidence, 0.33);
        assert_eq!(ranked[2].confidence, 0.33);
    }

    #[test]
    fn test_duplicate_symptoms_counted_once() {
        let ranked = score_conditions(
            &symptoms(&["headache", "headache"]),
            &reference_conditions(),
        );
        assert_eq!(ranked[0].confidence, 1.0);
    }

    #[test]
    fn test_no_overlap_and_empty_input() {
        assert!(score_conditions(&symptoms(&["rash"]), &reference_conditions()).is_empty());
        assert!(score_conditions(&[], &reference_conditions()).is_empty());
    }

    #[test]
    fn test_missing_description_never_scores() {
        let mut bare = condition(9, "Unknown", "");
        bare.description = None;
        assert!(score_conditions(&symptoms(&["headache"]), &[bare]).is_empty());
    }

    #[test]
    fn test_rounding_ties_to_even() {
        assert_eq!(round_confidence(0.125), 0.12);
        assert_eq!(round_confidence(0.375), 0.38);
        assert_eq!(round_confidence(2.0 / 3.0), 0.67);
    }
}
