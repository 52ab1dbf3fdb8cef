//! Keyword-based intent classification.

use serde::{Deserialize, Serialize};

const REMEDY_KEYWORDS: &[&str] = &["remedy", "home remedy", "treatment", "what can i do"];
const FEEDBACK_KEYWORDS: &[&str] = &["feedback", "suggestion", "complaint"];

/// What the user is asking for in a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    SymptomReport,
    RemedyRequest,
    Feedback,
}

impl Intent {
    /// Classifies a message. Remedy keywords take priority over feedback keywords; anything
    /// else is a symptom report.
    pub fn classify(text: &str) -> Self {
        let lowered = text.to_lowercase();
        let mentions = |keywords: &[&str]| keywords.iter().any(|k| lowered.contains(k));

        if mentions(REMEDY_KEYWORDS) {
            Intent::RemedyRequest
        } else if mentions(FEEDBACK_KEYWORDS) {
            Intent::Feedback
        } else {
            Intent::SymptomReport
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::SymptomReport => "symptom_report",
            Intent::RemedyRequest => "remedy_request",
            Intent::Feedback => "feedback",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remedy_request() {
        assert_eq!(
            Intent::classify("What can I do about my headache?"),
            Intent::RemedyRequest
        );
        assert_eq!(Intent::classify("any TREATMENT options"), Intent::RemedyRequest);
    }

    #[test]
    fn test_feedback() {
        assert_eq!(Intent::classify("I have a suggestion"), Intent::Feedback);
        assert_eq!(Intent::classify("complaint about the bot"), Intent::Feedback);
    }

    #[test]
    fn test_remedy_wins_over_feedback() {
        assert_eq!(
            Intent::classify("feedback: the remedy did not help"),
            Intent::RemedyRequest
        );
    }

    #[test]
    fn test_default_is_symptom_report() {
        assert_eq!(Intent::classify("I have a cough"), Intent::SymptomReport);
        assert_eq!(Intent::classify(""), Intent::SymptomReport);
    }

    #[test]
    fn test_as_str_matches_serde_name() {
        for intent in [Intent::SymptomReport, Intent::RemedyRequest, Intent::Feedback] {
            let json = serde_json::to_string(&intent).unwrap();
            assert_eq!(json, format!("\"{}\"", intent.as_str()));
        }
    }
}
