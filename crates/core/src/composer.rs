//! Response text templates.
//!
//! Follow-up questions and summaries always end with the disclaimer. A summary lists the
//! reported symptoms and collected answers, adds at most one warning line, and then exactly one
//! of: the emergency escalation, the top condition with its remedy, or an apology.

use crate::constants::{
    EMERGENCY_ESCALATION, LONG_DURATION_MARKERS, LONG_DURATION_WARNING, NO_MATCH_APOLOGY,
    SEVERE_SEVERITY_THRESHOLD, SEVERE_WARNING,
};
use crate::intent::Intent;
use crate::session::Answer;
use crate::store::Remedy;
use crate::symptom::Symptom;

/// Everything a summary is rendered from.
#[derive(Debug, Clone, Copy)]
pub struct SummaryInput<'a> {
    pub symptoms: &'a [Symptom],
    pub answers: &'a [Answer],
    pub emergency: bool,
    pub intent: Intent,
    /// Name of the highest-ranked condition, if any condition scored.
    pub top_condition: Option<&'a str>,
    /// First remedy of the top condition.
    pub remedy: Option<&'a Remedy>,
}

/// A follow-up question followed by the disclaimer.
pub fn question(text: &str, disclaimer: &str) -> String {
    format!("{text}\n\n{disclaimer}")
}

/// Renders the diagnosis summary.
pub fn summary(input: &SummaryInput<'_>, disclaimer: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    if !input.symptoms.is_empty() {
        let joined = input
            .symptoms
            .iter()
            .map(Symptom::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("You reported: {joined}."));
    }

    let mut duration: Option<&str> = None;
    let mut severity: Option<&str> = None;
    for Answer { question, answer } in input.answers {
        let question = question.to_lowercase();
        if question.contains("how long") {
            duration = Some(answer.as_str());
            lines.push(format!("Duration: {answer}."));
        }
        if question.contains("severe") {
            severity = Some(answer.as_str());
            lines.push(format!("Severity: {answer}/10."));
        }
    }

    if let Some(warning) = warning(duration, severity) {
        lines.push(format!("⚠️ {warning}"));
    }

    if input.emergency {
        lines.push(EMERGENCY_ESCALATION.to_string());
    } else if let (Intent::RemedyRequest, Some(condition), Some(remedy)) =
        (input.intent, input.top_condition, input.remedy)
    {
        push_condition(&mut lines, condition, Some(remedy));
    } else if let Some(condition) = input.top_condition {
        push_condition(&mut lines, condition, input.remedy);
    } else {
        lines.push(NO_MATCH_APOLOGY.to_string());
    }

    lines.push(String::new());
    lines.push(disclaimer.to_string());
    lines.join("\n")
}

fn push_condition(lines: &mut Vec<String>, condition: &str, remedy: Option<&Remedy>) {
    lines.push(format!("Possible condition: {condition}"));
    if let Some(remedy) = remedy {
        lines.push(format!("Home remedy: {}", remedy.remedy_text));
        if let Some(notes) = &remedy.safety_notes {
            lines.push(format!("Safety notes: {notes}"));
        }
    }
}

/// Picks the warning for the last duration and severity answers.
///
/// A long duration outranks a high severity. Severity that is not an integer is ignored.
fn warning(duration: Option<&str>, severity: Option<&str>) -> Option<&'static str> {
    let long = duration.is_some_and(|d| {
        let d = d.to_lowercase();
        LONG_DURATION_MARKERS.iter().any(|marker| d.contains(marker))
    });
    if long {
        return Some(LONG_DURATION_WARNING);
    }

    let severe = severity
        .and_then(|s| s.trim().parse::<i64>().ok())
        .is_some_and(|value| value >= SEVERE_SEVERITY_THRESHOLD);
    severe.then_some(SEVERE_WARNING)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISCLAIMER: &str = "Not medical advice.";

    fn answers(pairs: &[(&str, &str)]) -> Vec<Answer> {
        pairs
            .iter()
            .map(|(q, a)| Answer {
                question: q.to_string(),
                answer: a.to_string(),
            })
            .collect()
    }

    fn headache_answers(severity: &str) -> Vec<Answer> {
        answers(&[
            ("How long have you had your headache?", "2 days"),
            ("On a scale of 1-10, how severe is your headache?", severity),
            ("Are you also experiencing any nausea or vision changes?", "no"),
        ])
    }

    fn remedy() -> Remedy {
        Remedy {
            id: 1,
            condition_id: 2,
            remedy_text: "Rest in a dark, quiet room.".into(),
            safety_notes: Some("Seek medical attention for sudden, severe headaches.".into()),
        }
    }

    fn input<'a>(symptoms: &'a [Symptom], answers: &'a [Answer]) -> SummaryInput<'a> {
        SummaryInput {
            symptoms,
            answers,
            emergency: false,
            intent: Intent::SymptomReport,
            top_condition: None,
            remedy: None,
        }
    }

    #[test]
    fn test_question_appends_disclaimer() {
        assert_eq!(
            question("How long?", DISCLAIMER),
            "How long?\n\nNot medical advice."
        );
    }

    #[test]
    fn test_full_summary_layout() {
        let symptoms = vec![Symptom::new("headache")];
        let answers = headache_answers("5");
        let remedy = remedy();
        let mut summary_input = input(&symptoms, &answers);
        summary_input.top_condition = Some("Migraine");
        summary_input.remedy = Some(&remedy);

        let text = summary(&summary_input, DISCLAIMER);
        assert_eq!(
            text,
            "You reported: headache.\n\
             Duration: 2 days.\n\
             Severity: 5/10.\n\
             Possible condition: Migraine\n\
             Home remedy: Rest in a dark, quiet room.\n\
             Safety notes: Seek medical attention for sudden, severe headaches.\n\
             \n\
             Not medical advice."
        );
    }

    #[test]
    fn test_high_severity_warns() {
        let symptoms = vec![Symptom::new("headache")];
        let answers = headache_answers("9");
        let text = summary(&input(&symptoms, &answers), DISCLAIMER);
        assert!(text.contains(&format!("⚠️ {SEVERE_WARNING}")));
    }

    #[test]
    fn test_non_numeric_severity_is_ignored() {
        let symptoms = vec![Symptom::new("headache")];
        let answers = headache_answers("abc");
        let text = summary(&input(&symptoms, &answers), DISCLAIMER);
        assert!(text.contains("Severity: abc/10."));
        assert!(!text.contains("⚠️"));
    }

    #[test]
    fn test_long_duration_outranks_severity() {
        let symptoms = vec![Symptom::new("cough")];
        let answers = answers(&[
            ("How long have you had your cough?", "Two WEEKS"),
            ("On a scale of 1-10, how severe is your cough?", "10"),
        ]);
        let text = summary(&input(&symptoms, &answers), DISCLAIMER);
        assert!(text.contains(LONG_DURATION_WARNING));
        assert!(!text.contains(SEVERE_WARNING));
    }

    #[test]
    fn test_long_duration_warns_even_with_non_numeric_severity() {
        let symptoms = vec![Symptom::new("cough")];
        let answers = answers(&[
            ("How long have you had your cough?", "it is persistent"),
            ("On a scale of 1-10, how severe is your cough?", "bad"),
        ]);
        let text = summary(&input(&symptoms, &answers), DISCLAIMER);
        assert!(text.contains(LONG_DURATION_WARNING));
    }

    #[test]
    fn test_emergency_excludes_condition_block() {
        let symptoms = vec![Symptom::new("chest pain")];
        let remedy = remedy();
        let mut summary_input = input(&symptoms, &[]);
        summary_input.emergency = true;
        summary_input.top_condition = Some("Angina");
        summary_input.remedy = Some(&remedy);

        let text = summary(&summary_input, DISCLAIMER);
        assert!(text.contains(EMERGENCY_ESCALATION));
        assert!(!text.contains("Possible condition"));
        assert!(!text.contains("Home remedy"));
    }

    #[test]
    fn test_remedy_request_reports_condition_and_remedy() {
        let symptoms = vec![Symptom::new("headache")];
        let remedy = remedy();
        let mut summary_input = input(&symptoms, &[]);
        summary_input.intent = Intent::RemedyRequest;
        summary_input.top_condition = Some("Migraine");
        summary_input.remedy = Some(&remedy);

        let text = summary(&summary_input, DISCLAIMER);
        assert!(text.contains("Possible condition: Migraine"));
        assert!(text.contains("Home remedy: Rest in a dark, quiet room."));
    }

    #[test]
    fn test_condition_without_remedy() {
        let symptoms = vec![Symptom::new("dizziness")];
        let mut summary_input = input(&symptoms, &[]);
        summary_input.top_condition = Some("Vertigo");

        let text = summary(&summary_input, DISCLAIMER);
        assert!(text.contains("Possible condition: Vertigo"));
        assert!(!text.contains("Home remedy"));
    }

    #[test]
    fn test_nothing_found_apologises() {
        let text = summary(&input(&[], &[]), DISCLAIMER);
        assert_eq!(text, format!("{NO_MATCH_APOLOGY}\n\n{DISCLAIMER}"));
    }
}
