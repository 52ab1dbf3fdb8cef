//! Per-user conversation state.
//!
//! A [`Session`] is a plain value: the dialogue mutates it in memory and the store encodes it
//! as one JSON document at the storage boundary. Decoding is lenient, so a field that is
//! missing or malformed comes back empty instead of failing the request.

use crate::error::{TriageError, TriageResult};
use crate::symptom::Symptom;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A follow-up question together with what the user replied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub answer: String,
}

/// Where a session stands between turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No symptoms and no pending question.
    Fresh,
    /// A follow-up question was asked; the next message answers it.
    AwaitingAnswer,
    /// Symptoms are known and nothing is pending; the next turn summarises.
    Diagnosing,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    symptoms: Vec<Symptom>,
    followups: VecDeque<String>,
    answers: Vec<Answer>,
    pending: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical symptoms in first-seen order, without duplicates.
    pub fn symptoms(&self) -> &[Symptom] {
        &self.symptoms
    }

    /// Collected answers in the order their questions were first answered.
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    /// Questions still queued behind the pending one.
    pub fn followups(&self) -> &VecDeque<String> {
        &self.followups
    }

    pub fn pending_question(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn state(&self) -> SessionState {
        if self.pending.is_some() {
            SessionState::AwaitingAnswer
        } else if self.symptoms.is_empty() {
            SessionState::Fresh
        } else {
            SessionState::Diagnosing
        }
    }

    /// Clears every field.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Appends `symptom` unless already present. Returns whether it was added.
    pub fn add_symptom(&mut self, symptom: Symptom) -> bool {
        if self.symptoms.contains(&symptom) {
            return false;
        }
        self.symptoms.push(symptom);
        true
    }

    /// Removes and returns the pending question.
    pub fn take_pending(&mut self) -> Option<String> {
        self.pending.take()
    }

    /// Stores `answer` for `question`, replacing an earlier answer to the same question in place.
    pub fn record_answer(&mut self, question: String, answer: String) {
        match self.answers.iter_mut().find(|a| a.question == question) {
            Some(existing) => existing.answer = answer,
            None => self.answers.push(Answer { question, answer }),
        }
    }

    /// Replaces the follow-up queue.
    pub fn queue_followups(&mut self, questions: impl IntoIterator<Item = String>) {
        self.followups = questions.into_iter().collect();
    }

    /// Pops the next queued question and marks it pending.
    ///
    /// Returns `None` (leaving nothing pending) when the queue is empty.
    pub fn ask_next(&mut self) -> Option<String> {
        let next = self.followups.pop_front()?;
        self.pending = Some(next.clone());
        Some(next)
    }

    /// Encodes the session for storage.
    ///
    /// # Errors
    ///
    /// Returns `TriageError::SessionSerialization` if JSON encoding fails.
    pub fn encode(&self) -> TriageResult<String> {
        serde_json::to_string(self).map_err(TriageError::SessionSerialization)
    }

    /// Decodes a stored session, defaulting anything missing or malformed.
    pub fn decode(raw: &str) -> Self {
        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "stored session is not valid JSON; starting empty");
                return Self::default();
            }
        };

        let mut session = Self {
            symptoms: Vec::new(),
            followups: field(&value, "followups"),
            answers: field(&value, "answers"),
            pending: field(&value, "pending"),
        };
        for symptom in field::<Vec<Symptom>>(&value, "symptoms") {
            session.add_symptom(symptom);
        }
        session
    }
}

fn field<T: DeserializeOwned + Default>(value: &serde_json::Value, name: &str) -> T {
    match value.get(name) {
        None | Some(serde_json::Value::Null) => T::default(),
        Some(raw) => serde_json::from_value(raw.clone()).unwrap_or_else(|err| {
            tracing::warn!(field = name, error = %err, "malformed session field; using empty value");
            T::default()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_fresh() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::Fresh);
        assert!(session.symptoms().is_empty());
        assert!(session.pending_question().is_none());
    }

    #[test]
    fn test_add_symptom_suppresses_duplicates_and_keeps_order() {
        let mut session = Session::new();
        assert!(session.add_symptom(Symptom::new("headache")));
        assert!(session.add_symptom(Symptom::new("fever")));
        assert!(!session.add_symptom(Symptom::new("headache")));
        assert_eq!(
            session.symptoms(),
            &[Symptom::new("headache"), Symptom::new("fever")]
        );
        assert_eq!(session.state(), SessionState::Diagnosing);
    }

    #[test]
    fn test_ask_next_marks_pending() {
        let mut session = Session::new();
        session.queue_followups(vec!["q1".to_string(), "q2".to_string()]);

        assert_eq!(session.ask_next().as_deref(), Some("q1"));
        assert_eq!(session.pending_question(), Some("q1"));
        assert_eq!(session.state(), SessionState::AwaitingAnswer);
        assert_eq!(session.followups().len(), 1);

        assert_eq!(session.take_pending().as_deref(), Some("q1"));
        assert_eq!(session.ask_next().as_deref(), Some("q2"));
        session.take_pending();
        assert_eq!(session.ask_next(), None);
        assert_eq!(session.pending_question(), None);
    }

    #[test]
    fn test_record_answer_replaces_in_place() {
        let mut session = Session::new();
        session.record_answer("a?".into(), "1".into());
        session.record_answer("b?".into(), "2".into());
        session.record_answer("a?".into(), "3".into());
        assert_eq!(
            session.answers(),
            &[
                Answer {
                    question: "a?".into(),
                    answer: "3".into()
                },
                Answer {
                    question: "b?".into(),
                    answer: "2".into()
                },
            ]
        );
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = Session::new();
        session.add_symptom(Symptom::new("cough"));
        session.queue_followups(vec!["q".to_string()]);
        session.ask_next();
        session.record_answer("x".into(), "y".into());

        session.reset();
        assert_eq!(session, Session::new());
    }

    #[test]
    fn test_encode_decode_preserves_state() {
        let mut session = Session::new();
        session.add_symptom(Symptom::new("headache"));
        session.queue_followups(vec!["q1".to_string(), "q2".to_string()]);
        session.ask_next();
        session.record_answer("earlier?".into(), "yes".into());

        let decoded = Session::decode(&session.encode().unwrap());
        assert_eq!(decoded, session);
    }

    #[test]
    fn test_decode_invalid_json_is_empty() {
        assert_eq!(Session::decode("not json"), Session::new());
        assert_eq!(Session::decode(""), Session::new());
    }

    #[test]
    fn test_decode_defaults_malformed_fields_only() {
        let raw = r#"{"symptoms":["fever","fever","cough"],"followups":42,"answers":null,"pending":"How long?"}"#;
        let session = Session::decode(raw);
        assert_eq!(
            session.symptoms(),
            &[Symptom::new("fever"), Symptom::new("cough")]
        );
        assert!(session.followups().is_empty());
        assert!(session.answers().is_empty());
        assert_eq!(session.pending_question(), Some("How long?"));
    }
}
