//! The per-turn session state machine.
//!
//! [`Dialogue::advance`] applies one user message to a session and says what the bot should
//! do next. It touches no storage: the caller loads the session before and saves it after.
//!
//! Priority order within a turn:
//!
//! 1. A reset command clears the session and greets.
//! 2. A pending question takes the message as its answer. If more questions are queued the
//!    next one is asked; otherwise the turn continues with step 3.
//! 3. Symptoms are extracted and merged. If any are new, the follow-ups of the most recently
//!    added one are queued and the first is asked.
//! 4. Otherwise the turn ends in a summary.

use crate::constants::RESET_COMMANDS;
use crate::intent::Intent;
use crate::matching::SymptomMatcher;
use crate::safety;
use crate::session::Session;
use crate::tables::ClinicalTables;
use std::sync::Arc;

/// What a turn resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The session was reset.
    Greeting,
    /// A follow-up question, now pending.
    Question(String),
    /// Nothing left to ask; summarise the session.
    Summary(SummaryRequest),
}

/// Signals from the current message that shape the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryRequest {
    pub intent: Intent,
    pub emergency: bool,
}

#[derive(Debug, Clone)]
pub struct Dialogue {
    tables: Arc<ClinicalTables>,
    matcher: SymptomMatcher,
}

impl Dialogue {
    pub fn new(tables: Arc<ClinicalTables>) -> Self {
        Self {
            matcher: SymptomMatcher::new(tables.clone()),
            tables,
        }
    }

    pub fn matcher(&self) -> &SymptomMatcher {
        &self.matcher
    }

    /// Returns `true` if `message` asks for a session reset.
    pub fn is_reset_command(message: &str) -> bool {
        let normalised = message.trim().to_lowercase();
        RESET_COMMANDS.contains(&normalised.as_str())
    }

    /// Applies `message` to `session` and decides the bot's next action.
    pub fn advance(&self, session: &mut Session, message: &str) -> TurnOutcome {
        if Self::is_reset_command(message) {
            session.reset();
            return TurnOutcome::Greeting;
        }

        if let Some(question) = session.take_pending() {
            session.record_answer(question, message.to_string());
            if let Some(next) = session.ask_next() {
                return TurnOutcome::Question(next);
            }
        }

        let intent = Intent::classify(message);
        let emergency = safety::is_emergency(message, self.tables.emergency_keywords());

        let mut newest = None;
        for symptom in self.matcher.extract(message) {
            if session.add_symptom(symptom.clone()) {
                newest = Some(symptom);
            }
        }

        if let Some(main) = newest {
            tracing::debug!(symptom = %main, "queueing follow-ups");
            session.queue_followups(self.tables.followups_for(&main));
            if let Some(first) = session.ask_next() {
                return TurnOutcome::Question(first);
            }
        }

        TurnOutcome::Summary(SummaryRequest { intent, emergency })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;
    use crate::symptom::Symptom;

    fn dialogue() -> Dialogue {
        Dialogue::new(Arc::new(ClinicalTables::builtin().unwrap()))
    }

    fn question(outcome: TurnOutcome) -> String {
        match outcome {
            TurnOutcome::Question(q) => q,
            other => panic!("expected a question, got {other:?}"),
        }
    }

    #[test]
    fn test_reset_commands() {
        for cmd in ["reset", "  START OVER ", "Clear"] {
            assert!(Dialogue::is_reset_command(cmd), "{cmd}");
        }
        assert!(!Dialogue::is_reset_command("reset my session please"));
    }

    #[test]
    fn test_reset_clears_any_state() {
        let d = dialogue();
        let mut session = Session::new();
        d.advance(&mut session, "I have a headache");
        assert_eq!(session.state(), SessionState::AwaitingAnswer);

        assert_eq!(d.advance(&mut session, "reset"), TurnOutcome::Greeting);
        assert_eq!(session, Session::new());
        assert_eq!(session.state(), SessionState::Fresh);
    }

    #[test]
    fn test_new_symptoms_ask_about_most_recent() {
        let d = dialogue();
        let mut session = Session::new();
        let q = question(d.advance(&mut session, "My head is hurting and I feel weak"));

        assert_eq!(q, "How long have you been feeling fatigued?");
        assert_eq!(
            session.symptoms(),
            &[Symptom::new("headache"), Symptom::new("fatigue")]
        );
        assert_eq!(session.pending_question(), Some(q.as_str()));
        assert_eq!(session.followups().len(), 2);
    }

    #[test]
    fn test_answers_walk_the_queue_then_summarise() {
        let d = dialogue();
        let mut session = Session::new();

        let q1 = question(d.advance(&mut session, "I have a headache"));
        assert_eq!(q1, "How long have you had your headache?");
        let q2 = question(d.advance(&mut session, "2 days"));
        assert_eq!(q2, "On a scale of 1-10, how severe is your headache?");
        let q3 = question(d.advance(&mut session, "5"));
        assert_eq!(q3, "Are you also experiencing any nausea or vision changes?");

        let outcome = d.advance(&mut session, "no");
        assert_eq!(
            outcome,
            TurnOutcome::Summary(SummaryRequest {
                intent: Intent::SymptomReport,
                emergency: false,
            })
        );
        assert_eq!(session.state(), SessionState::Diagnosing);
        assert_eq!(session.answers().len(), 3);
        assert_eq!(session.answers()[0].answer, "2 days");
        assert_eq!(session.answers()[2].answer, "no");
    }

    #[test]
    fn test_last_answer_with_new_symptom_starts_new_followups() {
        let d = dialogue();
        let mut session = Session::new();
        d.advance(&mut session, "I have a cough");
        d.advance(&mut session, "3 days");

        let q = question(d.advance(&mut session, "8, and I have a fever too"));
        assert_eq!(q, "How long have you had your fever?");
        assert_eq!(session.answers().len(), 2);
        assert_eq!(
            session.symptoms(),
            &[Symptom::new("cough"), Symptom::new("fever")]
        );
    }

    #[test]
    fn test_known_symptom_goes_straight_to_summary() {
        let d = dialogue();
        let mut session = Session::new();
        session.add_symptom(Symptom::new("headache"));

        let outcome = d.advance(&mut session, "what can i do for my headache");
        assert_eq!(
            outcome,
            TurnOutcome::Summary(SummaryRequest {
                intent: Intent::RemedyRequest,
                emergency: false,
            })
        );
    }

    #[test]
    fn test_no_symptoms_summarises_from_fresh() {
        let d = dialogue();
        let mut session = Session::new();
        assert!(matches!(
            d.advance(&mut session, "hello"),
            TurnOutcome::Summary(_)
        ));
        assert_eq!(session.state(), SessionState::Fresh);
    }

    #[test]
    fn test_emergency_flag_comes_from_current_message() {
        let d = dialogue();
        let mut session = Session::new();
        session.add_symptom(Symptom::new("chest pain"));

        let outcome = d.advance(&mut session, "I have chest pain and can't breathe");
        assert_eq!(
            outcome,
            TurnOutcome::Summary(SummaryRequest {
                intent: Intent::SymptomReport,
                emergency: true,
            })
        );
    }

    #[test]
    fn test_symptom_list_never_duplicates() {
        let d = dialogue();
        let mut session = Session::new();
        for msg in ["I have a headache", "headache", "my head hurts", "headache again"] {
            d.advance(&mut session, msg);
        }
        assert_eq!(session.symptoms(), &[Symptom::new("headache")]);
    }
}
