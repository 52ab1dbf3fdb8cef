//! Chat turn orchestration.
//!
//! [`ChatService`] runs one turn per call: load the session, advance the dialogue, render the
//! reply, then save the session and append the exchange to the conversation log in one
//! transaction. Turns for the same user are serialised with a per-user lock; different users
//! never wait on each other.

use crate::composer::{self, SummaryInput};
use crate::constants::GREETING;
use crate::dialogue::{Dialogue, SummaryRequest, TurnOutcome};
use crate::error::{TriageError, TriageResult};
use crate::intent::Intent;
use crate::safety;
use crate::scoring::{score_conditions, ScoredCondition};
use crate::session::Session;
use crate::store::{Condition, ConversationEntry, Remedy, TriageStore};
use crate::symptom::Symptom;
use crate::tables::ClinicalTables;
use medbot_types::{MessageText, UserId};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// The bot's answer to one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub disclaimer: String,
}

/// A stateless reading of a single message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub symptoms: Vec<Symptom>,
    pub intent: Intent,
    pub emergency: bool,
    pub conditions: Vec<ScoredCondition>,
}

type SessionLocks = HashMap<UserId, Arc<Mutex<()>>>;

pub struct ChatService {
    store: Arc<dyn TriageStore>,
    tables: Arc<ClinicalTables>,
    dialogue: Dialogue,
    locks: Mutex<SessionLocks>,
}

impl ChatService {
    pub fn new(store: Arc<dyn TriageStore>, tables: Arc<ClinicalTables>) -> Self {
        Self {
            store,
            dialogue: Dialogue::new(tables.clone()),
            tables,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &dyn TriageStore {
        self.store.as_ref()
    }

    pub fn disclaimer(&self) -> &str {
        self.tables.disclaimer()
    }

    /// Runs one conversation turn for `user_id`.
    ///
    /// # Errors
    ///
    /// Any storage failure aborts the turn. Nothing is retried.
    pub fn chat(&self, user_id: &UserId, message: &MessageText) -> TriageResult<ChatReply> {
        let lock = self.session_lock(user_id)?;
        let response = {
            let _guard = lock
                .lock()
                .map_err(|_| TriageError::SessionLockPoisoned(user_id.to_string()))?;
            self.run_turn(user_id, message.as_str())?
        };
        self.release_lock(user_id, lock);

        Ok(ChatReply {
            response,
            disclaimer: self.tables.disclaimer().to_string(),
        })
    }

    fn run_turn(&self, user_id: &UserId, text: &str) -> TriageResult<String> {
        let mut session = self.store.load_session(user_id)?;
        tracing::debug!(user_id = %user_id, state = ?session.state(), "session loaded");

        let disclaimer = self.tables.disclaimer();
        let response = match self.dialogue.advance(&mut session, text) {
            TurnOutcome::Greeting => {
                tracing::info!(user_id = %user_id, "session reset");
                GREETING.to_string()
            }
            TurnOutcome::Question(question) => composer::question(&question, disclaimer),
            TurnOutcome::Summary(request) => self.summarise(&session, request)?,
        };

        self.store.record_turn(
            user_id,
            &session,
            &ConversationEntry::turn(user_id, text, &response),
        )?;
        tracing::info!(
            user_id = %user_id,
            symptoms = session.symptoms().len(),
            state = ?session.state(),
            "chat turn complete"
        );
        Ok(response)
    }

    fn summarise(&self, session: &Session, request: SummaryRequest) -> TriageResult<String> {
        let conditions = self.store.list_conditions()?;
        let ranked = score_conditions(session.symptoms(), &conditions);
        let top = ranked.first();
        let remedy: Option<Remedy> = match top {
            Some(scored) => self.store.remedies_for(scored.condition_id)?.into_iter().next(),
            None => None,
        };
        if let Some(scored) = top {
            tracing::debug!(
                condition = %scored.condition,
                confidence = scored.confidence,
                "top condition"
            );
        }

        let input = SummaryInput {
            symptoms: session.symptoms(),
            answers: session.answers(),
            emergency: request.emergency,
            intent: request.intent,
            top_condition: top.map(|scored| scored.condition.as_str()),
            remedy: remedy.as_ref(),
        };
        Ok(composer::summary(&input, self.tables.disclaimer()))
    }

    /// Appends a feedback entry to the conversation log.
    pub fn record_feedback(&self, user_id: &UserId, message: &MessageText) -> TriageResult<()> {
        self.store
            .append_conversation(&ConversationEntry::feedback(user_id, message.as_str()))?;
        tracing::info!(user_id = %user_id, "feedback recorded");
        Ok(())
    }

    pub fn list_conditions(&self) -> TriageResult<Vec<Condition>> {
        self.store.list_conditions()
    }

    pub fn remedies_for(&self, condition_id: i64) -> TriageResult<Vec<Remedy>> {
        self.store.remedies_for(condition_id)
    }

    pub fn conversations(&self, user_id: &UserId) -> TriageResult<Vec<ConversationEntry>> {
        self.store.conversations(user_id)
    }

    /// Reads a message without touching any session.
    pub fn analyze(&self, text: &str) -> TriageResult<Analysis> {
        let symptoms = self.dialogue.matcher().extract(text);
        let conditions = score_conditions(&symptoms, &self.store.list_conditions()?);
        Ok(Analysis {
            intent: Intent::classify(text),
            emergency: safety::is_emergency(text, self.tables.emergency_keywords()),
            symptoms,
            conditions,
        })
    }

    fn session_lock(&self, user_id: &UserId) -> TriageResult<Arc<Mutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| TriageError::SessionLockPoisoned(user_id.to_string()))?;
        Ok(locks.entry(user_id.clone()).or_default().clone())
    }

    /// Drops the map entry once no other turn holds or waits on it.
    fn release_lock(&self, user_id: &UserId, lock: Arc<Mutex<()>>) {
        if let Ok(mut locks) = self.locks.lock() {
            // One reference in the map, one here.
            if Arc::strong_count(&lock) == 2 {
                locks.remove(user_id);
            }
        }
    }
}
