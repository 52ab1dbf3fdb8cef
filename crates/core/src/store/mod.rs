//! Persistence boundary.
//!
//! The chat core talks to storage only through [`TriageStore`]. It loads sessions, saves them
//! together with their log entry, appends to the conversation log, and reads the condition and remedy tables. Implementations
//! must be safe to share between request handlers; serialising turns for the same user is the
//! job of [`crate::service::ChatService`], not the store.

pub mod sqlite;

use crate::error::{TriageError, TriageResult};
use crate::session::Session;
use chrono::{DateTime, Utc};
use medbot_types::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use sqlite::SqliteStore;

/// How serious a condition is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    Mild,
    Moderate,
    Severe,
}

impl SeverityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLevel::Mild => "mild",
            SeverityLevel::Moderate => "moderate",
            SeverityLevel::Severe => "severe",
        }
    }
}

impl std::str::FromStr for SeverityLevel {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mild" => Ok(SeverityLevel::Mild),
            "moderate" => Ok(SeverityLevel::Moderate),
            "severe" => Ok(SeverityLevel::Severe),
            _ => Err(TriageError::InvalidEnum {
                field: "severity_level",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub severity_level: SeverityLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Remedy {
    pub id: i64,
    pub condition_id: i64,
    pub remedy_text: String,
    pub safety_notes: Option<String>,
}

/// Input for creating or updating a condition by name.
#[derive(Debug, Clone)]
pub struct NewCondition {
    pub name: String,
    pub description: String,
    pub severity_level: SeverityLevel,
}

#[derive(Debug, Clone)]
pub struct NewRemedy {
    pub remedy_text: String,
    pub safety_notes: Option<String>,
}

/// One immutable line of the conversation log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationEntry {
    pub id: Uuid,
    pub user_id: String,
    pub messages: String,
    pub created_at: DateTime<Utc>,
}

impl ConversationEntry {
    /// Log entry for a chat turn.
    pub fn turn(user_id: &UserId, user_text: &str, bot_text: &str) -> Self {
        Self::new(user_id, format!("USER: {user_text}\nBOT: {bot_text}"))
    }

    /// Log entry for a feedback submission.
    pub fn feedback(user_id: &UserId, text: &str) -> Self {
        Self::new(
            user_id,
            format!("{}{text}", crate::constants::FEEDBACK_LOG_PREFIX),
        )
    }

    fn new(user_id: &UserId, messages: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.as_str().to_string(),
            messages,
            created_at: Utc::now(),
        }
    }
}

/// A row of the symptom reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymptomReference {
    pub id: i64,
    pub name: String,
    pub body_part: Option<String>,
    /// Comma-separated words patients use to describe how bad it is.
    pub severity_indicators: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSymptomReference {
    pub name: String,
    pub body_part: String,
    pub severity_indicators: String,
}

/// Storage operations used by the chat core and the API layers.
pub trait TriageStore: Send + Sync {
    /// Loads the session for `user_id`, creating and persisting an empty one on first contact.
    ///
    /// Stored state that cannot be decoded yields an empty session rather than an error.
    fn load_session(&self, user_id: &UserId) -> TriageResult<Session>;

    fn append_conversation(&self, entry: &ConversationEntry) -> TriageResult<()>;

    /// Saves the session and appends the turn's log entry atomically: either both are stored
    /// or neither is.
    fn record_turn(
        &self,
        user_id: &UserId,
        session: &Session,
        entry: &ConversationEntry,
    ) -> TriageResult<()>;

    /// Conversation entries for `user_id`, oldest first.
    fn conversations(&self, user_id: &UserId) -> TriageResult<Vec<ConversationEntry>>;

    /// All conditions in a stable order.
    fn list_conditions(&self) -> TriageResult<Vec<Condition>>;

    /// Remedies for a condition, oldest first. Unknown ids yield an empty list.
    fn remedies_for(&self, condition_id: i64) -> TriageResult<Vec<Remedy>>;

    /// Inserts a condition, or updates description and severity when the name exists.
    /// Returns the condition id.
    fn upsert_condition(&self, condition: &NewCondition) -> TriageResult<i64>;

    fn add_remedy(&self, condition_id: i64, remedy: &NewRemedy) -> TriageResult<i64>;

    /// Inserts a symptom reference unless the name is already present. Returns whether a row
    /// was added.
    fn add_symptom_reference(&self, symptom: &NewSymptomReference) -> TriageResult<bool>;

    /// The symptom reference table in insertion order.
    fn symptom_references(&self) -> TriageResult<Vec<SymptomReference>>;
}

/// Reference conditions and their remedies.
pub fn reference_data() -> Vec<(NewCondition, Vec<NewRemedy>)> {
    vec![
        (
            NewCondition {
                name: "Common Cold".into(),
                description: "A viral infection causing sneezing, sore throat, and runny nose."
                    .into(),
                severity_level: SeverityLevel::Mild,
            },
            vec![NewRemedy {
                remedy_text: "Rest, drink plenty of fluids, and use saline nasal drops.".into(),
                safety_notes: Some("Consult a doctor if symptoms persist.".into()),
            }],
        ),
        (
            NewCondition {
                name: "Migraine".into(),
                description:
                    "A severe headache often accompanied by nausea and sensitivity to light."
                        .into(),
                severity_level: SeverityLevel::Moderate,
            },
            vec![NewRemedy {
                remedy_text:
                    "Rest in a dark, quiet room and use a cold compress on your forehead.".into(),
                safety_notes: Some("Seek medical attention for sudden, severe headaches.".into()),
            }],
        ),
        (
            NewCondition {
                name: "Vertigo".into(),
                description: "A sensation of spinning or dizziness, often caused by inner ear problems. Symptoms include dizziness, loss of balance, and nausea.".into(),
                severity_level: SeverityLevel::Mild,
            },
            vec![],
        ),
    ]
}

/// Seeds the reference conditions when the store has none.
///
/// Returns the number of conditions inserted (zero when the store was already populated).
///
/// # Errors
///
/// Propagates any store failure.
pub fn seed_reference_data(store: &dyn TriageStore) -> TriageResult<usize> {
    if !store.list_conditions()?.is_empty() {
        tracing::debug!("reference data already present; skipping seed");
        return Ok(0);
    }

    let data = reference_data();
    for (condition, remedies) in &data {
        let id = store.upsert_condition(condition)?;
        for remedy in remedies {
            store.add_remedy(id, remedy)?;
        }
    }
    tracing::info!(conditions = data.len(), "seeded reference conditions");
    Ok(data.len())
}

/// Common symptoms with the body part they affect and their usual descriptors.
pub fn symptom_reference_data() -> Vec<NewSymptomReference> {
    [
        ("headache", "head", "severe, throbbing, persistent"),
        ("tiredness", "general", "fatigue, exhaustion"),
        ("fatigue", "general", "weakness, low energy"),
        ("fever", "general", "high temperature, chills"),
        ("cough", "chest", "dry, productive, persistent"),
        ("sore throat", "throat", "pain, scratchy, irritation"),
        ("runny nose", "nose", "congestion, discharge"),
        ("nausea", "stomach", "queasy, urge to vomit"),
        ("vomiting", "stomach", "throwing up"),
        ("diarrhea", "stomach", "loose stools"),
        ("abdominal pain", "stomach", "cramps, discomfort"),
        ("chest pain", "chest", "pressure, tightness"),
        ("shortness of breath", "chest", "difficulty breathing"),
        ("dizziness", "head", "lightheaded, fainting"),
        ("muscle aches", "muscles", "soreness, pain"),
        ("joint pain", "joints", "stiffness, swelling"),
        ("rash", "skin", "redness, bumps, irritation"),
        ("sensitivity to light", "head", "photophobia"),
        ("loss of appetite", "general", "not hungry"),
        ("chills", "general", "shivering, cold"),
        ("congestion", "nose", "blocked nose"),
        ("sneezing", "nose", "frequent sneezing"),
        ("itchy eyes", "eyes", "irritation, redness"),
        ("blood in stool", "stomach", "rectal bleeding"),
        ("blood in urine", "urinary", "hematuria"),
        ("loss of consciousness", "head", "fainting, blackout"),
        ("severe allergic reaction", "general", "anaphylaxis, swelling, hives"),
    ]
    .into_iter()
    .map(|(name, body_part, indicators)| NewSymptomReference {
        name: name.into(),
        body_part: body_part.into(),
        severity_indicators: indicators.into(),
    })
    .collect()
}

/// Adds any missing entries of [`symptom_reference_data`]. Returns how many were inserted.
pub fn seed_symptom_references(store: &dyn TriageStore) -> TriageResult<usize> {
    let mut inserted = 0;
    for symptom in symptom_reference_data() {
        if store.add_symptom_reference(&symptom)? {
            inserted += 1;
        }
    }
    if inserted > 0 {
        tracing::info!(symptoms = inserted, "seeded symptom references");
    }
    Ok(inserted)
}
