//! # MedBot Core
//!
//! Core business logic for the MedBot symptom-triage assistant.
//!
//! This crate contains the conversation engine and its storage:
//! - Symptom extraction from free text (synonym phrases plus fuzzy matching)
//! - Intent classification and emergency keyword detection
//! - The per-user follow-up question state machine
//! - Condition ranking and the templated summary
//! - A SQLite-backed store for sessions, conversation logs, conditions and remedies
//!
//! **No API concerns**: HTTP servers and command line parsing belong in `api-rest` and `cli`.

pub mod composer;
pub mod config;
pub mod constants;
pub mod dialogue;
pub mod error;
pub mod intent;
pub mod matching;
pub mod safety;
pub mod scoring;
pub mod service;
pub mod session;
pub mod store;
pub mod symptom;
pub mod tables;

pub use config::{resolve_clinical_tables, CoreConfig, DatabaseLocation};
pub use error::{TriageError, TriageResult};
pub use intent::Intent;
pub use scoring::ScoredCondition;
pub use service::{Analysis, ChatReply, ChatService};
pub use session::{Answer, Session, SessionState};
pub use store::{
    seed_reference_data, seed_symptom_references, Condition, ConversationEntry, NewCondition,
    NewRemedy, NewSymptomReference, Remedy, SeverityLevel, SqliteStore, SymptomReference,
    TriageStore,
};
pub use symptom::Symptom;
pub use tables::ClinicalTables;
