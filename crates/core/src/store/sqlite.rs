//! SQLite-backed [`TriageStore`].
//!
//! One connection is shared behind a mutex. The schema is created by numbered migrations
//! recorded in `schema_version`, so opening an existing database only applies what is new.
//! Sessions live in `user_sessions.state` as a single JSON document.

use super::{
    Condition, ConversationEntry, NewCondition, NewRemedy, NewSymptomReference, Remedy,
    SeverityLevel, SymptomReference, TriageStore,
};
use crate::error::{TriageError, TriageResult};
use crate::session::Session;
use chrono::{DateTime, Utc};
use medbot_types::UserId;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

const MIGRATIONS: &[(i64, &str)] = &[
    (1, include_str!("../../migrations/001_initial.sql")),
    (2, include_str!("../../migrations/002_symptom_reference.sql")),
];

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Opens (or creates) the database file at `path` and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns `TriageError::Database` if the file cannot be opened and
    /// `TriageError::MigrationFailed` if a migration does not apply.
    pub fn open(path: &Path) -> TriageResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> TriageResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> TriageResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> TriageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| TriageError::StoreLockPoisoned)
    }
}

fn run_migrations(conn: &Connection) -> TriageResult<()> {
    let current = current_version(conn);
    for (version, sql) in MIGRATIONS {
        if *version > current {
            tracing::info!("Running migration v{version}");
            conn.execute_batch(sql)
                .map_err(|e| TriageError::MigrationFailed {
                    version: *version,
                    reason: e.to_string(),
                })?;
        }
    }
    Ok(())
}

/// Current schema version, or 0 for a new database.
fn current_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, Option<i64>>(0)
    })
    .ok()
    .flatten()
    .unwrap_or(0)
}

fn upsert_session(conn: &Connection, user_id: &UserId, session: &Session) -> TriageResult<()> {
    conn.execute(
        "INSERT INTO user_sessions (user_id, state, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(user_id) DO UPDATE SET state = excluded.state, updated_at = excluded.updated_at",
        params![user_id.as_str(), session.encode()?, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

fn insert_conversation(conn: &Connection, entry: &ConversationEntry) -> TriageResult<()> {
    conn.execute(
        "INSERT INTO conversations (id, user_id, messages, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            entry.id.to_string(),
            entry.user_id,
            entry.messages,
            entry.created_at.to_rfc3339()
        ],
    )?;
    Ok(())
}

fn parse_timestamp(raw: &str) -> TriageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(TriageError::InvalidTimestamp)
}

impl TriageStore for SqliteStore {
    fn load_session(&self, user_id: &UserId) -> TriageResult<Session> {
        let conn = self.conn()?;
        let stored: Option<String> = conn
            .query_row(
                "SELECT state FROM user_sessions WHERE user_id = ?1",
                params![user_id.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        match stored {
            Some(raw) => {
                tracing::debug!(user_id = %user_id, "loaded session");
                Ok(Session::decode(&raw))
            }
            None => {
                let session = Session::new();
                conn.execute(
                    "INSERT INTO user_sessions (user_id, state, updated_at) VALUES (?1, ?2, ?3)",
                    params![user_id.as_str(), session.encode()?, Utc::now().to_rfc3339()],
                )?;
                tracing::debug!(user_id = %user_id, "created session");
                Ok(session)
            }
        }
    }

    fn append_conversation(&self, entry: &ConversationEntry) -> TriageResult<()> {
        insert_conversation(&*self.conn()?, entry)
    }

    fn record_turn(
        &self,
        user_id: &UserId,
        session: &Session,
        entry: &ConversationEntry,
    ) -> TriageResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        upsert_session(&tx, user_id, session)?;
        insert_conversation(&tx, entry)?;
        tx.commit()?;
        Ok(())
    }

    fn conversations(&self, user_id: &UserId) -> TriageResult<Vec<ConversationEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, messages, created_at FROM conversations
             WHERE user_id = ?1 ORDER BY seq",
        )?;
        let rows = stmt.query_map(params![user_id.as_str()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, user_id, messages, created_at) = row?;
            entries.push(ConversationEntry {
                id: Uuid::parse_str(&id).map_err(TriageError::InvalidIdentifier)?,
                user_id,
                messages,
                created_at: parse_timestamp(&created_at)?,
            });
        }
        Ok(entries)
    }

    fn list_conditions(&self) -> TriageResult<Vec<Condition>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, description, severity_level FROM conditions ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut conditions = Vec::new();
        for row in rows {
            let (id, name, description, severity) = row?;
            conditions.push(Condition {
                id,
                name,
                description,
                severity_level: severity.parse::<SeverityLevel>()?,
            });
        }
        Ok(conditions)
    }

    fn remedies_for(&self, condition_id: i64) -> TriageResult<Vec<Remedy>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, condition_id, remedy_text, safety_notes FROM remedies
             WHERE condition_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![condition_id], |row| {
            Ok(Remedy {
                id: row.get(0)?,
                condition_id: row.get(1)?,
                remedy_text: row.get(2)?,
                safety_notes: row.get(3)?,
            })
        })?;
        let remedies = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(remedies)
    }

    fn upsert_condition(&self, condition: &NewCondition) -> TriageResult<i64> {
        let name = condition.name.trim();
        if name.is_empty() {
            return Err(TriageError::InvalidInput(
                "condition name cannot be empty".into(),
            ));
        }

        let conn = self.conn()?;
        let id = conn.query_row(
            "INSERT INTO conditions (name, description, severity_level) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET description = excluded.description,
                                             severity_level = excluded.severity_level
             RETURNING id",
            params![
                name,
                condition.description,
                condition.severity_level.as_str()
            ],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(id)
    }

    fn add_remedy(&self, condition_id: i64, remedy: &NewRemedy) -> TriageResult<i64> {
        if remedy.remedy_text.trim().is_empty() {
            return Err(TriageError::InvalidInput("remedy text cannot be empty".into()));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO remedies (condition_id, remedy_text, safety_notes) VALUES (?1, ?2, ?3)",
            params![condition_id, remedy.remedy_text, remedy.safety_notes],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn add_symptom_reference(&self, symptom: &NewSymptomReference) -> TriageResult<bool> {
        let name = symptom.name.trim().to_lowercase();
        if name.is_empty() {
            return Err(TriageError::InvalidInput(
                "symptom name cannot be empty".into(),
            ));
        }

        let inserted = self.conn()?.execute(
            "INSERT INTO symptoms (name, body_part, severity_indicators) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO NOTHING",
            params![name, symptom.body_part, symptom.severity_indicators],
        )?;
        Ok(inserted == 1)
    }

    fn symptom_references(&self) -> TriageResult<Vec<SymptomReference>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, body_part, severity_indicators FROM symptoms ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(SymptomReference {
                id: row.get(0)?,
                name: row.get(1)?,
                body_part: row.get(2)?,
                severity_indicators: row.get(3)?,
            })
        })?;
        let symptoms = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(symptoms)
    }
}
