#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to read clinical tables file: {0}")]
    TablesRead(std::io::Error),
    #[error("failed to parse clinical tables: {0}")]
    TablesParse(String),
    #[error("invalid clinical tables: {0}")]
    InvalidTables(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },
    #[error("invalid value for {field}: {value}")]
    InvalidEnum { field: &'static str, value: String },
    #[error("failed to serialize session: {0}")]
    SessionSerialization(serde_json::Error),
    #[error("failed to parse stored timestamp: {0}")]
    InvalidTimestamp(chrono::ParseError),
    #[error("failed to parse stored identifier: {0}")]
    InvalidIdentifier(uuid::Error),

    #[error("store lock poisoned")]
    StoreLockPoisoned,
    #[error("session lock poisoned for user {0}")]
    SessionLockPoisoned(String),
}

pub type TriageResult<T> = std::result::Result<T, TriageError>;
