//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services.
//! Nothing in this crate reads environment variables during request handling; binaries read
//! them and hand the raw values to the helpers here.

use crate::constants::{DEFAULT_DATABASE_FILE, IN_MEMORY_DATABASE};
use crate::error::{TriageError, TriageResult};
use crate::store::SqliteStore;
use crate::tables::ClinicalTables;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where the SQLite database lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// A private database that disappears with the process.
    InMemory,
    File(PathBuf),
}

impl DatabaseLocation {
    /// Interprets an optional configuration value.
    ///
    /// Missing or blank values select [`DEFAULT_DATABASE_FILE`]; `:memory:` selects an
    /// in-memory database.
    pub fn from_env_value(value: Option<String>) -> Self {
        let value = value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        match value.as_deref() {
            None => DatabaseLocation::File(PathBuf::from(DEFAULT_DATABASE_FILE)),
            Some(IN_MEMORY_DATABASE) => DatabaseLocation::InMemory,
            Some(path) => DatabaseLocation::File(PathBuf::from(path)),
        }
    }
}

impl std::fmt::Display for DatabaseLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseLocation::InMemory => f.write_str(IN_MEMORY_DATABASE),
            DatabaseLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    database: DatabaseLocation,
    tables: Arc<ClinicalTables>,
}

impl CoreConfig {
    pub fn new(database: DatabaseLocation, tables: ClinicalTables) -> Self {
        Self {
            database,
            tables: Arc::new(tables),
        }
    }

    pub fn database(&self) -> &DatabaseLocation {
        &self.database
    }

    pub fn tables(&self) -> Arc<ClinicalTables> {
        self.tables.clone()
    }

    /// Opens the configured store, creating parent directories for file databases.
    ///
    /// # Errors
    ///
    /// Returns `TriageError::InvalidInput` if the parent directory cannot be created, and any
    /// error from [`SqliteStore::open`].
    pub fn open_store(&self) -> TriageResult<SqliteStore> {
        match &self.database {
            DatabaseLocation::InMemory => SqliteStore::open_in_memory(),
            DatabaseLocation::File(path) => {
                ensure_parent_dir(path)?;
                SqliteStore::open(path)
            }
        }
    }
}

fn ensure_parent_dir(path: &Path) -> TriageResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            std::fs::create_dir_all(parent).map_err(|e| {
                TriageError::InvalidInput(format!(
                    "cannot create database directory {}: {e}",
                    parent.display()
                ))
            })
        }
        _ => Ok(()),
    }
}

/// Loads the clinical tables without reading environment variables.
///
/// If `override_file` is provided it must be a readable tables document; otherwise the tables
/// embedded in the crate are used.
///
/// # Errors
///
/// Returns `TriageError::InvalidInput` if the override is not a file, and any error from
/// [`ClinicalTables::from_file`] or [`ClinicalTables::builtin`].
pub fn resolve_clinical_tables(override_file: Option<PathBuf>) -> TriageResult<ClinicalTables> {
    match override_file {
        Some(path) => {
            if !path.is_file() {
                return Err(TriageError::InvalidInput(format!(
                    "MEDBOT_TABLES_FILE override is not a file: {}",
                    path.display()
                )));
            }
            tracing::info!("loading clinical tables from {}", path.display());
            ClinicalTables::from_file(&path)
        }
        None => ClinicalTables::builtin(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_database_location_defaults_to_file() {
        assert_eq!(
            DatabaseLocation::from_env_value(None),
            DatabaseLocation::File(PathBuf::from(DEFAULT_DATABASE_FILE))
        );
        assert_eq!(
            DatabaseLocation::from_env_value(Some("   ".into())),
            DatabaseLocation::File(PathBuf::from(DEFAULT_DATABASE_FILE))
        );
    }

    #[test]
    fn test_database_location_memory_and_path() {
        assert_eq!(
            DatabaseLocation::from_env_value(Some(":memory:".into())),
            DatabaseLocation::InMemory
        );
        assert_eq!(
            DatabaseLocation::from_env_value(Some(" /tmp/x.db ".into())),
            DatabaseLocation::File(PathBuf::from("/tmp/x.db"))
        );
    }

    #[test]
    fn test_resolve_tables_without_override_uses_builtin() {
        let tables = resolve_clinical_tables(None).unwrap();
        assert_eq!(tables.canonicals().len(), 19);
    }

    #[test]
    fn test_resolve_tables_rejects_missing_override() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = resolve_clinical_tables(Some(dir.path().join("nope.yaml"))).unwrap_err();
        assert!(matches!(err, TriageError::InvalidInput(_)));
    }

    #[test]
    fn test_resolve_tables_reads_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "disclaimer: Local.\nsynonyms:\n  - canonical: rash\n    phrases: [spots]\n"
        )
        .unwrap();
        let tables = resolve_clinical_tables(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(tables.disclaimer(), "Local.");
    }

    #[test]
    fn test_open_store_creates_parent_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let db_path = dir.path().join("nested").join("medbot.db");
        let cfg = CoreConfig::new(
            DatabaseLocation::File(db_path.clone()),
            ClinicalTables::builtin().unwrap(),
        );
        cfg.open_store().unwrap();
        assert!(db_path.is_file());
    }
}
