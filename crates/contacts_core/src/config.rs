//! Core configuration built from explicit caller parameters.
//!
//! # Invariants
//! - No environment variables are read; the host passes every value.
//! - File locations must be absolute; `:memory:` selects a private
//!   in-memory database.

use crate::repo::contact_repo::SqliteContactRepository;
use crate::repo::StorageResult;
use crate::service::policy::ValidationMode;
use std::path::{Path, PathBuf};

/// Sentinel accepted by `CoreConfig::from_db_path` for an in-memory store.
pub const IN_MEMORY_DB_PATH: &str = ":memory:";

/// Where the contacts database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    InMemory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db: DbLocation,
    pub validation: ValidationMode,
}

impl CoreConfig {
    /// Builds a config from a host-provided database path.
    ///
    /// # Errors
    /// - Returns an error when `db_path` is blank or relative.
    pub fn from_db_path(db_path: &str) -> Result<Self, String> {
        Ok(Self {
            db: normalize_db_path(db_path)?,
            validation: ValidationMode::default(),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            db: DbLocation::InMemory,
            validation: ValidationMode::default(),
        }
    }

    pub fn with_validation(mut self, validation: ValidationMode) -> Self {
        self.validation = validation;
        self
    }

    /// Opens the configured store with migrations applied.
    pub fn open_repository(&self) -> StorageResult<SqliteContactRepository> {
        match &self.db {
            DbLocation::File(path) => SqliteContactRepository::open(path),
            DbLocation::InMemory => SqliteContactRepository::open_in_memory(),
        }
    }
}

fn normalize_db_path(db_path: &str) -> Result<DbLocation, String> {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return Err("db_path cannot be empty".to_string());
    }
    if trimmed == IN_MEMORY_DB_PATH {
        return Ok(DbLocation::InMemory);
    }

    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(format!("db_path must be an absolute path, got `{trimmed}`"));
    }
    Ok(DbLocation::File(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, DbLocation};
    use crate::service::policy::ValidationMode;

    #[test]
    fn from_db_path_rejects_blank_and_relative_paths() {
        let blank = CoreConfig::from_db_path("   ").expect_err("blank path must fail");
        assert!(blank.contains("empty"));

        let relative =
            CoreConfig::from_db_path("data/contacts.db").expect_err("relative path must fail");
        assert!(relative.contains("absolute"));
    }

    #[test]
    fn from_db_path_recognizes_memory_sentinel() {
        let config = CoreConfig::from_db_path(" :memory: ").expect("sentinel should parse");
        assert_eq!(config.db, DbLocation::InMemory);
        assert_eq!(config.validation, ValidationMode::NonBlank);
    }

    #[test]
    fn open_repository_creates_file_store() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("contacts.sqlite3");
        let config = CoreConfig::from_db_path(path.to_str().expect("utf-8 temp path"))
            .expect("absolute path should parse")
            .with_validation(ValidationMode::PhoneFormat);

        config.open_repository().expect("file store should open");
        assert!(path.exists());
        assert_eq!(config.validation, ValidationMode::PhoneFormat);
    }
}
