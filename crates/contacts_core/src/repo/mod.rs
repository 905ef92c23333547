//! Storage gateway for the contact set.
//!
//! # Responsibility
//! - Define the gateway contract: insert, delete, observe the full set.
//! - Keep SQL and in-memory storage details out of the state holder.
//!
//! # Invariants
//! - Every successful mutation publishes a fresh full-set snapshot.
//! - Snapshots are published in commit order.
//! - Deleting an id that is no longer stored is a silent no-op.

use crate::db::DbError;
use crate::model::contact::{Contact, NewContact};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod contact_repo;
pub mod feed;
pub mod memory_repo;

pub use feed::{ContactFeed, ContactSnapshot, SnapshotPublisher};

pub type StorageResult<T> = Result<T, StorageFailure>;

/// The only error class raised by the storage gateway.
///
/// None of these are retried; each is fatal to the one operation that hit it.
#[derive(Debug)]
pub enum StorageFailure {
    Db(DbError),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(String),
    /// A previous operation panicked while holding the store lock.
    LockPoisoned,
    /// The background task running the operation ended abnormally.
    Interrupted(String),
}

impl Display for StorageFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "contacts connection is not migrated: expected schema {expected_version}, found {actual_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted contact data: {message}"),
            Self::LockPoisoned => write!(f, "contact store lock poisoned"),
            Self::Interrupted(message) => write!(f, "storage operation interrupted: {message}"),
        }
    }
}

impl Error for StorageFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StorageFailure {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageFailure {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Gateway contract over the durable contact set.
pub trait ContactRepository: Send + Sync {
    /// Persists a draft, assigning a fresh id.
    fn insert(&self, draft: &NewContact) -> StorageResult<()>;

    /// Removes the stored record with `contact.id`, if any.
    fn delete(&self, contact: &Contact) -> StorageResult<()>;

    /// Subscribes to the live sequence of full-set snapshots.
    fn observe_all(&self) -> ContactFeed;

    /// Returns the most recently published snapshot.
    fn snapshot(&self) -> ContactSnapshot {
        self.observe_all().current()
    }
}
