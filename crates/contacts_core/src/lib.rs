//! Core of the contacts app: one table, a live snapshot feed, and the
//! state holder that the mobile UI talks to.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod ui;

pub use config::{CoreConfig, DbLocation, IN_MEMORY_DB_PATH};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::contact::{Contact, ContactId, ContactValidationError, NewContact};
pub use repo::contact_repo::SqliteContactRepository;
pub use repo::memory_repo::MemoryContactRepository;
pub use repo::{
    ContactFeed, ContactRepository, ContactSnapshot, SnapshotPublisher, StorageFailure,
    StorageResult,
};
pub use service::contact_service::{
    ContactService, ContactServiceError, MutationFailure, MutationKind,
};
pub use service::policy::{ContactPolicy, NonBlankPolicy, PhoneFormatPolicy, ValidationMode};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
