//! SQLite-backed storage gateway.
//!
//! # Responsibility
//! - Own the one connection to the `contacts` table.
//! - Re-query and publish the full set after every committed mutation.
//!
//! # Invariants
//! - Connections are accepted only when fully migrated.
//! - Each statement commits on its own; no partial write is ever visible.
//! - The snapshot for a commit is published before the lock is released.

use super::feed::{ContactFeed, SnapshotPublisher};
use super::{ContactRepository, StorageFailure, StorageResult};
use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{open_db, open_db_in_memory};
use crate::model::contact::{Contact, NewContact};
use log::{debug, error};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const CONTACTS_TABLE: &str = "contacts";
const REQUIRED_COLUMNS: &[&str] = &["id", "name", "phoneNumber"];
const CONTACT_SELECT_SQL: &str = "SELECT id, name, phoneNumber FROM contacts ORDER BY id ASC;";

pub struct SqliteContactRepository {
    conn: Mutex<Connection>,
    publisher: SnapshotPublisher,
}

impl SqliteContactRepository {
    /// Wraps an already-migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not run.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema does
    ///   not match what this gateway reads and writes.
    pub fn try_new(conn: Connection) -> StorageResult<Self> {
        ensure_schema(&conn)?;

        let publisher = SnapshotPublisher::new();
        publisher.publish(load_all(&conn)?);

        Ok(Self {
            conn: Mutex::new(conn),
            publisher,
        })
    }

    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::try_new(open_db(path)?)
    }

    pub fn open_in_memory() -> StorageResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| {
            error!("event=contact_store_lock module=repo status=error error_code=lock_poisoned");
            StorageFailure::LockPoisoned
        })
    }
}

impl ContactRepository for SqliteContactRepository {
    fn insert(&self, draft: &NewContact) -> StorageResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO contacts (name, phoneNumber) VALUES (?1, ?2);",
            params![draft.name.as_str(), draft.phone_number.as_str()],
        )?;
        debug!(
            "event=contact_insert module=repo status=ok id={}",
            conn.last_insert_rowid()
        );

        self.publisher.publish(load_all(&conn)?);
        Ok(())
    }

    fn delete(&self, contact: &Contact) -> StorageResult<()> {
        let conn = self.lock()?;
        let changed = conn.execute("DELETE FROM contacts WHERE id = ?1;", [contact.id])?;

        if changed == 0 {
            debug!(
                "event=contact_delete module=repo status=skipped id={} reason=not_found",
                contact.id
            );
            return Ok(());
        }

        debug!("event=contact_delete module=repo status=ok id={}", contact.id);
        self.publisher.publish(load_all(&conn)?);
        Ok(())
    }

    fn observe_all(&self) -> ContactFeed {
        self.publisher.subscribe()
    }
}

fn ensure_schema(conn: &Connection) -> StorageResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version < expected_version {
        return Err(StorageFailure::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
        [CONTACTS_TABLE],
        |row| row.get(0),
    )?;
    if !table_exists {
        return Err(StorageFailure::MissingRequiredTable(CONTACTS_TABLE));
    }

    let mut stmt = conn.prepare("PRAGMA table_info(contacts);")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;
    for &column in REQUIRED_COLUMNS {
        if !columns.iter().any(|existing| existing == column) {
            return Err(StorageFailure::MissingRequiredColumn {
                table: CONTACTS_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn load_all(conn: &Connection) -> StorageResult<Vec<Contact>> {
    let mut stmt = conn.prepare_cached(CONTACT_SELECT_SQL)?;
    let mut rows = stmt.query([])?;
    let mut contacts = Vec::new();

    while let Some(row) = rows.next()? {
        contacts.push(parse_contact_row(row)?);
    }

    Ok(contacts)
}

fn parse_contact_row(row: &Row<'_>) -> StorageResult<Contact> {
    let id: i64 = row.get("id")?;
    if id <= 0 {
        return Err(StorageFailure::InvalidData(format!(
            "invalid id value `{id}` in contacts.id"
        )));
    }

    Ok(Contact {
        id,
        name: row.get("name")?,
        phone_number: row.get("phoneNumber")?,
    })
}
