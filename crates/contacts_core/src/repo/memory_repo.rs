//! In-memory storage gateway keyed by id.
//!
//! Same contract as the SQLite gateway, without a file. Ids come from a
//! counter that only moves forward, so deleted ids are never handed out again.

use super::feed::{ContactFeed, SnapshotPublisher};
use super::{ContactRepository, StorageFailure, StorageResult};
use crate::model::contact::{Contact, ContactId, NewContact};
use log::debug;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryContactRepository {
    state: Mutex<MemoryState>,
    publisher: SnapshotPublisher,
}

#[derive(Default)]
struct MemoryState {
    last_id: ContactId,
    rows: BTreeMap<ContactId, Contact>,
}

impl MemoryState {
    fn snapshot(&self) -> Vec<Contact> {
        self.rows.values().cloned().collect()
    }
}

impl MemoryContactRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContactRepository for MemoryContactRepository {
    fn insert(&self, draft: &NewContact) -> StorageResult<()> {
        let mut state = self.state.lock().map_err(|_| StorageFailure::LockPoisoned)?;
        state.last_id += 1;
        let id = state.last_id;
        state.rows.insert(id, draft.clone().into_contact(id));
        debug!("event=contact_insert module=memory_repo status=ok id={id}");

        self.publisher.publish(state.snapshot());
        Ok(())
    }

    fn delete(&self, contact: &Contact) -> StorageResult<()> {
        let mut state = self.state.lock().map_err(|_| StorageFailure::LockPoisoned)?;
        if state.rows.remove(&contact.id).is_none() {
            debug!(
                "event=contact_delete module=memory_repo status=skipped id={} reason=not_found",
                contact.id
            );
            return Ok(());
        }

        self.publisher.publish(state.snapshot());
        Ok(())
    }

    fn observe_all(&self) -> ContactFeed {
        self.publisher.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryContactRepository;
    use crate::model::contact::NewContact;
    use crate::repo::ContactRepository;

    #[test]
    fn ids_are_not_reused_after_deleting_the_newest_row() {
        let repo = MemoryContactRepository::new();
        repo.insert(&NewContact::new("Ada", "555-0100")).unwrap();
        repo.insert(&NewContact::new("Bob", "555-0200")).unwrap();

        let bob = repo.snapshot()[1].clone();
        repo.delete(&bob).unwrap();
        repo.insert(&NewContact::new("Cy", "555-0300")).unwrap();

        let ids: Vec<_> = repo.snapshot().iter().map(|contact| contact.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
