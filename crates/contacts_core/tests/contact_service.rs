use contacts_core::{
    Contact, ContactFeed, ContactRepository, ContactService, ContactServiceError,
    ContactValidationError, MemoryContactRepository, MutationKind, NewContact, PhoneFormatPolicy,
    SnapshotPublisher, SqliteContactRepository, StorageFailure, StorageResult,
};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::{sleep, timeout};

const WAIT: Duration = Duration::from_secs(5);

async fn wait_for_len(feed: &mut ContactFeed, len: usize) -> Arc<[Contact]> {
    timeout(WAIT, async {
        loop {
            let snapshot = feed.next().await.expect("gateway alive");
            if snapshot.len() == len {
                return snapshot;
            }
        }
    })
    .await
    .expect("snapshot should arrive")
}

#[tokio::test]
async fn contacts_starts_empty_and_follows_mutations() {
    let repo = Arc::new(SqliteContactRepository::open_in_memory().unwrap());
    let service = ContactService::new(repo, &Handle::current());
    let mut feed = service.contacts();
    assert!(feed.current().is_empty());

    service.add_contact("Ada", "555-0100").unwrap();
    service.add_contact("Bob", "555-0200").unwrap();
    let both = wait_for_len(&mut feed, 2).await;
    assert_eq!(both[0].id, 1);
    assert_eq!(both[1].id, 2);

    service.delete_contact(both[0].clone()).unwrap();
    let remaining = wait_for_len(&mut feed, 1).await;
    assert_eq!(remaining[0].name, "Bob");
}

#[tokio::test]
async fn intent_calls_return_before_the_write_happens() {
    let repo = Arc::new(MemoryContactRepository::new());
    let service = ContactService::new(Arc::clone(&repo), &Handle::current());

    // Current-thread runtime: the worker cannot run until this task yields.
    service.add_contact("Ada", "555-0100").unwrap();
    assert!(repo.snapshot().is_empty());

    service.settled().await;
    assert_eq!(repo.snapshot().len(), 1);
}

#[tokio::test]
async fn blank_fields_are_rejected_before_storage() {
    let repo = Arc::new(MemoryContactRepository::new());
    let service = ContactService::new(Arc::clone(&repo), &Handle::current());
    let mut feed = service.contacts();
    feed.next().await.unwrap();

    assert_eq!(
        service.add_contact("", "555-0100"),
        Err(ContactServiceError::Invalid(ContactValidationError::BlankName))
    );
    assert_eq!(
        service.add_contact("Ada", " "),
        Err(ContactServiceError::Invalid(
            ContactValidationError::BlankPhoneNumber
        ))
    );

    service.settled().await;
    assert!(repo.snapshot().is_empty());
    assert!(timeout(Duration::from_millis(50), feed.next()).await.is_err());
}

#[tokio::test]
async fn stricter_policy_is_pluggable() {
    let repo = Arc::new(MemoryContactRepository::new());
    let service =
        ContactService::with_policy(repo, &Handle::current(), Box::new(PhoneFormatPolicy));

    assert!(matches!(
        service.add_contact("Ada", "not a number"),
        Err(ContactServiceError::Invalid(
            ContactValidationError::InvalidPhoneNumber(_)
        ))
    ));
    assert!(service.add_contact("Ada", "+1 555 0100").is_ok());
}

#[tokio::test]
async fn deleting_an_absent_contact_reports_no_failure() {
    let repo = Arc::new(MemoryContactRepository::new());
    let service = ContactService::new(repo, &Handle::current());
    let mut failures = service.failures();

    service
        .delete_contact(NewContact::new("Ghost", "000").into_contact(7))
        .unwrap();
    service.settled().await;

    assert!(failures.try_recv().is_err());
}

struct FailingRepository {
    publisher: SnapshotPublisher,
}

impl ContactRepository for FailingRepository {
    fn insert(&self, _draft: &NewContact) -> StorageResult<()> {
        Err(StorageFailure::from(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_IOERR),
            Some("disk I/O error".to_string()),
        )))
    }

    fn delete(&self, _contact: &Contact) -> StorageResult<()> {
        Ok(())
    }

    fn observe_all(&self) -> ContactFeed {
        self.publisher.subscribe()
    }
}

#[tokio::test]
async fn storage_failures_reach_failure_subscribers() {
    let repo = Arc::new(FailingRepository {
        publisher: SnapshotPublisher::new(),
    });
    let service = ContactService::new(repo, &Handle::current());
    let mut failures = service.failures();

    service.add_contact("Ada", "555-0100").unwrap();
    let failure = timeout(WAIT, failures.recv()).await.unwrap().unwrap();
    assert_eq!(failure.kind, MutationKind::Insert);
    assert!(failure.error.to_string().contains("disk I/O error"));

    // The failed insert is fatal to that operation only.
    service.add_contact("Bob", "555-0200").unwrap();
    let second = timeout(WAIT, failures.recv()).await.unwrap().unwrap();
    assert_eq!(second.kind, MutationKind::Insert);
}

/// Blocks each insert until the test releases it.
struct GatedRepository {
    inner: MemoryContactRepository,
    started: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl ContactRepository for GatedRepository {
    fn insert(&self, draft: &NewContact) -> StorageResult<()> {
        let _ = self.started.lock().unwrap().send(());
        let _ = self.release.lock().unwrap().recv();
        self.inner.insert(draft)
    }

    fn delete(&self, contact: &Contact) -> StorageResult<()> {
        self.inner.delete(contact)
    }

    fn observe_all(&self) -> ContactFeed {
        self.inner.observe_all()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn shutdown_finishes_running_commit_and_drops_queued_ones() {
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let repo = Arc::new(GatedRepository {
        inner: MemoryContactRepository::new(),
        started: Mutex::new(started_tx),
        release: Mutex::new(release_rx),
    });
    let service = ContactService::new(Arc::clone(&repo), &Handle::current());
    let mut feed = service.contacts();

    service.add_contact("Ada", "555-0100").unwrap();
    service.add_contact("Bob", "555-0200").unwrap();
    service.add_contact("Cy", "555-0300").unwrap();
    started_rx.recv_timeout(WAIT).unwrap();

    service.shutdown();
    assert!(service.is_closed());
    assert_eq!(
        service.add_contact("Dee", "555-0400"),
        Err(ContactServiceError::Closed)
    );

    release_tx.send(()).unwrap();
    let committed = wait_for_len(&mut feed, 1).await;
    assert_eq!(committed[0].name, "Ada");

    sleep(Duration::from_millis(100)).await;
    assert!(started_rx.try_recv().is_err());
    assert_eq!(repo.snapshot().len(), 1);
    // Returns at once on a closed holder.
    service.settled().await;
}
