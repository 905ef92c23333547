//! Contact state holder with a background mutation worker.
//!
//! # Responsibility
//! - Validate add intents through the configured `ContactPolicy`.
//! - Queue mutations and return to the caller immediately.
//! - Surface storage failures through logs and the `failures()` channel.
//!
//! # Invariants
//! - One worker drains the queue; at most one mutation is in flight.
//! - The holder never mutates records itself; every change round-trips
//!   through the gateway.
//! - After shutdown, queued mutations that have not started are discarded,
//!   while a commit already running is allowed to finish.

use crate::model::contact::{Contact, ContactValidationError, NewContact};
use crate::repo::{ContactFeed, ContactRepository, StorageFailure, StorageResult};
use crate::service::policy::{ContactPolicy, NonBlankPolicy};
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task;

const FAILURE_CHANNEL_CAPACITY: usize = 16;

/// Mutation kinds reported with failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Insert,
    Delete,
}

impl MutationKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Delete => "delete",
        }
    }
}

/// A queued mutation that failed in storage.
#[derive(Debug, Clone)]
pub struct MutationFailure {
    pub kind: MutationKind,
    pub error: Arc<StorageFailure>,
}

/// Errors returned synchronously by intent calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactServiceError {
    /// Draft rejected by the validation policy; nothing was queued.
    Invalid(ContactValidationError),
    /// The holder's lifecycle has ended.
    Closed,
}

impl Display for ContactServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::Closed => write!(f, "contact service is shut down"),
        }
    }
}

impl Error for ContactServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Closed => None,
        }
    }
}

impl From<ContactValidationError> for ContactServiceError {
    fn from(value: ContactValidationError) -> Self {
        Self::Invalid(value)
    }
}

enum Job {
    Insert(NewContact),
    Delete(Contact),
    Barrier(oneshot::Sender<()>),
}

/// State holder owning the gateway handle and the mutation worker.
pub struct ContactService<R: ContactRepository + 'static> {
    repo: Arc<R>,
    policy: Box<dyn ContactPolicy>,
    jobs: mpsc::UnboundedSender<Job>,
    shutdown: watch::Sender<bool>,
    failures: broadcast::Sender<MutationFailure>,
}

impl<R: ContactRepository + 'static> ContactService<R> {
    /// Starts a holder with the default non-blank policy.
    pub fn new(repo: Arc<R>, runtime: &Handle) -> Self {
        Self::with_policy(repo, runtime, Box::new(NonBlankPolicy))
    }

    /// Starts a holder whose worker runs on `runtime`.
    pub fn with_policy(repo: Arc<R>, runtime: &Handle, policy: Box<dyn ContactPolicy>) -> Self {
        let (jobs, queue) = mpsc::unbounded_channel();
        let (shutdown, stop) = watch::channel(false);
        let (failures, _) = broadcast::channel(FAILURE_CHANNEL_CAPACITY);

        runtime.spawn(run_worker(Arc::clone(&repo), queue, stop, failures.clone()));
        info!("event=contact_service_start module=service status=ok");

        Self {
            repo,
            policy,
            jobs,
            shutdown,
            failures,
        }
    }

    /// Checks a draft against the configured policy without queueing it.
    pub fn validate(&self, draft: &NewContact) -> Result<(), ContactValidationError> {
        self.policy.check(draft)
    }

    /// Validates and queues an insert. Returns before the write happens.
    ///
    /// Success only means the intent was accepted; the stored result shows
    /// up on the live sequence, and a storage failure on `failures()`.
    pub fn add_contact(
        &self,
        name: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Result<(), ContactServiceError> {
        let draft = NewContact::new(name, phone_number);
        if let Err(err) = self.policy.check(&draft) {
            debug!("event=contact_add module=service status=rejected reason={err}");
            return Err(err.into());
        }
        self.enqueue(Job::Insert(draft))
    }

    /// Queues a delete. Returns before the write happens.
    pub fn delete_contact(&self, contact: Contact) -> Result<(), ContactServiceError> {
        self.enqueue(Job::Delete(contact))
    }

    /// The gateway's live sequence, passed through.
    pub fn contacts(&self) -> ContactFeed {
        self.repo.observe_all()
    }

    /// Subscribes to storage failures of queued mutations.
    pub fn failures(&self) -> broadcast::Receiver<MutationFailure> {
        self.failures.subscribe()
    }

    /// Resolves once every mutation queued before this call has finished.
    ///
    /// Returns immediately when the holder is already shut down.
    pub async fn settled(&self) {
        let (done, wait) = oneshot::channel();
        if self.enqueue(Job::Barrier(done)).is_ok() {
            let _ = wait.await;
        }
    }

    /// Ends the holder's lifecycle. Idempotent.
    pub fn shutdown(&self) {
        if !self.shutdown.send_replace(true) {
            info!("event=contact_service_stop module=service status=requested");
        }
    }

    pub fn is_closed(&self) -> bool {
        *self.shutdown.borrow() || self.jobs.is_closed()
    }

    fn enqueue(&self, job: Job) -> Result<(), ContactServiceError> {
        if self.is_closed() {
            return Err(ContactServiceError::Closed);
        }
        self.jobs.send(job).map_err(|_| ContactServiceError::Closed)
    }
}

impl<R: ContactRepository + 'static> Drop for ContactService<R> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn run_worker<R: ContactRepository + 'static>(
    repo: Arc<R>,
    mut queue: mpsc::UnboundedReceiver<Job>,
    mut stop: watch::Receiver<bool>,
    failures: broadcast::Sender<MutationFailure>,
) {
    loop {
        // Shutdown wins over pending jobs; a job already awaited below is
        // never interrupted.
        let job = tokio::select! {
            biased;
            _ = stop.changed() => break,
            job = queue.recv() => match job {
                Some(job) => job,
                None => break,
            },
        };

        match job {
            Job::Barrier(done) => {
                let _ = done.send(());
            }
            Job::Insert(draft) => {
                run_mutation(&repo, MutationKind::Insert, &failures, move |repo| {
                    repo.insert(&draft)
                })
                .await;
            }
            Job::Delete(contact) => {
                run_mutation(&repo, MutationKind::Delete, &failures, move |repo| {
                    repo.delete(&contact)
                })
                .await;
            }
        }
    }

    queue.close();
    let mut discarded = 0usize;
    while let Ok(job) = queue.try_recv() {
        if !matches!(job, Job::Barrier(_)) {
            discarded += 1;
        }
    }
    info!("event=contact_worker_stop module=service status=ok discarded={discarded}");
}

async fn run_mutation<R, F>(
    repo: &Arc<R>,
    kind: MutationKind,
    failures: &broadcast::Sender<MutationFailure>,
    op: F,
) where
    R: ContactRepository + 'static,
    F: FnOnce(&R) -> StorageResult<()> + Send + 'static,
{
    let repo = Arc::clone(repo);
    let outcome = match task::spawn_blocking(move || op(&repo)).await {
        Ok(result) => result,
        Err(err) => Err(StorageFailure::Interrupted(err.to_string())),
    };

    match outcome {
        Ok(()) => debug!(
            "event=contact_mutation module=service status=ok op={}",
            kind.label()
        ),
        Err(err) => {
            error!(
                "event=contact_mutation module=service status=error op={} error={}",
                kind.label(),
                err
            );
            // No subscribers is fine; the error is already logged.
            let _ = failures.send(MutationFailure {
                kind,
                error: Arc::new(err),
            });
        }
    }
}
