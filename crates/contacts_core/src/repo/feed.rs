//! Live snapshot feed shared by every gateway implementation.
//!
//! A `watch` channel holds the latest full-set snapshot. New subscribers
//! start from the current value; slow subscribers skip straight to the
//! newest snapshot instead of replaying stale ones.

use crate::model::contact::Contact;
use std::sync::Arc;
use tokio::sync::watch;

/// Complete contact set as of one commit.
pub type ContactSnapshot = Arc<[Contact]>;

/// Publishing half of the live sequence, owned by a gateway.
pub struct SnapshotPublisher {
    sender: watch::Sender<ContactSnapshot>,
}

impl SnapshotPublisher {
    /// Creates a publisher whose placeholder value is the empty set.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(ContactSnapshot::from(Vec::new()));
        Self { sender }
    }

    /// Replaces the current snapshot and wakes every subscriber.
    ///
    /// Callers must publish while still holding their store lock so that
    /// snapshot order matches commit order.
    pub fn publish(&self, contacts: Vec<Contact>) {
        self.sender.send_replace(ContactSnapshot::from(contacts));
    }

    pub fn subscribe(&self) -> ContactFeed {
        ContactFeed {
            receiver: self.sender.subscribe(),
            primed: false,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SnapshotPublisher {
    fn default() -> Self {
        Self::new()
    }
}

/// One subscriber's view of the live sequence.
///
/// Dropping the feed ends only this subscription.
pub struct ContactFeed {
    receiver: watch::Receiver<ContactSnapshot>,
    primed: bool,
}

impl ContactFeed {
    /// Latest published snapshot, without waiting.
    pub fn current(&self) -> ContactSnapshot {
        Arc::clone(&self.receiver.borrow())
    }

    /// Waits for the next snapshot.
    ///
    /// The first call returns the current snapshot immediately. Later calls
    /// suspend until a new snapshot is published. Returns `None` only once
    /// the owning gateway has been dropped.
    pub async fn next(&mut self) -> Option<ContactSnapshot> {
        if !self.primed {
            self.primed = true;
            return Some(Arc::clone(&self.receiver.borrow_and_update()));
        }

        self.receiver.changed().await.ok()?;
        Some(Arc::clone(&self.receiver.borrow_and_update()))
    }
}

impl Clone for ContactFeed {
    /// Clones into an independent subscriber that starts from the current
    /// snapshot.
    fn clone(&self) -> Self {
        Self {
            receiver: self.receiver.clone(),
            primed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SnapshotPublisher;
    use crate::model::contact::NewContact;

    #[tokio::test]
    async fn new_subscriber_receives_current_snapshot_first() {
        let publisher = SnapshotPublisher::new();
        publisher.publish(vec![NewContact::new("Ada", "555-0100").into_contact(1)]);

        let mut feed = publisher.subscribe();
        let first = feed.next().await.expect("publisher is alive");
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].name, "Ada");
    }

    #[tokio::test]
    async fn feed_ends_when_publisher_is_dropped() {
        let publisher = SnapshotPublisher::new();
        let mut feed = publisher.subscribe();
        assert!(feed.next().await.expect("placeholder").is_empty());

        drop(publisher);
        assert!(feed.next().await.is_none());
    }

    #[test]
    fn dropping_a_feed_releases_only_that_subscription() {
        let publisher = SnapshotPublisher::new();
        let first = publisher.subscribe();
        let second = publisher.subscribe();
        assert_eq!(publisher.subscriber_count(), 2);

        drop(first);
        assert_eq!(publisher.subscriber_count(), 1);
        drop(second);
        assert_eq!(publisher.subscriber_count(), 0);
    }
}
