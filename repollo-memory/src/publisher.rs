//! Detached, tracked delivery of change events.
//!
//! Mutations hand their event to a [`Publisher`], which runs the delivery attempt as a
//! separate task so the mutating caller never waits on the event channel. Every task
//! is registered with a [`TaskTracker`]; closing the publisher and awaiting
//! [`Publisher::wait`] guarantees no delivery attempt is still running. The number of
//! outstanding tasks is bounded by a semaphore; once the bound is reached further
//! attempts run inline on the caller, which is just as non-blocking.
//!
//! Delivery is best effort. An attempt that finds the channel full drops the event,
//! logs a warning and bumps the drop counter; it is never retried. A free slot in the
//! channel always means the event is delivered.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::{
    runtime::Handle,
    sync::{
        Semaphore,
        mpsc::{Sender, error::TrySendError},
    },
};
use tokio_util::task::TaskTracker;
use tracing::{debug, trace, warn};

use repollo_core::event::Event;

#[derive(Debug, Default)]
struct PublisherStats {
    delivered: AtomicU64,
    dropped: AtomicU64,
}

/// Runs and tracks event delivery attempts for one collection.
#[derive(Debug)]
pub struct Publisher {
    collection: Arc<str>,
    tracker: TaskTracker,
    permits: Arc<Semaphore>,
    stats: Arc<PublisherStats>,
}

impl Publisher {
    /// Creates a publisher allowing at most `max_pending` detached delivery tasks at once.
    pub fn new(collection: impl Into<Arc<str>>, max_pending: usize) -> Self {
        Self {
            collection: collection.into(),
            tracker: TaskTracker::new(),
            permits: Arc::new(Semaphore::new(max_pending.max(1))),
            stats: Arc::new(PublisherStats::default()),
        }
    }

    /// Schedules a non-blocking delivery of `event` on `sender`.
    ///
    /// Returns immediately. The attempt runs inline instead of on a task when called
    /// outside a tokio runtime or when `max_pending` tasks are already outstanding;
    /// `try_send` never waits, so either way the caller is not blocked.
    pub fn submit<T>(&self, sender: &Sender<Event<T>>, event: Event<T>)
    where
        T: Send + 'static,
    {
        if Handle::try_current().is_err() {
            deliver(&self.collection, &self.stats, sender, event);
            return;
        }

        let Ok(permit) = Arc::clone(&self.permits).try_acquire_owned() else {
            trace!(collection = %self.collection, "publish tasks saturated, delivering inline");
            deliver(&self.collection, &self.stats, sender, event);
            return;
        };

        let sender = sender.clone();
        let collection = Arc::clone(&self.collection);
        let stats = Arc::clone(&self.stats);

        self.tracker.spawn(async move {
            deliver(&collection, &stats, &sender, event);
            // The sender must be gone before the tracker sees this task finish.
            drop(sender);
            drop(permit);
        });
    }

    /// Closes the tracker so [`wait`](Self::wait) completes once running attempts finish.
    pub fn close(&self) {
        self.tracker.close();
    }

    /// Returns true once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.tracker.is_closed()
    }

    /// Waits until the publisher is closed and every scheduled attempt has finished.
    pub async fn wait(&self) {
        self.tracker.wait().await;
    }

    /// Number of delivery attempts still running.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Number of events placed on the channel so far.
    pub fn delivered(&self) -> u64 {
        self.stats.delivered.load(Ordering::Relaxed)
    }

    /// Number of events dropped so far.
    pub fn dropped(&self) -> u64 {
        self.stats.dropped.load(Ordering::Relaxed)
    }
}

fn deliver<T>(collection: &str, stats: &PublisherStats, sender: &Sender<Event<T>>, event: Event<T>) {
    match sender.try_send(event) {
        Ok(()) => {
            stats.delivered.fetch_add(1, Ordering::Relaxed);
            trace!(collection = %collection, "event delivered");
        }
        Err(TrySendError::Full(event)) => {
            stats.dropped.fetch_add(1, Ordering::Relaxed);
            warn!(
                collection = %collection,
                key = %event.key,
                kind = %event.kind,
                "event channel is full, event dropped"
            );
        }
        Err(TrySendError::Closed(event)) => {
            stats.dropped.fetch_add(1, Ordering::Relaxed);
            debug!(
                collection = %collection,
                key = %event.key,
                kind = %event.kind,
                "event channel is closed, event dropped"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repollo_core::event::channel;

    #[tokio::test]
    async fn test_delivers_and_drains() {
        let publisher = Publisher::new("test", 8);
        let (sender, events) = channel::<u32>(8);

        publisher.submit(&sender, Event::created("a", 1));
        publisher.submit(&sender, Event::created("b", 2));
        drop(sender);

        assert!(!publisher.is_closed());
        publisher.close();
        assert!(publisher.is_closed());
        publisher.wait().await;

        assert_eq!(publisher.pending(), 0);
        assert_eq!(publisher.delivered(), 2);
        assert_eq!(publisher.dropped(), 0);
        assert_eq!(events.drain().len(), 2);
        assert!(events.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_full_channel_drops() {
        let publisher = Publisher::new("test", 8);
        let (sender, events) = channel::<u32>(1);

        for i in 0..3 {
            publisher.submit(&sender, Event::created(i.to_string(), i));
        }
        publisher.close();
        publisher.wait().await;

        assert_eq!(publisher.delivered(), 1);
        assert_eq!(publisher.dropped(), 2);
        assert_eq!(events.drain().len(), 1);
    }

    #[tokio::test]
    async fn test_saturated_tasks_still_deliver() {
        let publisher = Publisher::new("test", 1);
        let (sender, events) = channel::<u32>(16);

        for i in 0..10 {
            publisher.submit(&sender, Event::created(i.to_string(), i));
        }
        publisher.close();
        publisher.wait().await;

        assert_eq!(publisher.dropped(), 0);
        assert_eq!(publisher.delivered(), 10);
        assert_eq!(events.drain().len(), 10);
    }

    #[test]
    fn test_inline_without_runtime() {
        let publisher = Publisher::new("test", 1);
        let (sender, events) = channel::<u32>(4);

        publisher.submit(&sender, Event::updated("a", 1));
        publisher.submit(&sender, Event::deleted("a", 1));

        assert_eq!(publisher.delivered(), 2);
        assert_eq!(publisher.pending(), 0);
        assert_eq!(events.drain().len(), 2);
    }
}
