//! Change events and the stream that carries them to observers.
//!
//! Every successful mutation of a collection produces at most one [`Event`]. Events
//! travel over a bounded channel whose receiving half is wrapped in an
//! [`EventStream`]; handles to the stream can be cloned, and clones compete for
//! events rather than each receiving a copy.

use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, mpsc};

/// The kind of mutation an [`Event`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// A document was inserted under a new key.
    Create,
    /// An existing document was replaced.
    Update,
    /// A document was removed.
    Delete,
}

impl EventKind {
    /// Returns the lowercase name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Create => "create",
            EventKind::Update => "update",
            EventKind::Delete => "delete",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification describing a single mutation.
///
/// `value` holds the value after the mutation for creates and updates, and the value
/// that was removed for deletes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event<T> {
    /// What happened.
    pub kind: EventKind,
    /// The key of the affected document.
    pub key: String,
    /// The affected document.
    pub value: T,
    /// When the mutation was applied.
    pub timestamp: DateTime<Utc>,
}

impl<T> Event<T> {
    /// Creates an event stamped with the current time.
    pub fn new(kind: EventKind, key: impl Into<String>, value: T) -> Self {
        Self {
            kind,
            key: key.into(),
            value,
            timestamp: Utc::now(),
        }
    }

    /// Creates a `create` event.
    pub fn created(key: impl Into<String>, value: T) -> Self {
        Self::new(EventKind::Create, key, value)
    }

    /// Creates an `update` event carrying the new value.
    pub fn updated(key: impl Into<String>, value: T) -> Self {
        Self::new(EventKind::Update, key, value)
    }

    /// Creates a `delete` event carrying the removed value.
    pub fn deleted(key: impl Into<String>, value: T) -> Self {
        Self::new(EventKind::Delete, key, value)
    }
}

/// Creates a bounded event channel.
///
/// The sending half is handed to publishers; the receiving half is wrapped in an
/// [`EventStream`]. The stream ends once every sender has been dropped and the buffer
/// has been drained. A capacity of zero is raised to one.
pub fn channel<T>(capacity: usize) -> (mpsc::Sender<Event<T>>, EventStream<T>) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (sender, EventStream::new(receiver))
}

/// Read side of a collection's event channel.
///
/// Cloning the handle does not duplicate events: concurrent readers take turns on the
/// same receiver and each event is observed by exactly one of them.
///
/// # Example
///
/// ```ignore
/// let events = users.events();
///
/// tokio::spawn(async move {
///     while let Some(event) = events.recv().await {
///         println!("{} {}", event.kind, event.key);
///     }
/// });
/// ```
pub struct EventStream<T> {
    receiver: Arc<Mutex<mpsc::Receiver<Event<T>>>>,
}

impl<T> EventStream<T> {
    /// Wraps the receiving half of an event channel.
    pub fn new(receiver: mpsc::Receiver<Event<T>>) -> Self {
        Self {
            receiver: Arc::new(Mutex::new(receiver)),
        }
    }

    /// Waits for the next event.
    ///
    /// Returns `None` once the channel is closed and no buffered events remain.
    pub async fn recv(&self) -> Option<Event<T>> {
        self.receiver.lock().await.recv().await
    }

    /// Takes the next buffered event without waiting.
    ///
    /// Returns `None` if nothing is buffered, the channel is closed, or another reader
    /// is currently waiting on the receiver.
    pub fn try_recv(&self) -> Option<Event<T>> {
        self.receiver.try_lock().ok()?.try_recv().ok()
    }

    /// Takes every event currently buffered without waiting.
    ///
    /// Built on [`try_recv`](Self::try_recv): while another reader is parked in
    /// [`recv`](Self::recv) this returns an empty vector even if events are buffered.
    /// Use it when this handle is the only reader.
    pub fn drain(&self) -> Vec<Event<T>> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    /// Converts this handle into a [`Stream`] that ends when the channel closes.
    pub fn into_stream(self) -> impl Stream<Item = Event<T>> {
        futures::stream::unfold(self, |stream| async move {
            let event = stream.recv().await?;
            Some((event, stream))
        })
    }
}

impl<T> Clone for EventStream<T> {
    fn clone(&self) -> Self {
        Self {
            receiver: Arc::clone(&self.receiver),
        }
    }
}

impl<T> fmt::Debug for EventStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream").finish_non_exhaustive()
    }
}
