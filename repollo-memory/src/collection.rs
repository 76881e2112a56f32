//! In-memory keyed collection with change notification.
//!
//! A [`Collection`] stores documents of one type `T` under caller-chosen string keys.
//! All reads and writes go through a single async read-write lock, so operations are
//! linearizable. Each successful mutation schedules one best-effort [`Event`] through
//! the collection's [`Publisher`]; the mutating call returns without waiting for it.
//!
//! # Closing
//!
//! [`Collection::close`] marks the collection closed under the write lock, which also
//! stops any further event from being scheduled, then waits for every scheduled
//! delivery to finish. Once it returns the event stream has ended: readers receive
//! whatever is still buffered and then `None`.
//!
//! # Callbacks
//!
//! Predicates passed to [`Collection::find`] and [`Collection::filter`] run while the
//! lock is held. They must be quick and must not have side effects on the collection.

use std::{collections::HashMap, fmt, sync::Arc};

use mea::rwlock::RwLock;
use tokio::sync::mpsc::Sender;
use tracing::{debug, info};

use repollo_core::{
    config::CollectionConfig,
    error::{CollectionError, CollectionResult},
    event::{self, Event, EventStream},
    query::QueryResult,
};

use crate::publisher::Publisher;

struct CollectionState<T> {
    data: HashMap<String, T>,
    closed: bool,
    /// Present while the collection is open; taken on close.
    sender: Option<Sender<Event<T>>>,
}

struct CollectionInner<T> {
    name: String,
    config: CollectionConfig,
    state: RwLock<CollectionState<T>>,
    events: EventStream<T>,
    publisher: Publisher,
}

/// A thread-safe keyed store of documents of type `T`.
///
/// `Collection` is cheap to clone; clones share the same documents, event stream
/// and lifecycle.
///
/// # Example
///
/// ```ignore
/// use repollo_memory::Collection;
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct User {
///     name: String,
///     age: u32,
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let users = Collection::<User>::new("users");
///
///     users.create("1", User { name: "Alice".into(), age: 25 }).await.unwrap();
///     users.create("2", User { name: "Bob".into(), age: 30 }).await.unwrap();
///
///     let adults = users.filter(|u| u.age >= 26).await.results();
///     assert_eq!(adults.len(), 1);
///
///     users.close().await;
/// }
/// ```
pub struct Collection<T> {
    inner: Arc<CollectionInner<T>>,
}

impl<T> Collection<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates an open, empty collection with the default configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self::builder(name).build()
    }

    /// Creates a builder for a collection with custom configuration.
    pub fn builder(name: impl Into<String>) -> CollectionBuilder<T> {
        CollectionBuilder::new(name)
    }

    fn with_config(name: String, config: CollectionConfig) -> Self {
        let (sender, events) = event::channel(config.effective_event_capacity());
        let publisher = Publisher::new(name.as_str(), config.effective_max_pending_publishes());

        Self {
            inner: Arc::new(CollectionInner {
                name,
                config,
                state: RwLock::new(CollectionState {
                    data: HashMap::new(),
                    closed: false,
                    sender: Some(sender),
                }),
                events,
                publisher,
            }),
        }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.inner.config
    }

    /// Inserts `value` under a new key and returns the stored value.
    ///
    /// # Errors
    ///
    /// - [`CollectionError::CollectionClosed`] if the collection has been closed.
    /// - [`CollectionError::DocumentAlreadyExists`] if `key` is taken; the stored value
    ///   is left untouched.
    pub async fn create(&self, key: impl Into<String>, value: T) -> CollectionResult<T> {
        let key = key.into();
        let mut state = self.inner.state.write().await;
        self.ensure_open(&state)?;

        if state.data.contains_key(&key) {
            return Err(CollectionError::DocumentAlreadyExists(key, self.name().to_string()));
        }

        state.data.insert(key.clone(), value.clone());
        debug!(collection = %self.name(), key = %key, "document created");

        self.publish(&state, Event::created(key, value.clone()));
        Ok(value)
    }

    /// Returns the document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::DocumentNotFound`] if the key is absent.
    pub async fn get(&self, key: &str) -> CollectionResult<T> {
        self.inner
            .state
            .read()
            .await
            .data
            .get(key)
            .cloned()
            .ok_or_else(|| self.not_found(key))
    }

    /// Replaces the document stored under `key`.
    ///
    /// # Errors
    ///
    /// - [`CollectionError::CollectionClosed`] if the collection has been closed.
    /// - [`CollectionError::DocumentNotFound`] if the key is absent.
    pub async fn update(&self, key: &str, value: T) -> CollectionResult<()> {
        let mut state = self.inner.state.write().await;
        self.ensure_open(&state)?;

        match state.data.get_mut(key) {
            Some(slot) => *slot = value.clone(),
            None => return Err(self.not_found(key)),
        }
        debug!(collection = %self.name(), key = %key, "document updated");

        self.publish(&state, Event::updated(key, value));
        Ok(())
    }

    /// Removes the document stored under `key`.
    ///
    /// The delete event carries the removed value.
    ///
    /// # Errors
    ///
    /// - [`CollectionError::CollectionClosed`] if the collection has been closed.
    /// - [`CollectionError::DocumentNotFound`] if the key is absent.
    pub async fn delete(&self, key: &str) -> CollectionResult<()> {
        let mut state = self.inner.state.write().await;
        self.ensure_open(&state)?;

        let value = state
            .data
            .remove(key)
            .ok_or_else(|| self.not_found(key))?;
        debug!(collection = %self.name(), key = %key, "document deleted");

        self.publish(&state, Event::deleted(key, value));
        Ok(())
    }

    /// Number of documents currently stored.
    pub async fn count(&self) -> usize {
        self.inner.state.read().await.data.len()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.inner.state.read().await.data.contains_key(key)
    }

    /// Snapshot of the stored keys, in no particular order.
    pub async fn keys(&self) -> Vec<String> {
        self.inner
            .state
            .read()
            .await
            .data
            .keys()
            .cloned()
            .collect()
    }

    /// Returns some document satisfying `predicate`.
    ///
    /// Iteration order is unspecified, so with several matches any one of them may be
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::NoMatchingDocument`] if nothing matches.
    pub async fn find<F>(&self, predicate: F) -> CollectionResult<T>
    where
        F: Fn(&T) -> bool,
    {
        self.inner
            .state
            .read()
            .await
            .data
            .values()
            .find(|value| predicate(value))
            .cloned()
            .ok_or_else(|| CollectionError::NoMatchingDocument(self.name().to_string()))
    }

    /// Collects every document satisfying `predicate` into a [`QueryResult`].
    ///
    /// The snapshot is detached from the collection and in no particular order; chain
    /// [`QueryResult::sort`] before slicing it.
    pub async fn filter<F>(&self, predicate: F) -> QueryResult<T>
    where
        F: Fn(&T) -> bool,
    {
        self.inner
            .state
            .read()
            .await
            .data
            .values()
            .filter(|value| predicate(value))
            .cloned()
            .collect()
    }

    /// Returns a handle on the event stream.
    ///
    /// Handles compete: each event is received by exactly one of them.
    pub fn events(&self) -> EventStream<T> {
        self.inner.events.clone()
    }

    /// Closes the collection.
    ///
    /// Subsequent mutations fail with [`CollectionError::CollectionClosed`]; reads keep
    /// working. Returns once every event scheduled before the close has been delivered
    /// or dropped, at which point the event stream has ended. Calling it again is a
    /// no-op apart from waiting for that same drain.
    pub async fn close(&self) {
        {
            let mut state = self.inner.state.write().await;
            if !state.closed {
                state.closed = true;
                state.sender = None;
                self.inner.publisher.close();
                debug!(
                    collection = %self.name(),
                    documents = state.data.len(),
                    pending_events = self.inner.publisher.pending(),
                    "closing collection"
                );
            }
        }

        self.inner.publisher.wait().await;
        info!(
            collection = %self.name(),
            delivered = self.inner.publisher.delivered(),
            dropped = self.inner.publisher.dropped(),
            "collection closed"
        );
    }

    pub async fn is_closed(&self) -> bool {
        self.inner.state.read().await.closed
    }

    /// Number of events placed on the event channel so far.
    pub fn delivered_events(&self) -> u64 {
        self.inner.publisher.delivered()
    }

    /// Number of events dropped because the channel or the publisher was saturated.
    pub fn dropped_events(&self) -> u64 {
        self.inner.publisher.dropped()
    }

    fn ensure_open(&self, state: &CollectionState<T>) -> CollectionResult<()> {
        if state.closed {
            return Err(CollectionError::CollectionClosed(self.name().to_string()));
        }

        Ok(())
    }

    fn not_found(&self, key: &str) -> CollectionError {
        CollectionError::DocumentNotFound(key.to_string(), self.name().to_string())
    }

    /// Must be called with the write lock held so scheduling is ordered against close.
    fn publish(&self, state: &CollectionState<T>, event: Event<T>) {
        if let Some(sender) = &state.sender {
            self.inner.publisher.submit(sender, event);
        }
    }
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.inner.name)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Collection`].
///
/// # Example
///
/// ```ignore
/// use repollo_memory::Collection;
///
/// let audit = Collection::<String>::builder("audit")
///     .with_event_capacity(1024)
///     .build();
/// ```
pub struct CollectionBuilder<T> {
    name: String,
    config: CollectionConfig,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T> CollectionBuilder<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: CollectionConfig::default(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, config: CollectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.config = self.config.with_event_capacity(capacity);
        self
    }

    pub fn with_max_pending_publishes(mut self, max: usize) -> Self {
        self.config = self.config.with_max_pending_publishes(max);
        self
    }

    /// Builds an open, empty collection.
    pub fn build(self) -> Collection<T> {
        Collection::with_config(self.name, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct User {
        name: String,
        age: u32,
    }

    fn user(name: &str, age: u32) -> User {
        User { name: name.to_string(), age }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let users = Collection::new("users");
        let stored = users.create("1", user("Alice", 25)).await.unwrap();
        assert_eq!(stored, user("Alice", 25));
        assert_eq!(users.get("1").await.unwrap(), user("Alice", 25));
        assert_eq!(users.count().await, 1);
        assert!(users.contains("1").await);
    }

    #[tokio::test]
    async fn test_duplicate_key_keeps_original() {
        let users = Collection::new("users");
        users.create("1", user("Alice", 25)).await.unwrap();

        let err = users.create("1", user("Mallory", 99)).await.unwrap_err();
        assert_eq!(
            err,
            CollectionError::DocumentAlreadyExists("1".to_string(), "users".to_string())
        );
        assert_eq!(users.get("1").await.unwrap(), user("Alice", 25));
    }

    #[tokio::test]
    async fn test_missing_key_operations() {
        let users: Collection<User> = Collection::new("users");
        assert!(users.get("x").await.unwrap_err().is_not_found());
        assert!(users.update("x", user("A", 1)).await.unwrap_err().is_not_found());
        assert!(users.delete("x").await.unwrap_err().is_not_found());
        assert!(users.find(|_| true).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let users = Collection::new("users");
        users.create("1", user("Alice", 25)).await.unwrap();
        users.update("1", user("Alice", 26)).await.unwrap();
        assert_eq!(users.get("1").await.unwrap().age, 26);

        users.delete("1").await.unwrap();
        assert_eq!(users.count().await, 0);
        assert!(users.keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_events_carry_values() {
        let users = Collection::new("users");
        users.create("1", user("Alice", 25)).await.unwrap();
        users.close().await;

        let events = users.events().drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, event::EventKind::Create);
        assert_eq!(events[0].value, user("Alice", 25));
    }

    #[tokio::test]
    async fn test_delete_event_has_removed_value() {
        let users = Collection::new("users");
        users.create("1", user("Alice", 25)).await.unwrap();
        let events = users.events();
        users.delete("1").await.unwrap();
        users.close().await;

        let mut seen = events.drain();
        seen.sort_by_key(|e| e.kind.as_str());
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].kind, event::EventKind::Create);
        assert_eq!(seen[1].kind, event::EventKind::Delete);
        assert_eq!(seen[1].value, user("Alice", 25));
    }

    #[tokio::test]
    async fn test_closed_rejects_mutations_but_allows_reads() {
        let users = Collection::new("users");
        users.create("1", user("Alice", 25)).await.unwrap();
        users.close().await;

        assert!(users.is_closed().await);
        assert!(users.create("2", user("Bob", 30)).await.unwrap_err().is_closed());
        assert!(users.update("1", user("Alice", 26)).await.unwrap_err().is_closed());
        assert!(users.delete("1").await.unwrap_err().is_closed());

        assert_eq!(users.get("1").await.unwrap().age, 25);
        assert_eq!(users.count().await, 1);
        assert_eq!(users.find(|u| u.age == 25).await.unwrap().name, "Alice");
        assert_eq!(users.filter(|_| true).await.len(), 1);
    }

    #[tokio::test]
    async fn test_close_twice() {
        let users: Collection<User> = Collection::new("users");
        users.close().await;
        users.close().await;
        assert!(users.events().recv().await.is_none());
    }

    #[tokio::test]
    async fn test_builder_config() {
        let users: Collection<User> = Collection::builder("users")
            .with_event_capacity(2)
            .with_max_pending_publishes(8)
            .build();
        assert_eq!(users.name(), "users");
        assert_eq!(users.config().event_capacity, 2);
        assert_eq!(users.config().max_pending_publishes, 8);
    }
}
