//! Main repollo crate: an embeddable, thread-safe keyed document store.
//!
//! This crate is the entry point for users of repollo. It re-exports the core types
//! and the in-memory collection from the sub-crates.
//!
//! # Features
//!
//! - **Typed collections** - One collection stores one document type, keyed by string
//! - **Change events** - Every create, update and delete is announced on a bounded,
//!   best-effort event stream
//! - **Chainable queries** - Filter inside the collection, then sort, offset, limit or
//!   paginate the detached snapshot
//! - **Safe shutdown** - Closing waits for in-flight event deliveries before ending the stream
//!
//! # Quick Start
//!
//! ```ignore
//! use repollo::prelude::*;
//!
//! #[derive(Debug, Clone)]
//! pub struct User {
//!     pub name: String,
//!     pub age: u32,
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let users = Collection::<User>::new("users");
//!     let events = users.events();
//!
//!     let watcher = tokio::spawn(async move {
//!         while let Some(event) = events.recv().await {
//!             println!("{} {}", event.kind, event.key);
//!         }
//!     });
//!
//!     users.create("1", User { name: "Alice".into(), age: 25 }).await.unwrap();
//!     users.create("2", User { name: "Bob".into(), age: 30 }).await.unwrap();
//!
//!     let page = users
//!         .filter(|u| u.age > 18)
//!         .await
//!         .sort(|a, b| a.name < b.name)
//!         .offset(0)
//!         .limit(10)
//!         .results();
//!
//!     println!("Queried users: {:?}", page);
//!
//!     // Ends the event stream once pending deliveries have finished
//!     users.close().await;
//!     watcher.await.unwrap();
//! }
//! ```
//!
//! # Delivery Guarantees
//!
//! Events are best effort. When the event channel is full the event is dropped and a
//! warning is logged through `tracing`; the mutation itself always succeeds. Events
//! from different mutations may arrive in any order.

pub mod prelude;

pub use repollo_core::{config, error, event, page, query};

/// In-memory collection implementation.
pub mod memory {
    pub use repollo_memory::{Collection, CollectionBuilder, Publisher};
}
