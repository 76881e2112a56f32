//! In-memory collection backend for repollo.
//!
//! This crate provides the concrete, thread-safe [`Collection`] together with the
//! [`Publisher`] that delivers its change events.
//!
//! # Features
//!
//! - **Linearizable access** - One async read-write lock guards each collection's documents
//! - **Non-blocking notification** - Mutations never wait on event consumers
//! - **Clean shutdown** - `close` waits for in-flight deliveries before the event stream ends
//! - **Linear scans** - `find` and `filter` walk every document; there are no indexes
//!
//! # Quick Start
//!
//! ```ignore
//! use repollo_memory::Collection;
//!
//! #[tokio::main]
//! async fn main() {
//!     let users = Collection::<String>::new("users");
//!     let events = users.events();
//!
//!     users.create("1", "Alice".to_string()).await.unwrap();
//!     users.close().await;
//!
//!     while let Some(event) = events.recv().await {
//!         println!("{} {} {}", event.kind, event.key, event.value);
//!     }
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as repollo_memory;

pub mod collection;
pub mod publisher;

pub use collection::{Collection, CollectionBuilder};
pub use publisher::Publisher;
