//! Convenient re-exports of commonly used types from repollo.
//!
//! ```ignore
//! use repollo::prelude::*;
//! ```

pub use repollo_core::{
    config::CollectionConfig,
    error::{CollectionError, CollectionResult},
    event::{Event, EventKind, EventStream},
    page::{Page, PaginationParams},
    query::QueryResult,
};
pub use repollo_memory::{Collection, CollectionBuilder};
