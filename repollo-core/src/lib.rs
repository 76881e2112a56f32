//! Core types shared by every repollo collection implementation.
//!
//! This crate provides:
//!
//! - **Error handling** ([`error`]) - The collection error taxonomy and result alias
//! - **Change events** ([`event`]) - Event records, the bounded event channel and its read side
//! - **Query results** ([`query`]) - Chainable sort/offset/limit over filtered snapshots
//! - **Pagination** ([`page`]) - Page-number navigation over query results
//! - **Configuration** ([`config`]) - Per-collection tuning knobs
//!
//! # Example
//!
//! ```ignore
//! use repollo_core::{query::QueryResult, page::PaginationParams};
//!
//! let page = QueryResult::new(vec![3, 1, 2])
//!     .sort(|a, b| a < b)
//!     .paginate(PaginationParams::new(1, 2));
//!
//! assert_eq!(page.items, vec![1, 2]);
//! ```

#[allow(unused_extern_crates)]
extern crate self as repollo_core;

pub mod config;
pub mod error;
pub mod event;
pub mod page;
pub mod query;
