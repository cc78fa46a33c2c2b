//! Bibliographic Search Module
//!
//! Resolves free-text spine queries to candidate book records.
//!
//! Backends:
//! - Google Books volumes API
//!
//! Any provider can be wrapped in [`CachedSearchProvider`] to serve repeated
//! queries from an LRU cache.

mod cache;
mod provider;
mod types;

pub use cache::CachedSearchProvider;
pub use provider::{BookSearchProvider, GoogleBooksProvider};
pub use types::{SearchError, FALLBACK_TITLE};

#[cfg(test)]
pub use provider::mock;
