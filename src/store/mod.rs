// src/store/mod.rs

//! Seen-set persistence.
//!
//! The store is the durable record of every listing that has been
//! notified. It exclusively owns the `listings` table; identity
//! uniqueness is enforced at the storage layer.

pub mod sqlite;

use async_trait::async_trait;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::models::{Listing, SeenListing};

/// Trait for seen-set storage backends.
#[async_trait]
pub trait SeenStore: Send + Sync {
    /// Check whether an identity has been seen before.
    async fn has(&self, identity: &str) -> Result<bool>;

    /// Insert a listing keyed by its identity.
    ///
    /// Returns `true` if newly inserted, `false` if the identity already
    /// existed. A duplicate insert is an expected outcome, never an
    /// error, and never creates a second row.
    async fn add(&self, listing: &Listing) -> Result<bool>;

    /// Refresh the last-checked timestamp without touching first-seen.
    async fn touch(&self, identity: &str) -> Result<()>;

    /// Total number of tracked listings.
    async fn count(&self) -> Result<i64>;

    /// All tracked listings, most recently first-seen first.
    async fn all(&self) -> Result<Vec<SeenListing>>;

    /// Delete listings first seen more than `days` ago.
    ///
    /// Returns the number of rows removed. Maintenance only; callers log
    /// failures instead of propagating them into the poll cycle.
    async fn purge_older_than(&self, days: i64) -> Result<u64>;
}
