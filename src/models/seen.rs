//! Persisted seen-listing row.

use serde::{Deserialize, Serialize};

/// A row from the seen-set table.
///
/// Timestamps are stored as `YYYY-MM-DD HH:MM:SS` UTC text, matching
/// SQLite's `CURRENT_TIMESTAMP` format so they order lexicographically.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SeenListing {
    /// Deduplication identity (unique key)
    pub listing_id: String,

    /// Yard chain name
    pub source: String,

    /// Yard location
    pub location: String,

    /// Model year
    pub year: Option<i64>,

    /// Vehicle make
    pub make: String,

    /// Vehicle model
    pub model: String,

    /// Yard stock number
    pub stock_number: Option<String>,

    /// Listing URL
    pub url: Option<String>,

    /// Arrival date as the source formatted it
    pub arrival_date: Option<String>,

    /// When the listing was first observed
    pub first_seen: String,

    /// When the listing was last observed
    pub last_checked: String,
}
