// src/identity.rs

//! Listing identity derivation.
//!
//! The identity is the deduplication key: deterministic over a record's
//! field values and stable across repeated polls of an unchanged listing.

use crate::models::Listing;

/// Derive the deduplication identity for a listing.
///
/// The listing URL is preferred when present. Otherwise a composite of
/// source, location, year, make, model and stock number is joined with a
/// fixed separator. Two distinct listings lacking both a URL and a stock
/// number that share every remaining field collide by design.
pub fn identity_of(listing: &Listing) -> String {
    if let Some(url) = listing.url.as_deref() {
        if !url.is_empty() {
            return url.to_string();
        }
    }

    let year = listing.year.map(|y| y.to_string()).unwrap_or_default();
    [
        listing.source.as_str(),
        listing.location.as_str(),
        year.as_str(),
        listing.make.as_str(),
        listing.model.as_str(),
        listing.stock_number.as_deref().unwrap_or(""),
    ]
    .join("|")
}
