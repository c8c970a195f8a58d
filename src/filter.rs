// src/filter.rs

//! Listing filter predicate.

use crate::models::{Listing, SearchConfig};

/// Pure predicate deciding whether a listing matches the search profile.
///
/// All criteria must hold: year present and in range, location matching a
/// target, make containing the target token.
#[derive(Debug, Clone)]
pub struct ListingFilter {
    year_min: i32,
    year_max: i32,
    make: String,
    locations: Vec<String>,
}

impl ListingFilter {
    /// Build a filter from the search configuration.
    pub fn new(search: &SearchConfig) -> Self {
        Self {
            year_min: search.year_min,
            year_max: search.year_max,
            make: search.make.to_lowercase(),
            locations: search.locations.iter().map(|l| l.to_lowercase()).collect(),
        }
    }

    /// Check whether a listing passes every criterion.
    pub fn matches(&self, listing: &Listing) -> bool {
        self.year_in_range(listing.year)
            && self.location_matches(&listing.location)
            && self.make_matches(&listing.make)
    }

    fn year_in_range(&self, year: Option<i32>) -> bool {
        match year {
            Some(y) => self.year_min <= y && y <= self.year_max,
            None => false,
        }
    }

    fn location_matches(&self, location: &str) -> bool {
        if location.is_empty() {
            return false;
        }
        let location = location.to_lowercase();
        self.locations.iter().any(|target| location.contains(target))
    }

    fn make_matches(&self, make: &str) -> bool {
        make.to_lowercase().contains(&self.make)
    }
}
