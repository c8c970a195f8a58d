// src/models/mod.rs

//! Domain models for the watcher application.

mod config;
mod listing;
mod seen;

// Re-export all public types
pub use config::{
    Config, DatabaseConfig, HttpConfig, NotifierConfig, SearchConfig, WatcherConfig,
};
pub use listing::Listing;
pub use seen::SeenListing;
