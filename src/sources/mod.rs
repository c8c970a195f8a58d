// src/sources/mod.rs

//! Salvage yard source adapters.
//!
//! Each adapter owns its per-location target URLs and its own HTTP
//! session, and returns only filter-validated listings. Adapters share
//! no mutable state.

pub mod extract;

mod bucksauto;
mod ipullupull;
mod picknpull;

use async_trait::async_trait;

pub use bucksauto::BucksAuto;
pub use ipullupull::IPullUPull;
pub use picknpull::PickNPull;

use crate::error::Result;
use crate::models::{Config, Listing};

/// Contract implemented by every inventory source.
#[async_trait]
pub trait Source: Send + Sync {
    /// Scrape the source for matching listings. May be empty.
    ///
    /// Partial failure (one location URL unreachable) is handled inside
    /// the adapter; only adapter-level faults surface as errors.
    async fn scrape(&self) -> Result<Vec<Listing>>;

    /// Display name of the yard chain.
    fn name(&self) -> &'static str;
}

/// Build all configured source adapters in their fixed cycle order.
pub fn build_sources(config: &Config) -> Result<Vec<Box<dyn Source>>> {
    Ok(vec![
        Box::new(PickNPull::new(config)?),
        Box::new(IPullUPull::new(config)?),
        Box::new(BucksAuto::new(config)?),
    ])
}
