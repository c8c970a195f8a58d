// src/pipeline/cycle.rs

//! One poll cycle over every configured source.

use crate::identity::identity_of;
use crate::notify::Notify;
use crate::sources::Source;
use crate::store::SeenStore;

/// Summary of one poll cycle.
#[derive(Debug, Default)]
pub struct CycleOutcome {
    /// Newly observed (and notified) listings
    pub new_listings: usize,
    /// Listings returned by sources, new or not
    pub records_total: usize,
    /// Sources whose scrape call failed outright
    pub source_failures: usize,
}

/// Run one cycle: scrape every source in order, deduplicate, persist and
/// notify new listings.
///
/// A failing source is logged and skipped; the cycle always completes
/// and returns an outcome, even if every source failed. Notification
/// failure after a successful insert is logged and swallowed — the
/// listing stays seen, there is no re-notify retry.
pub async fn run_cycle(
    sources: &[Box<dyn Source>],
    store: &dyn SeenStore,
    notifier: &dyn Notify,
    dry_run: bool,
) -> CycleOutcome {
    let mut outcome = CycleOutcome::default();

    for source in sources {
        log::info!("Checking {}", source.name());

        let listings = match source.scrape().await {
            Ok(listings) => listings,
            Err(error) => {
                log::error!("Error checking {}: {}", source.name(), error);
                outcome.source_failures += 1;
                continue;
            }
        };

        outcome.records_total += listings.len();

        for listing in listings {
            let identity = identity_of(&listing);

            let seen = match store.has(&identity).await {
                Ok(seen) => seen,
                Err(error) => {
                    log::error!("Seen-set lookup failed for {}: {}", identity, error);
                    continue;
                }
            };

            if seen {
                if let Err(error) = store.touch(&identity).await {
                    log::warn!("Failed to refresh {}: {}", identity, error);
                }
                continue;
            }

            match store.add(&listing).await {
                Ok(true) => {}
                Ok(false) => {
                    // Lost a check-then-insert race; treat as already seen
                    log::debug!("Listing raced into the seen-set: {}", identity);
                    continue;
                }
                Err(error) => {
                    log::error!("Failed to persist {}: {}", identity, error);
                    continue;
                }
            }

            log::info!("New listing found: {}", identity);

            if dry_run {
                log::info!("DRY RUN: suppressing notification for {}", identity);
            } else if let Err(error) = notifier.notify(&listing).await {
                log::error!("Notification failed for {}: {}", identity, error);
            }

            outcome.new_listings += 1;
        }
    }

    outcome
}
