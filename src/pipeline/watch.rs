// src/pipeline/watch.rs

//! The watcher scheduling loop.
//!
//! A single task drives scheduled poll cycles, manual trigger commands
//! and the daily retention sweep. Cycles never run concurrently: a
//! command arriving mid-cycle queues on the channel and runs after the
//! in-flight cycle completes.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;

use crate::error::Result;
use crate::models::Config;
use crate::notify::Notify;
use crate::pipeline::run_cycle;
use crate::sources::Source;
use crate::store::SeenStore;

const SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Inbound command surface, consumed by the watcher loop.
pub enum Command {
    /// Run a cycle now; replies with the new-listing count.
    Check(oneshot::Sender<usize>),
    /// Report tracking status; replies with counts and static config.
    Status(oneshot::Sender<StatusReport>),
}

/// Snapshot answering a status request.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub tracked_listings: i64,
    pub active_sources: usize,
    pub poll_interval_minutes: u64,
    pub dry_run: bool,
}

/// Run the watcher loop until ctrl-c or until the command channel closes.
///
/// The first poll tick fires immediately, so a cycle runs at startup;
/// the retention sweep likewise runs once at startup and then daily.
pub async fn run_watcher(
    config: &Config,
    sources: Vec<Box<dyn Source>>,
    store: &dyn SeenStore,
    notifier: &dyn Notify,
    mut commands: mpsc::Receiver<Command>,
) -> Result<()> {
    let poll_interval = Duration::from_secs(config.watcher.poll_interval_minutes * 60);
    let mut poll = tokio::time::interval(poll_interval);
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut sweep = tokio::time::interval(SWEEP_INTERVAL);
    sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    log::info!(
        "Watcher started: {} sources, polling every {} minutes{}",
        sources.len(),
        config.watcher.poll_interval_minutes,
        if config.watcher.dry_run { " (dry run)" } else { "" }
    );

    loop {
        tokio::select! {
            _ = poll.tick() => {
                log::info!("Starting scheduled check of salvage yards");
                let outcome = run_cycle(&sources, store, notifier, config.watcher.dry_run).await;
                log::info!(
                    "Scheduled check complete: {} new listing(s), {} record(s), {} source failure(s)",
                    outcome.new_listings,
                    outcome.records_total,
                    outcome.source_failures
                );
            }

            _ = sweep.tick() => {
                match store.purge_older_than(config.watcher.retention_days).await {
                    Ok(removed) if removed > 0 => {
                        log::info!(
                            "Retention sweep removed {} listing(s) older than {} days",
                            removed,
                            config.watcher.retention_days
                        );
                    }
                    Ok(_) => {}
                    Err(error) => log::error!("Retention sweep failed: {}", error),
                }
            }

            command = commands.recv() => {
                match command {
                    Some(Command::Check(reply)) => {
                        log::info!("Manual check triggered");
                        let outcome =
                            run_cycle(&sources, store, notifier, config.watcher.dry_run).await;
                        let _ = reply.send(outcome.new_listings);
                    }
                    Some(Command::Status(reply)) => {
                        let tracked_listings = store.count().await.unwrap_or_else(|error| {
                            log::error!("Status count failed: {}", error);
                            0
                        });
                        let _ = reply.send(StatusReport {
                            tracked_listings,
                            active_sources: sources.len(),
                            poll_interval_minutes: config.watcher.poll_interval_minutes,
                            dry_run: config.watcher.dry_run,
                        });
                    }
                    None => {
                        log::info!("Command channel closed, stopping watcher");
                        break;
                    }
                }
            }

            _ = &mut ctrl_c => {
                log::info!("Shutdown signal received, stopping watcher");
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::models::Listing;
    use crate::store::SqliteStore;

    struct NoopNotifier;

    #[async_trait]
    impl Notify for NoopNotifier {
        async fn notify(&self, _listing: &Listing) -> Result<()> {
            Ok(())
        }
    }

    fn quiet_config() -> Config {
        let mut config = Config::default();
        // Long enough that only the immediate startup tick fires in-test
        config.watcher.poll_interval_minutes = 24 * 60;
        config.watcher.dry_run = true;
        config
    }

    #[tokio::test]
    async fn test_watcher_answers_status_and_stops_on_close() {
        let tmp = TempDir::new().unwrap();
        let store = SqliteStore::connect(tmp.path().join("test.db")).await.unwrap();
        let config = quiet_config();

        let (tx, rx) = mpsc::channel(8);
        let handle = {
            let store = store.clone();
            tokio::spawn(async move {
                run_watcher(&config, Vec::new(), &store, &NoopNotifier, rx).await
            })
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        tx.send(Command::Status(reply_tx)).await.unwrap();
        let status = reply_rx.await.unwrap();
        assert_eq!(status.tracked_listings, 0);
        assert_eq!(status.active_sources, 0);
        assert!(status.dry_run);

        let (reply_tx, reply_rx) = oneshot::channel();
        tx.send(Command::Check(reply_tx)).await.unwrap();
        assert_eq!(reply_rx.await.unwrap(), 0);

        // Closing the command surface stops the loop
        drop(tx);
        handle.await.unwrap().unwrap();
    }
}
