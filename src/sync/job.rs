//! The sync job and its scheduler loop
//!
//! One cycle: fetch the dump, ingest kingdom state, record snapshots, run
//! a detection pass. Every step shares the dump's timestamp so windows are
//! computed against game time, not local processing time. A cycle failure
//! surfaces here and the scheduler simply waits for the next interval;
//! there is no retry inside the cycle.

use chrono::{DateTime, Utc};

use crate::core::error::Result;
use crate::detect::WarEndDetector;
use crate::notify::Notify;
use crate::store::{CeasefireRecord, World};
use crate::sync::fetcher::DumpFetcher;
use crate::sync::snapshot::record_snapshots;

pub struct SyncJob {
    fetcher: DumpFetcher,
    detector: WarEndDetector,
}

impl SyncJob {
    pub fn new(fetcher: DumpFetcher, detector: WarEndDetector) -> Self {
        Self { fetcher, detector }
    }

    pub fn detector(&self) -> &WarEndDetector {
        &self.detector
    }

    /// Fetch, ingest, and snapshot. Returns the cycle timestamp.
    pub async fn sync(&self, world: &mut World) -> Result<DateTime<Utc>> {
        let dump = self.fetcher.fetch().await?;
        let at = dump.timestamp.unwrap_or_else(Utc::now);
        let ingested = world.kingdoms.ingest(dump.into_kingdoms())?;
        let snapshotted = record_snapshots(&world.kingdoms, &mut world.snapshots, at);
        tracing::info!(
            "synced {} kingdoms, {} snapshots at {}",
            ingested,
            snapshotted,
            at
        );
        Ok(at)
    }

    /// One full cycle: sync followed by a detection pass.
    pub async fn run_once<N: Notify>(
        &self,
        world: &mut World,
        notifier: &N,
    ) -> Result<Vec<CeasefireRecord>> {
        let at = self.sync(world).await?;
        Ok(self.detector.run_pass(world, notifier, at).await)
    }
}

/// Drive sync cycles at a fixed cadence until the process is stopped.
pub async fn run_scheduler<N: Notify>(
    job: &SyncJob,
    world: &mut World,
    notifier: &N,
    interval: std::time::Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        match job.run_once(world, notifier).await {
            Ok(created) => {
                if !created.is_empty() {
                    tracing::info!("cycle created {} ceasefire records", created.len());
                }
            }
            Err(e) => tracing::error!("sync cycle failed: {}", e),
        }
    }
}
