//! Metric snapshot store - append-only time series per kingdom
//!
//! One snapshot per kingdom per sync cycle, holding the aggregate metrics
//! the detector compares plus a denormalized copy of the province detail at
//! that instant. The store never deduplicates: repeated same-cycle runs
//! simply append again, and `most_recent` always answers with exactly the
//! newest entries regardless of cadence.

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::types::Loc;
use crate::store::kingdoms::Province;

/// Aggregate metrics for one kingdom at one instant, immutable once created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KingdomSnapshot {
    pub loc: Loc,
    pub snapshot_time: DateTime<Utc>,
    pub total_land: u64,
    pub total_honor: u64,
    pub provinces: Vec<Province>,
}

/// Loc-indexed snapshot series, kept in ascending time order
pub struct SnapshotStore {
    by_loc: AHashMap<Loc, Vec<KingdomSnapshot>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self {
            by_loc: AHashMap::new(),
        }
    }

    /// Append a snapshot, keeping the series sorted by snapshot time.
    pub fn append(&mut self, snapshot: KingdomSnapshot) {
        let series = self.by_loc.entry(snapshot.loc.clone()).or_default();
        series.push(snapshot);
        series.sort_by_key(|s| s.snapshot_time);
    }

    /// The `n` most recent snapshots for a kingdom, newest first.
    pub fn most_recent(&self, loc: &Loc, n: usize) -> Vec<&KingdomSnapshot> {
        match self.by_loc.get(loc) {
            Some(series) => series.iter().rev().take(n).collect(),
            None => Vec::new(),
        }
    }

    pub fn count_for(&self, loc: &Loc) -> usize {
        self.by_loc.get(loc).map_or(0, |s| s.len())
    }

    pub fn len(&self) -> usize {
        self.by_loc.values().map(|s| s.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_loc.is_empty()
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
