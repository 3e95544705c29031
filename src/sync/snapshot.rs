//! Snapshot capture from current kingdom state
//!
//! Runs right after ingestion so snapshot totals and the stored kingdom
//! state describe the same dump.

use chrono::{DateTime, Utc};

use crate::store::{KingdomSnapshot, KingdomStore, SnapshotStore};

/// Append one snapshot per kingdom, totals summed over its provinces.
/// Returns the number of snapshots written.
pub fn record_snapshots(
    kingdoms: &KingdomStore,
    snapshots: &mut SnapshotStore,
    at: DateTime<Utc>,
) -> usize {
    let mut written = 0;
    for kingdom in kingdoms.iter() {
        if kingdom.loc.is_empty() {
            continue;
        }
        let total_land = kingdom.provinces.iter().map(|p| p.land).sum();
        let total_honor = kingdom.provinces.iter().map(|p| p.honor).sum();
        snapshots.append(KingdomSnapshot {
            loc: kingdom.loc.clone(),
            snapshot_time: at,
            total_land,
            total_honor,
            provinces: kingdom.provinces.clone(),
        });
        written += 1;
    }
    tracing::debug!("recorded {} kingdom snapshots at {}", written, at);
    written
}
