//! Ceasefire record store
//!
//! An end-of-war ceasefire (EoWCF) excludes a kingdom from fighting
//! penalties for a fixed window after a war ends. Records are created in
//! pairs, one per side, with identical windows. Overlap against open
//! windows is checked at creation time by the detector, not continuously
//! enforced here.

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::types::Loc;

/// One kingdom's ceasefire window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CeasefireRecord {
    pub id: Uuid,
    pub loc: Loc,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub detected_at: DateTime<Utc>,
    pub reason: String,
}

impl CeasefireRecord {
    /// Whole game ticks (hours) until the window closes, floored.
    /// Negative once the window has expired.
    pub fn ticks_remaining(&self, reference: DateTime<Utc>) -> i64 {
        (self.end - reference).num_seconds().div_euclid(3600)
    }
}

/// Loc-indexed ceasefire records
pub struct CeasefireStore {
    by_loc: AHashMap<Loc, Vec<CeasefireRecord>>,
}

impl CeasefireStore {
    pub fn new() -> Self {
        Self {
            by_loc: AHashMap::new(),
        }
    }

    pub fn create(
        &mut self,
        loc: Loc,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        detected_at: DateTime<Utc>,
        reason: impl Into<String>,
    ) -> CeasefireRecord {
        let record = CeasefireRecord {
            id: Uuid::new_v4(),
            loc: loc.clone(),
            start,
            end,
            detected_at,
            reason: reason.into(),
        };
        self.by_loc.entry(loc).or_default().push(record.clone());
        record
    }

    /// True if any of the given kingdoms has a record still open after
    /// `after` (window end strictly later). This is the union check the
    /// detector uses for dedup: one open window on either side of a pair
    /// suppresses a fresh detection.
    pub fn exists_overlapping(&self, locs: &[&Loc], after: DateTime<Utc>) -> bool {
        locs.iter().any(|loc| {
            self.by_loc
                .get(*loc)
                .is_some_and(|records| records.iter().any(|r| r.end > after))
        })
    }

    /// The record covering `at` for one kingdom, if any.
    pub fn active_for(&self, loc: &Loc, at: DateTime<Utc>) -> Option<&CeasefireRecord> {
        self.by_loc
            .get(loc)?
            .iter()
            .find(|r| r.start <= at && at < r.end)
    }

    pub fn records_for(&self, loc: &Loc) -> &[CeasefireRecord] {
        self.by_loc.get(loc).map(|r| r.as_slice()).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &CeasefireRecord> {
        self.by_loc.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.by_loc.values().map(|r| r.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CeasefireStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn hour(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, h, 0, 0).unwrap()
    }

    fn create_window(store: &mut CeasefireStore, loc: &str, start: DateTime<Utc>) -> CeasefireRecord {
        store.create(
            Loc::from(loc),
            start,
            start + Duration::hours(96),
            start,
            "test",
        )
    }

    #[test]
    fn test_exists_overlapping_union() {
        let mut store = CeasefireStore::new();
        create_window(&mut store, "6:9", hour(0));

        let a = Loc::from("6:9");
        let b = Loc::from("8:2");
        // open window on one side suppresses the pair
        assert!(store.exists_overlapping(&[&a, &b], hour(1)));
        assert!(store.exists_overlapping(&[&b, &a], hour(1)));
        // neither side covered
        assert!(!store.exists_overlapping(&[&b], hour(1)));

        assert_eq!(store.records_for(&a).len(), 1);
        assert!(store.records_for(&b).is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_exists_overlapping_closed_window() {
        let mut store = CeasefireStore::new();
        create_window(&mut store, "6:9", hour(0));

        let a = Loc::from("6:9");
        let end = hour(0) + Duration::hours(96);
        // window end is exclusive: end > after must be strict
        assert!(!store.exists_overlapping(&[&a], end));
        assert!(store.exists_overlapping(&[&a], end - Duration::seconds(1)));
    }

    #[test]
    fn test_active_for() {
        let mut store = CeasefireStore::new();
        create_window(&mut store, "6:9", hour(0));

        let a = Loc::from("6:9");
        assert!(store.active_for(&a, hour(1)).is_some());
        assert!(store.active_for(&a, hour(0) + Duration::hours(96)).is_none());
        assert!(store.active_for(&Loc::from("8:2"), hour(1)).is_none());
    }

    #[test]
    fn test_ticks_remaining() {
        let mut store = CeasefireStore::new();
        let record = create_window(&mut store, "6:9", hour(0));

        assert_eq!(record.ticks_remaining(hour(0)), 96);
        assert_eq!(record.ticks_remaining(hour(1)), 95);
        // partial hours floor down
        assert_eq!(
            record.ticks_remaining(hour(1) + Duration::minutes(30)),
            94
        );
        // negative after expiry
        assert_eq!(
            record.ticks_remaining(hour(0) + Duration::hours(100)),
            -4
        );
    }
}
