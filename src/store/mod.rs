//! In-memory stores for kingdoms, metric snapshots, and ceasefire records
//!
//! Everything is keyed by `Loc`. Kingdoms are the root: snapshots and
//! ceasefire records each belong to exactly one kingdom and are never
//! reparented. Nothing here is ever deleted.

pub mod ceasefires;
pub mod kingdoms;
pub mod snapshots;

pub use ceasefires::{CeasefireRecord, CeasefireStore};
pub use kingdoms::{Kingdom, KingdomStore, Province};
pub use snapshots::{KingdomSnapshot, SnapshotStore};

/// The tracked world state: all three stores together
pub struct World {
    pub kingdoms: KingdomStore,
    pub snapshots: SnapshotStore,
    pub ceasefires: CeasefireStore,
}

impl World {
    pub fn new() -> Self {
        Self {
            kingdoms: KingdomStore::new(),
            snapshots: SnapshotStore::new(),
            ceasefires: CeasefireStore::new(),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
