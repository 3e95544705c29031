//! Kingdom store - latest known state per kingdom
//!
//! Kingdoms are mutated wholesale on each ingestion pass; only the most
//! recent stance is retained. History lives in the snapshot store.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, WatchError};
use crate::core::types::Loc;

/// A province as reported by the dump, owned by exactly one kingdom
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Province {
    pub loc: Loc,
    pub name: String,
    pub land: u64,
    pub race: String,
    pub honor: u64,
    pub nw: u64,
    pub protected: bool,
}

/// Latest known state of one kingdom
///
/// `stance` is free text from the dump. An active war reads `"war <loc>"`
/// with the opponent loc as the second token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kingdom {
    pub loc: Loc,
    pub name: String,
    pub stance: String,
    pub honor: u64,
    pub nw: u64,
    pub provinces: Vec<Province>,
}

/// Loc-indexed kingdom lookup
pub struct KingdomStore {
    kingdoms: AHashMap<Loc, Kingdom>,
}

impl KingdomStore {
    pub fn new() -> Self {
        Self {
            kingdoms: AHashMap::new(),
        }
    }

    /// Upsert every kingdom from one ingestion pass.
    ///
    /// A dump carrying the same loc twice is a data-integrity error and
    /// fails the whole pass before any entry is applied. Entries with an
    /// empty loc are skipped with a warning. Kingdoms absent from the dump
    /// are left untouched; nothing is ever deleted.
    pub fn ingest(&mut self, kingdoms: Vec<Kingdom>) -> Result<usize> {
        let mut seen: ahash::AHashSet<Loc> = ahash::AHashSet::new();
        for kingdom in &kingdoms {
            if kingdom.loc.is_empty() {
                continue;
            }
            if !seen.insert(kingdom.loc.clone()) {
                return Err(WatchError::DuplicateLoc(kingdom.loc.to_string()));
            }
        }

        let mut applied = 0;
        for kingdom in kingdoms {
            if kingdom.loc.is_empty() {
                tracing::warn!("skipping dump entry with empty loc: {}", kingdom.name);
                continue;
            }
            self.kingdoms.insert(kingdom.loc.clone(), kingdom);
            applied += 1;
        }
        Ok(applied)
    }

    pub fn find(&self, loc: &Loc) -> Option<&Kingdom> {
        self.kingdoms.get(loc)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Kingdom> {
        self.kingdoms.values()
    }

    pub fn locs(&self) -> impl Iterator<Item = &Loc> {
        self.kingdoms.keys()
    }

    pub fn len(&self) -> usize {
        self.kingdoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kingdoms.is_empty()
    }
}

impl Default for KingdomStore {
    fn default() -> Self {
        Self::new()
    }
}
