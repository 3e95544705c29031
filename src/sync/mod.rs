//! Dump ingestion and the periodic sync cycle
//!
//! A cycle fetches the game's kingdoms dump, upserts the latest kingdom
//! state, appends one metric snapshot per kingdom, and hands the same
//! timestamp to the detector for a pass.

pub mod dump;
pub mod fetcher;
pub mod job;
pub mod snapshot;

pub use dump::KingdomsDump;
pub use fetcher::DumpFetcher;
pub use job::{run_scheduler, SyncJob};
pub use snapshot::record_snapshots;
