//! War-end detection
//!
//! The only nontrivial logic in the repository: compare each warring pair's
//! last two metric snapshots, classify winner and loser by land reallocation,
//! dedup against open ceasefire windows, and commit records plus a one-time
//! notification.

pub mod change;
pub mod detector;
pub mod stance;

pub use change::relative_change;
pub use detector::WarEndDetector;
pub use stance::{is_at_war, parse_opponent};
