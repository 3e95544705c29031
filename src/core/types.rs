//! Core type definitions used throughout the codebase

use chrono::{DateTime, Duration, DurationRound, Utc};
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Map coordinate key identifying a kingdom or province, e.g. `"6:9"`.
///
/// Locs come verbatim from the game dump and are the join key for every
/// store lookup. They are human-readable tokens, not validated coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From)]
#[display(fmt = "{}", _0)]
pub struct Loc(String);

impl Loc {
    pub fn new(loc: impl Into<String>) -> Self {
        Self(loc.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Loc {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Truncate a timestamp to the start of its hour, in UTC.
///
/// Ceasefire windows always open on a whole game tick (one tick = one hour).
pub fn floor_to_hour(t: DateTime<Utc>) -> DateTime<Utc> {
    t.duration_trunc(Duration::hours(1)).unwrap_or(t)
}
