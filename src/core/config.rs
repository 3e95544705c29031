//! Runtime configuration with documented constants
//!
//! Detection thresholds and the ceasefire window length are explicit
//! parameters on the detector rather than process-wide globals, so tests
//! can vary them. Deployment settings (dump URL, webhook, cadence) come
//! from a TOML file.

use std::path::Path;

use serde::Deserialize;

use crate::core::error::{Result, WatchError};

/// Tunable parameters for war-end detection
///
/// Defaults reflect the observed shape of an end-of-war reallocation:
/// roughly symmetric land transfer of a few percent between the two sides
/// within one snapshot interval.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Minimum relative land change that counts as a reallocation (0.03 = 3%)
    ///
    /// The winner must gain at least this fraction while the loser loses at
    /// least the same fraction. Both comparisons are inclusive.
    pub land_threshold: f64,

    /// Relative honor change of interest (0.03 = 3%)
    ///
    /// Honor movement is computed and logged for every candidate pair but is
    /// NOT a gating condition. Wars can end with honor flowing against the
    /// land result, so gating on it would miss real events.
    pub honor_threshold: f64,

    /// Length of the ceasefire window in hours (one game tick = one hour)
    pub ceasefire_hours: i64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            land_threshold: 0.03,
            honor_threshold: 0.03,
            ceasefire_hours: 96,
        }
    }
}

impl DetectorConfig {
    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.land_threshold <= 0.0 {
            return Err(format!(
                "land_threshold ({}) must be positive",
                self.land_threshold
            ));
        }
        if self.honor_threshold <= 0.0 {
            return Err(format!(
                "honor_threshold ({}) must be positive",
                self.honor_threshold
            ));
        }
        if self.ceasefire_hours <= 0 {
            return Err(format!(
                "ceasefire_hours ({}) must be positive",
                self.ceasefire_hours
            ));
        }
        Ok(())
    }
}

fn default_sync_interval_secs() -> u64 {
    3600
}

/// Deployment configuration loaded from a TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// URL of the game's kingdoms dump endpoint
    pub dump_url: String,

    /// Discord webhook URL; notifications are dropped when unset
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Seconds between sync cycles (default one hour, the game tick length)
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,

    #[serde(default)]
    pub detector: DetectorConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| WatchError::Config(format!("{}: {}", path.display(), e)))?;
        config
            .detector
            .validate()
            .map_err(WatchError::Config)?;
        Ok(config)
    }
}
