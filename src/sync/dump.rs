//! Kingdoms dump wire format
//!
//! The dump is a JSON document listing every kingdom with its provinces.
//! Kingdom-level honor and net worth are not trusted from the dump; they
//! are re-summed from the province detail at ingestion so one source feeds
//! both the kingdom record and the snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::Loc;
use crate::store::{Kingdom, Province};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KingdomsDump {
    /// Timestamp the game stamped on the dump; sync falls back to wall
    /// clock when missing.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    pub kingdoms: Vec<KingdomEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KingdomEntry {
    pub loc: String,
    pub name: String,
    #[serde(default)]
    pub stance: String,
    #[serde(default)]
    pub provinces: Vec<ProvinceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvinceEntry {
    pub loc: String,
    pub name: String,
    pub land: u64,
    #[serde(default)]
    pub race: String,
    #[serde(default)]
    pub honor: u64,
    #[serde(default)]
    pub nw: u64,
    #[serde(default)]
    pub protected: bool,
}

impl KingdomsDump {
    pub fn parse(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Convert dump entries into kingdom records ready for ingestion.
    pub fn into_kingdoms(self) -> Vec<Kingdom> {
        self.kingdoms.into_iter().map(KingdomEntry::into_kingdom).collect()
    }
}

impl KingdomEntry {
    fn into_kingdom(self) -> Kingdom {
        let provinces: Vec<Province> = self
            .provinces
            .into_iter()
            .map(|p| Province {
                loc: Loc::new(p.loc),
                name: p.name,
                land: p.land,
                race: p.race,
                honor: p.honor,
                nw: p.nw,
                protected: p.protected,
            })
            .collect();
        let honor = provinces.iter().map(|p| p.honor).sum();
        let nw = provinces.iter().map(|p| p.nw).sum();
        Kingdom {
            loc: Loc::new(self.loc),
            name: self.name,
            stance: self.stance,
            honor,
            nw,
            provinces,
        }
    }
}
