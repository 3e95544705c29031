//! HTTP fetcher for the kingdoms dump

use reqwest::Client;

use crate::core::error::{Result, WatchError};
use crate::sync::dump::KingdomsDump;

pub struct DumpFetcher {
    client: Client,
    url: String,
}

impl DumpFetcher {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    /// Grab and parse the latest dump.
    ///
    /// Any failure here fails the whole sync cycle; the scheduler decides
    /// when to try again.
    pub async fn fetch(&self) -> Result<KingdomsDump> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| WatchError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WatchError::Fetch(format!(
                "dump endpoint returned {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| WatchError::Fetch(e.to_string()))?;
        KingdomsDump::parse(&body)
    }
}
