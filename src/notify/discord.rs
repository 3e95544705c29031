//! Discord webhook notifier
//!
//! Posts messages as embeds via a channel webhook. With no webhook
//! configured the notifier silently drops messages, which keeps local runs
//! and tests quiet without branching at every call site.

use reqwest::Client;
use serde::Serialize;

use super::{Notify, NotifyError};

pub struct DiscordNotifier {
    client: Client,
    webhook_url: Option<String>,
}

impl DiscordNotifier {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            webhook_url,
        }
    }

    /// Webhook URL from `DISCORD_WEBHOOK_URL`, unset meaning drop-only.
    pub fn from_env() -> Self {
        Self::new(std::env::var("DISCORD_WEBHOOK_URL").ok())
    }
}

#[derive(Serialize)]
struct WebhookPayload {
    username: String,
    embeds: Vec<Embed>,
}

#[derive(Serialize)]
struct Embed {
    title: String,
    description: String,
    color: u32,
}

fn payload_for(message: &str) -> WebhookPayload {
    WebhookPayload {
        username: "Warwatch".to_string(),
        embeds: vec![Embed {
            title: "Notification".to_string(),
            description: message.to_string(),
            color: 0xFF69B4,
        }],
    }
}

impl Notify for DiscordNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let Some(url) = &self.webhook_url else {
            tracing::debug!("no webhook configured, dropping notification");
            return Ok(());
        };

        let response = self
            .client
            .post(url)
            .json(&payload_for(message))
            .send()
            .await
            .map_err(|e| NotifyError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("webhook rejected message: {} {}", status, body);
            return Err(NotifyError::Status(status));
        }

        Ok(())
    }
}
