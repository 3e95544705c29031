//! Notification delivery
//!
//! Delivery is best effort from the detector's point of view: a failed send
//! is logged and discarded, never propagated, and never rolls back records
//! that were already committed.

pub mod discord;

pub use discord::DiscordNotifier;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Request(String),

    #[error("webhook returned status {0}")]
    Status(u16),
}

/// Deliver a human-readable message to wherever notifications go.
#[allow(async_fn_in_trait)]
pub trait Notify {
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}
