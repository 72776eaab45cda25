mod error;
mod stdout;
mod telegram;
pub mod template;

use crate::event::AlertEvent;
use async_trait::async_trait;

pub use error::DeliveryError;
pub use stdout::StdoutAlert;
pub use telegram::{endpoint, TelegramAlert, TelegramBot};
pub use template::Renderer;

/// Something the host can hand an alert event to
#[async_trait]
pub trait AlertHandler: Send + Sync {
    /// Render and deliver a single alert event
    async fn send(&self, event: &AlertEvent) -> Result<(), DeliveryError>;

    /// Get a human-readable name for this alert handler
    fn name(&self) -> &str;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
