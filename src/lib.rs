//! Render log alert events from a `%placeholder%` template and deliver them
//! through the Telegram Bot API.
//!
//! The host composes the two halves per alert:
//!
//! ```no_run
//! # async fn run(settings: telegram_alert::Settings, event: telegram_alert::AlertEvent) {
//! use telegram_alert::{Renderer, TelegramBot};
//!
//! let renderer = Renderer::new(
//!     settings.message_template.clone(),
//!     settings.delivery.web_interface_url.clone(),
//! );
//! let message = renderer.render(&event);
//! if let Err(e) = TelegramBot::new().send(&message, &settings.delivery).await {
//!     eprintln!("delivery failed: {}", e);
//! }
//! # }
//! ```

pub mod alerts;
pub mod config;
pub mod event;

pub use alerts::{AlertHandler, DeliveryError, Renderer, StdoutAlert, TelegramAlert, TelegramBot};
pub use config::{validate, ConfigIssue, DeliveryConfig, Settings};
pub use event::AlertEvent;
