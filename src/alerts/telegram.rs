use super::{AlertHandler, DeliveryError, Renderer};
use crate::config::{interpolate_token, DeliveryConfig, EncodingMode, Settings};
use crate::event::AlertEvent;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::error::Error as _;

const SEND_MESSAGE: &str = "sendMessage";

/// Delivers rendered messages through the Bot API `sendMessage` method.
///
/// Holds no state: the HTTP client, proxy and body are built per call from
/// the `DeliveryConfig` passed in, so concurrent sends never share routing.
#[derive(Debug, Clone, Copy, Default)]
pub struct TelegramBot;

impl TelegramBot {
    pub fn new() -> Self {
        Self
    }

    /// Perform one POST to the API. No retries.
    pub async fn send(&self, message: &str, config: &DeliveryConfig) -> Result<(), DeliveryError> {
        let client = build_client(config).inspect_err(|e| tracing::warn!("{}", e))?;
        let request = client.post(endpoint(config));

        let request = match config.encoding_mode {
            EncodingMode::Form => request.form(&form_params(message, config)),
            EncodingMode::Json => request.json(&json_body(message, config)),
        };

        let response = request.send().await.map_err(|e| {
            let error = DeliveryError::Transport(describe(e));
            tracing::warn!(chat_id = %config.chat_id, "{}", error);
            error
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            let error = DeliveryError::Api {
                status: status.as_u16(),
                body,
            };
            tracing::warn!(chat_id = %config.chat_id, status = status.as_u16(), "{}", error);
            return Err(error);
        }

        tracing::info!(chat_id = %config.chat_id, "Sent Telegram message");
        Ok(())
    }
}

fn build_client(config: &DeliveryConfig) -> Result<reqwest::Client, DeliveryError> {
    let builder = reqwest::Client::builder();
    let builder = match &config.proxy {
        Some(proxy) => {
            let route = reqwest::Proxy::all(proxy.url()).map_err(|e| {
                DeliveryError::Config(format!("invalid proxy '{}': {}", proxy, e))
            })?;
            builder.proxy(route)
        }
        // Never fall back to proxies from the environment
        None => builder.no_proxy(),
    };

    builder
        .build()
        .map_err(|e| DeliveryError::Config(format!("failed to build HTTP client: {}", e)))
}

/// Resolve the `sendMessage` url for a configuration.
///
/// The token is only ever placed where the `${bot_token}` placeholder sits.
/// Overrides that already end in `/sendMessage` are used as they are.
pub fn endpoint(config: &DeliveryConfig) -> String {
    let url = interpolate_token(&config.api_url, &config.bot_token);
    if url.ends_with(&format!("/{}", SEND_MESSAGE)) {
        url
    } else if url.ends_with('/') {
        format!("{}{}", url, SEND_MESSAGE)
    } else {
        format!("{}/{}", url, SEND_MESSAGE)
    }
}

fn form_params<'a>(message: &'a str, config: &'a DeliveryConfig) -> Vec<(&'static str, &'a str)> {
    let mut params = vec![
        ("chat_id", config.chat_id.as_str()),
        ("text", message),
        ("disable_web_page_preview", "true"),
    ];
    if let Some(mode) = config.parse_mode.api_value() {
        params.push(("parse_mode", mode));
    }
    params
}

fn json_body(message: &str, config: &DeliveryConfig) -> Value {
    let mut body = json!({
        "chat_id": config.chat_id,
        "text": message,
        "disable_web_page_preview": true,
    });
    if let Some(mode) = config.parse_mode.api_value() {
        body["parse_mode"] = json!(mode);
    }
    body
}

// The request url carries the bot token, so it is stripped before the
// error chain is flattened into a message.
fn describe(error: reqwest::Error) -> String {
    let error = error.without_url();
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Renders an event and delivers it to one Telegram chat.
pub struct TelegramAlert {
    name: String,
    renderer: Renderer,
    delivery: DeliveryConfig,
    bot: TelegramBot,
}

impl TelegramAlert {
    pub fn new(name: String, settings: &Settings) -> Self {
        Self {
            name,
            renderer: Renderer::new(
                settings.message_template.clone(),
                settings.delivery.web_interface_url.clone(),
            ),
            delivery: settings.delivery.clone(),
            bot: TelegramBot::new(),
        }
    }
}

#[async_trait]
impl AlertHandler for TelegramAlert {
    async fn send(&self, event: &AlertEvent) -> Result<(), DeliveryError> {
        let message = self.renderer.render(event);
        tracing::debug!(
            "Alert '{}' rendered {} bytes for stream {}",
            self.name,
            message.len(),
            event.stream_id
        );

        self.bot.send(&message, &self.delivery).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
#[path = "telegram_tests.rs"]
mod tests;
