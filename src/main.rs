mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use telegram_alert::{AlertEvent, AlertHandler, Renderer, Settings, StdoutAlert, TelegramAlert};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Settings are loaded first so the optional log file can be attached
    let settings = Settings::from_file(cli.command.config_path());
    let log_file = settings.as_ref().ok().and_then(|s| s.log_file.as_deref());
    init_tracing(cli.verbose, log_file);

    let settings = settings?;

    match cli.command {
        Commands::Check { config } => {
            handle_check(&config, &settings);
        }
        Commands::Render { event, .. } => {
            handle_render(&event, &settings).await?;
        }
        Commands::Send { event, .. } => {
            handle_send(&event, &settings).await?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool, log_file: Option<&Path>) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let mut file_error = None;
    let file_layer = log_file.and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file))),
            Err(e) => {
                file_error = Some(format!("Cannot open log file {}: {}", path.display(), e));
                None
            }
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    if let Some(error) = file_error {
        tracing::warn!("{}", error);
    }
}

fn handle_check(config_path: &Path, settings: &Settings) {
    tracing::info!("Configuration is valid: {}", config_path.display());
    print!("{}", check_summary(settings));
}

fn check_summary(settings: &Settings) -> String {
    let delivery = &settings.delivery;
    let mut out = String::new();

    out.push_str("\n🔔 Telegram delivery:\n");
    out.push_str(&format!("  Chat ID: {}\n", delivery.chat_id));
    out.push_str("  Token: <redacted>\n");
    out.push_str(&format!("  Parse mode: {:?}\n", delivery.parse_mode));
    out.push_str(&format!("  Post mode: {:?}\n", delivery.encoding_mode));
    out.push_str(&format!("  API url: {}\n", delivery.api_url));
    match &delivery.proxy {
        Some(proxy) => out.push_str(&format!("  Proxy: {}\n", proxy)),
        None => out.push_str("  Proxy: none\n"),
    }

    out.push_str(&format!("\n🌐 Web interface: {}\n", delivery.web_interface_url));
    out.push_str("\n📝 Message template:\n");
    for line in settings.message_template.lines() {
        out.push_str(&format!("    {}\n", line));
    }
    if let Some(path) = &settings.log_file {
        out.push_str(&format!("\n📄 Log file: {}\n", path.display()));
    }

    out.push_str("\n✅ Configuration is valid\n");
    out
}

async fn handle_render(event_path: &Path, settings: &Settings) -> Result<()> {
    let event = AlertEvent::from_path(event_path)?;
    let renderer = Renderer::new(
        settings.message_template.clone(),
        settings.delivery.web_interface_url.clone(),
    );

    let handler = StdoutAlert::new("stdout".to_string(), renderer);
    handler.send(&event).await?;
    Ok(())
}

async fn handle_send(event_path: &Path, settings: &Settings) -> Result<()> {
    let event = AlertEvent::from_path(event_path)?;
    let handler = TelegramAlert::new("telegram".to_string(), settings);

    handler
        .send(&event)
        .await
        .with_context(|| format!("Failed to deliver alert for stream '{}'", event.stream_title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_check_summary_redacts_token() {
        let raw: HashMap<String, String> = [
            ("token", "987654:SECRET-token-value"),
            ("chat", "42"),
            ("graylog_url", "http://graylog.local"),
            ("message", "%streamTitle%"),
            ("proxy", "proxy.local:3128"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let settings = Settings::from_map(&raw).unwrap();

        let summary = check_summary(&settings);
        assert!(summary.contains("Token: <redacted>"));
        assert!(!summary.contains("9876"));
        assert!(!summary.contains("SECRET"));
        assert!(summary.contains("Chat ID: 42"));
        assert!(summary.contains("Proxy: proxy.local:3128"));
    }
}
