use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single alert raised by the log-analysis host.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct AlertEvent {
    pub stream_title: String,
    #[serde(default)]
    pub stream_description: String,
    pub stream_id: String,
    #[serde(default)]
    pub alert_description: String,
    /// Maximum number of matching messages the condition wants attached
    #[serde(default)]
    pub backlog_limit: usize,
    #[serde(default)]
    pub matching_messages: Vec<String>,
}

impl AlertEvent {
    /// The matching messages that fit into the backlog, in match order
    pub fn backlog(&self) -> &[String] {
        let size = self.backlog_limit.min(self.matching_messages.len());
        &self.matching_messages[..size]
    }

    /// Parse an event from JSON or YAML content.
    pub fn parse(content: &str) -> Result<Self> {
        let event = if content.trim_start().starts_with('{') {
            serde_json::from_str(content).context("Invalid JSON alert event")?
        } else {
            serde_yaml::from_str(content).context("Invalid YAML alert event")?
        };
        Ok(event)
    }

    /// Read an event from a file, or from stdin when the path is `-`
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = if path.as_os_str() == "-" {
            std::io::read_to_string(std::io::stdin()).context("Failed to read event from stdin")?
        } else {
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read event file: {}", path.display()))?
        };
        Self::parse(&content)
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
