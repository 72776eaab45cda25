use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Placeholder in the API url that is replaced with the bot token
pub const TOKEN_PLACEHOLDER: &str = "${bot_token}";
pub const DEFAULT_API_URL: &str = "https://api.telegram.org/bot${bot_token}/";
/// Suggested starting template; `message` itself is mandatory
pub const DEFAULT_MESSAGE_TEMPLATE: &str = "[%streamTitle%](%streamUrl%):\n%backlog%";

/// Keys accepted in the raw settings map
pub mod keys {
    pub const MESSAGE: &str = "message";
    pub const CHAT: &str = "chat";
    pub const TOKEN: &str = "token";
    pub const PARSE_MODE: &str = "parse_mode";
    pub const POST_MODE: &str = "post_mode";
    pub const GRAYLOG_URL: &str = "graylog_url";
    pub const PROXY: &str = "proxy";
    pub const TELEGRAM_API_URL: &str = "telegram_api_url";
    pub const LOG_FILE: &str = "log_file";
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigIssue {
    #[error("{0} is mandatory and must not be empty")]
    Missing(&'static str),
    #[error("Invalid chat id '{0}': expected a numeric id")]
    InvalidChatId(String),
    #[error("Invalid parse mode '{0}': expected text, markdown or html")]
    InvalidParseMode(String),
    #[error("Invalid post mode '{0}': expected url or json")]
    InvalidPostMode(String),
    #[error("Invalid proxy '{0}': expected <host>:<port>")]
    InvalidProxy(String),
    #[error("Graylog url is invalid: {0}")]
    InvalidWebInterfaceUrl(String),
    #[error("Telegram API url is invalid: {0}")]
    InvalidApiUrl(String),
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    Text,
    #[default]
    Markdown,
    Html,
}

impl ParseMode {
    /// Value sent as `parse_mode`, `None` for plain text
    pub fn api_value(&self) -> Option<&'static str> {
        match self {
            ParseMode::Text => None,
            ParseMode::Markdown => Some("Markdown"),
            ParseMode::Html => Some("HTML"),
        }
    }
}

impl FromStr for ParseMode {
    type Err = ConfigIssue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(ParseMode::Text),
            "markdown" => Ok(ParseMode::Markdown),
            "html" => Ok(ParseMode::Html),
            _ => Err(ConfigIssue::InvalidParseMode(s.to_string())),
        }
    }
}

/// How the sendMessage request body is encoded
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EncodingMode {
    #[default]
    Form,
    Json,
}

impl FromStr for EncodingMode {
    type Err = ConfigIssue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "url" | "form" => Ok(EncodingMode::Form),
            "json" => Ok(EncodingMode::Json),
            _ => Err(ConfigIssue::InvalidPostMode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyAddress {
    pub host: String,
    pub port: u16,
}

impl ProxyAddress {
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl FromStr for ProxyAddress {
    type Err = ConfigIssue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigIssue::InvalidProxy(s.to_string());
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 2 || parts[0].is_empty() {
            return Err(invalid());
        }
        let port = parts[1].parse::<u16>().map_err(|_| invalid())?;
        if port == 0 {
            return Err(invalid());
        }
        Ok(ProxyAddress {
            host: parts[0].to_string(),
            port,
        })
    }
}

impl fmt::Display for ProxyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Base url of the log-analysis web interface, always ending in exactly one `/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebInterfaceUrl(String);

impl WebInterfaceUrl {
    pub fn new(url: &str) -> Self {
        Self(format!("{}/", url.trim_end_matches('/')))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WebInterfaceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything needed to deliver one rendered message
#[derive(Clone)]
pub struct DeliveryConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub parse_mode: ParseMode,
    pub encoding_mode: EncodingMode,
    pub proxy: Option<ProxyAddress>,
    /// Endpoint template containing `${bot_token}`
    pub api_url: String,
    pub web_interface_url: WebInterfaceUrl,
}

impl fmt::Debug for DeliveryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("parse_mode", &self.parse_mode)
            .field("encoding_mode", &self.encoding_mode)
            .field("proxy", &self.proxy)
            .field("api_url", &self.api_url)
            .field("web_interface_url", &self.web_interface_url)
            .finish()
    }
}

/// Replace every token placeholder in an API url template.
pub fn interpolate_token(api_url: &str, token: &str) -> String {
    api_url.replace(TOKEN_PLACEHOLDER, token)
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub message_template: String,
    pub delivery: DeliveryConfig,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let values: HashMap<String, serde_yaml::Value> =
            serde_yaml::from_str(&content).context("Config file must be a YAML mapping")?;

        let raw = values
            .into_iter()
            .filter_map(|(key, value)| scalar_to_string(value).map(|v| (key, v)))
            .collect::<HashMap<_, _>>();

        Self::from_map(&raw)
    }

    pub fn from_map(raw: &HashMap<String, String>) -> Result<Self> {
        validate(raw).map_err(|issues| {
            let lines = issues
                .iter()
                .map(|issue| format!("  - {}", issue))
                .collect::<Vec<_>>()
                .join("\n");
            anyhow::anyhow!("Invalid configuration:\n{}", lines)
        })
    }
}

fn scalar_to_string(value: serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn is_http_url(url: &str) -> bool {
    match reqwest::Url::parse(url) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some()
        }
        Err(_) => false,
    }
}

/// Validate raw key/value settings, collecting every problem found.
pub fn validate(raw: &HashMap<String, String>) -> Result<Settings, Vec<ConfigIssue>> {
    let get = |key: &str| {
        raw.get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    };
    let mut issues = Vec::new();

    // Kept verbatim; only checked for blankness
    let message_template = match raw.get(keys::MESSAGE) {
        Some(template) if !template.trim().is_empty() => template.clone(),
        _ => {
            issues.push(ConfigIssue::Missing(keys::MESSAGE));
            String::new()
        }
    };

    let bot_token = get(keys::TOKEN).unwrap_or_default().to_string();
    if bot_token.is_empty() {
        issues.push(ConfigIssue::Missing(keys::TOKEN));
    }

    let chat_id = get(keys::CHAT).unwrap_or_default().to_string();
    if chat_id.is_empty() {
        issues.push(ConfigIssue::Missing(keys::CHAT));
    } else if chat_id.parse::<i64>().is_err() {
        issues.push(ConfigIssue::InvalidChatId(chat_id.clone()));
    }

    let parse_mode = match get(keys::PARSE_MODE).map(str::parse::<ParseMode>) {
        Some(Ok(mode)) => mode,
        Some(Err(issue)) => {
            issues.push(issue);
            ParseMode::default()
        }
        None => ParseMode::default(),
    };

    let encoding_mode = match get(keys::POST_MODE).map(str::parse::<EncodingMode>) {
        Some(Ok(mode)) => mode,
        Some(Err(issue)) => {
            issues.push(issue);
            EncodingMode::default()
        }
        None => EncodingMode::default(),
    };

    let web_interface_url = match get(keys::GRAYLOG_URL) {
        Some(url) if is_http_url(url) => WebInterfaceUrl::new(url),
        Some(url) => {
            issues.push(ConfigIssue::InvalidWebInterfaceUrl(url.to_string()));
            WebInterfaceUrl::new(url)
        }
        None => {
            issues.push(ConfigIssue::Missing(keys::GRAYLOG_URL));
            WebInterfaceUrl::new("")
        }
    };

    let proxy = match get(keys::PROXY).map(str::parse::<ProxyAddress>) {
        Some(Ok(proxy)) => Some(proxy),
        Some(Err(issue)) => {
            issues.push(issue);
            None
        }
        None => None,
    };

    let api_url = get(keys::TELEGRAM_API_URL)
        .unwrap_or(DEFAULT_API_URL)
        .to_string();
    if !is_http_url(&interpolate_token(&api_url, "0")) {
        issues.push(ConfigIssue::InvalidApiUrl(api_url.clone()));
    }

    let log_file = get(keys::LOG_FILE).map(PathBuf::from);

    if !issues.is_empty() {
        return Err(issues);
    }

    Ok(Settings {
        message_template,
        delivery: DeliveryConfig {
            bot_token,
            chat_id,
            parse_mode,
            encoding_mode,
            proxy,
            api_url,
            web_interface_url,
        },
        log_file,
    })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
