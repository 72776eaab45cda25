use crate::config::WebInterfaceUrl;
use crate::event::AlertEvent;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)%(streamTitle|streamDescription|streamUrl|alertDescription|backlog)%")
        .expect("placeholder pattern is valid")
});

const BACKLOG_FENCE: &str = "```";

/// Turns alert events into message text using a `%placeholder%` template.
#[derive(Debug, Clone)]
pub struct Renderer {
    template: String,
    web_interface_url: WebInterfaceUrl,
}

impl Renderer {
    pub fn new(template: String, web_interface_url: WebInterfaceUrl) -> Self {
        Self {
            template,
            web_interface_url,
        }
    }

    /// Substitute every recognised placeholder in one pass.
    ///
    /// Matching ignores case. Replacement values are inserted verbatim and
    /// never scanned again, so an event field containing `%backlog%` stays
    /// as typed. Unknown `%name%` sequences are left alone.
    pub fn render(&self, event: &AlertEvent) -> String {
        PLACEHOLDER
            .replace_all(&self.template, |caps: &Captures| {
                match caps[1].to_ascii_lowercase().as_str() {
                    "streamtitle" => event.stream_title.clone(),
                    "streamdescription" => event.stream_description.clone(),
                    "streamurl" => self.stream_url(&event.stream_id),
                    "alertdescription" => event.alert_description.clone(),
                    "backlog" => format_backlog(event.backlog()),
                    _ => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    /// Link to the last hour of messages in the stream
    pub fn stream_url(&self, stream_id: &str) -> String {
        format!(
            "{}streams/{}/messages?q=*&rangetype=relative&relative=3600",
            self.web_interface_url, stream_id
        )
    }
}

/// Wrap backlog lines in a code fence so chat clients show them preformatted.
pub fn format_backlog(lines: &[String]) -> String {
    let mut block = String::from(BACKLOG_FENCE);
    block.push('\n');
    for line in lines {
        block.push_str(line);
        block.push('\n');
    }
    block.push_str(BACKLOG_FENCE);
    block
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
