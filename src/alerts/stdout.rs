use super::{AlertHandler, DeliveryError, Renderer};
use crate::event::AlertEvent;
use async_trait::async_trait;
use chrono::Utc;

/// Prints the rendered message instead of delivering it.
pub struct StdoutAlert {
    name: String,
    renderer: Renderer,
}

impl StdoutAlert {
    pub fn new(name: String, renderer: Renderer) -> Self {
        Self { name, renderer }
    }
}

#[async_trait]
impl AlertHandler for StdoutAlert {
    async fn send(&self, event: &AlertEvent) -> Result<(), DeliveryError> {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S");
        println!("[{}] ALERT [{}]:", timestamp, event.stream_title);
        println!("{}", self.renderer.render(event));
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
