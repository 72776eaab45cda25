#[cfg(test)]
mod tests {
    use crate::alerts::{AlertHandler, DeliveryError, Renderer, StdoutAlert, TelegramAlert};
    use crate::config::{validate, Settings, WebInterfaceUrl};
    use crate::event::AlertEvent;
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;
    use wiremock::matchers::{body_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings_for(server: &MockServer, message: &str) -> Settings {
        let raw: HashMap<String, String> = [
            ("token", "777-bot"),
            ("chat", "42"),
            ("graylog_url", "http://graylog.local:9000"),
            ("parse_mode", "text"),
            ("message", message),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .chain([(
            "telegram_api_url".to_string(),
            format!("{}/bot${{bot_token}}", server.uri()),
        )])
        .collect();

        validate(&raw).unwrap()
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn test_event() -> AlertEvent {
        AlertEvent {
            stream_title: "Auth".to_string(),
            stream_description: "Login failures".to_string(),
            stream_id: "s1".to_string(),
            alert_description: "3 failures".to_string(),
            backlog_limit: 1,
            matching_messages: vec!["denied bob".to_string(), "denied eve".to_string()],
        }
    }

    #[tokio::test]
    async fn test_telegram_alert_renders_and_sends() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot777-bot/sendMessage"))
            .and(body_string(
                "chat_id=42&text=Auth%3A+3+failures%0A%60%60%60%0Adenied+bob%0A%60%60%60\
                 &disable_web_page_preview=true",
            ))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let settings = settings_for(&server, "%streamTitle%: %alertDescription%\n%backlog%");
        let handler: Arc<dyn AlertHandler> =
            Arc::new(TelegramAlert::new("ops-chat".to_string(), &settings));

        assert_eq!(handler.name(), "ops-chat");
        handler.send(&test_event()).await.unwrap();
    }

    #[tokio::test]
    async fn test_telegram_alert_surfaces_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;

        let settings = settings_for(&server, "%streamTitle%");
        let handler = TelegramAlert::new("ops-chat".to_string(), &settings);

        let err = handler.send(&test_event()).await.unwrap_err();
        assert!(matches!(
            err,
            DeliveryError::Api { status: 401, ref body } if body == "Unauthorized"
        ));
    }

    #[tokio::test]
    async fn test_telegram_alert_is_stateless_between_events() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;

        let settings = settings_for(&server, "%streamTitle%");
        let handler = TelegramAlert::new("ops-chat".to_string(), &settings);

        let mut second = test_event();
        second.stream_title = "Billing".to_string();

        handler.send(&test_event()).await.unwrap();
        handler.send(&second).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let bodies: Vec<String> = requests
            .into_iter()
            .map(|r| String::from_utf8(r.body).unwrap())
            .collect();
        assert!(bodies[0].contains("text=Auth&"));
        assert!(bodies[1].contains("text=Billing&"));
    }

    #[tokio::test]
    async fn test_stdout_alert_never_fails() {
        let renderer = Renderer::new(
            "%streamTitle% %backlog%".to_string(),
            WebInterfaceUrl::new("http://graylog.local"),
        );
        let handler: Arc<dyn AlertHandler> =
            Arc::new(StdoutAlert::new("dry-run".to_string(), renderer));

        assert_eq!(handler.name(), "dry-run");
        assert!(handler.send(&test_event()).await.is_ok());
    }

    #[tokio::test]
    async fn test_delivery_success_logged_once_at_info() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);

        let settings = settings_for(&server, "%streamTitle%");
        let handler = TelegramAlert::new("ops-chat".to_string(), &settings);
        handler.send(&test_event()).await.unwrap();
        drop(guard);

        let output = logs.contents();
        let sent: Vec<&str> = output
            .lines()
            .filter(|line| line.contains("Sent Telegram"))
            .collect();
        assert_eq!(sent.len(), 1, "unexpected log output: {}", output);
        assert!(sent[0].contains("INFO"));
        assert!(!output.contains("777-bot"));
    }
}
