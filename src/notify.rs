//! Slack alerts for failing URLs.

use log::{debug, error};
use reqwest::Client;
use serde_json::json;

/// Posts alert messages to a Slack incoming webhook.
#[derive(Debug, Clone)]
pub struct SlackNotifier {
    client: Client,
    webhook_url: String,
}

impl SlackNotifier {
    /// Notifier posting to `webhook_url` with `client`.
    pub fn new(client: Client, webhook_url: impl Into<String>) -> Self {
        Self {
            client,
            webhook_url: webhook_url.into(),
        }
    }

    /// Message text for a failing URL.
    pub fn format_alert(url: &str, status: u16, details: &str) -> String {
        format!(":rotating_light: *{url}* returned {status}: {details}")
    }

    /// Sends one alert. Failures are logged, never returned.
    pub async fn send_alert(&self, url: &str, status: u16, details: &str) {
        let body = json!({
            "text": Self::format_alert(url, status, details),
            "attachments": [{
                "color": "danger",
                "fields": [
                    { "title": "URL", "value": url, "short": false },
                    { "title": "Status", "value": status.to_string(), "short": true },
                    { "title": "Details", "value": details, "short": true },
                ],
            }],
        });
        match self.client.post(&self.webhook_url).json(&body).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Slack alert sent for {url}");
            }
            Ok(response) => error!(
                "Slack webhook rejected alert for {url}: HTTP {}",
                response.status()
            ),
            Err(e) => error!("Failed to send Slack alert for {url}: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_format_alert() {
        let text = SlackNotifier::format_alert("app.example.com", 404, "Not found");
        assert!(text.contains("app.example.com"));
        assert!(text.contains("404"));
        assert!(text.contains("Not found"));
    }

    #[tokio::test]
    async fn test_send_alert_posts_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_partial_json(json!({
                "text": SlackNotifier::format_alert("a.example.com", 502, "❌ Bad Gateway")
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = SlackNotifier::new(Client::new(), format!("{}/hook", server.uri()));
        notifier.send_alert("a.example.com", 502, "❌ Bad Gateway").await;
    }

    #[tokio::test]
    async fn test_webhook_failure_is_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let notifier = SlackNotifier::new(Client::new(), server.uri());
        notifier.send_alert("a.example.com", 404, "Not found").await;
    }
}
