// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! "Join link ready" delivery.

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;
use woom_core::{JoinLinkHandler, JoinLinkReady, WoomError};

/// Logs each join link. Used when no webhook is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl JoinLinkHandler for LogNotifier {
    async fn join_link_ready(&self, event: &JoinLinkReady) -> Result<(), WoomError> {
        info!(
            order_id = %event.order_id,
            item_id = %event.item_id,
            user_id = %event.user_id,
            join_url = %event.join_url,
            "join link ready"
        );
        Ok(())
    }
}

/// POSTs each join link as JSON to a fixed URL.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, WoomError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WoomError::Http {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl JoinLinkHandler for WebhookNotifier {
    async fn join_link_ready(&self, event: &JoinLinkReady) -> Result<(), WoomError> {
        let response = self
            .client
            .post(&self.url)
            .json(event)
            .send()
            .await
            .map_err(|e| WoomError::Http {
                message: format!("join link webhook failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(WoomError::Http {
                message: format!("join link webhook returned {status}"),
                source: None,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use woom_core::{ItemId, OrderId, UserId};

    use super::*;

    fn event() -> JoinLinkReady {
        JoinLinkReady {
            order_id: OrderId(1),
            item_id: ItemId(2),
            user_id: UserId(3),
            join_url: "https://x.test/j/1".into(),
        }
    }

    #[tokio::test]
    async fn webhook_posts_event() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hooks/join"))
            .and(body_json(serde_json::json!({
                "order_id": 1, "item_id": 2, "user_id": 3, "join_url": "https://x.test/j/1"
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let notifier =
            WebhookNotifier::new(format!("{}/hooks/join", server.uri()), Duration::from_secs(2))
                .unwrap();
        notifier.join_link_ready(&event()).await.unwrap();
    }

    #[tokio::test]
    async fn webhook_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(server.uri(), Duration::from_secs(2)).unwrap();
        let err = notifier.join_link_ready(&event()).await.unwrap_err();
        assert!(matches!(err, WoomError::Http { .. }));
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn log_notifier_logs_link() {
        LogNotifier.join_link_ready(&event()).await.unwrap();
        assert!(logs_contain("join link ready"));
    }
}
