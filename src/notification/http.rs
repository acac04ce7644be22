//! Posts notifications to an arbitrary HTTP endpoint.

use crate::core::{NotificationOutcome, NotificationPayload, Notifier, Receiver, ReceiverType};
use crate::error::{DispatchError, ValidationError};
use crate::value::Value;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::{error, info, instrument};

/// POSTs the request body as JSON to the receiver's `url`.
pub struct HttpNotifier {
    http: reqwest::Client,
}

impl HttpNotifier {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }

    /// Failures are reported against `receiver_name`; the URL may carry credentials.
    #[instrument(skip(self, url, body))]
    async fn post(
        &self,
        receiver_name: &str,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<NotificationOutcome, DispatchError> {
        match self.http.post(url).json(body).send().await {
            Ok(res) => {
                let status = res.status();
                if status.is_success() {
                    info!(status = %status, "Successfully delivered webhook.");
                    let mut metadata = serde_json::Map::new();
                    metadata.insert("status".to_string(), json!(status.as_u16()));
                    Ok(NotificationOutcome::delivered(metadata))
                } else {
                    let text = res.text().await.unwrap_or_default();
                    error!(status = %status, body = %text, "Failed to deliver webhook");
                    Err(DispatchError::delivery(
                        receiver_name,
                        format!("status {}, body: {}", status, text),
                    ))
                }
            }
            Err(e) => {
                let e = e.without_url();
                error!(error = %e, "HTTP request to webhook failed");
                Err(DispatchError::delivery(receiver_name, e))
            }
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    fn receiver_type(&self) -> ReceiverType {
        ReceiverType::Http
    }

    async fn notify(
        &self,
        receiver: &Receiver,
        payload: &NotificationPayload,
    ) -> Result<NotificationOutcome, DispatchError> {
        let NotificationPayload::Http(payload) = payload else {
            return Err(DispatchError::NotifierNotRegistered);
        };
        let url = receiver
            .configurations
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| ValidationError::MissingConfigKey("url".to_string()))?;

        self.post(&receiver.name, url, &payload.body).await
    }
}
