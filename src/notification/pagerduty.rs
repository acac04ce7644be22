//! Triggers PagerDuty incidents through the generic Events API.

use crate::core::{
    NotificationOutcome, NotificationPayload, Notifier, PagerDutyPayload, Receiver, ReceiverType,
};
use crate::error::{DispatchError, ValidationError};
use crate::value::Value;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{error, info, instrument};

pub const DEFAULT_EVENTS_URL: &str =
    "https://events.pagerduty.com/generic/2010-04-15/create_event.json";

#[derive(Serialize)]
struct PagerDutyEvent<'a> {
    service_key: &'a str,
    event_type: &'static str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    incident_key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a serde_json::Value>,
    client: &'static str,
}

#[derive(Debug, Deserialize)]
struct EventResponse {
    #[serde(default)]
    incident_key: Option<String>,
}

/// Sends `trigger` events keyed by the receiver's `service_key`.
pub struct PagerDutyNotifier {
    http: reqwest::Client,
    events_url: String,
}

impl PagerDutyNotifier {
    pub fn new(events_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder().timeout(timeout).build()?,
            events_url: events_url.into(),
        })
    }

    #[instrument(skip(self, service_key, payload))]
    async fn trigger(
        &self,
        receiver_name: &str,
        service_key: &str,
        payload: &PagerDutyPayload,
    ) -> Result<NotificationOutcome, DispatchError> {
        let event = PagerDutyEvent {
            service_key,
            event_type: "trigger",
            description: &payload.description,
            incident_key: payload.incident_key.as_deref(),
            details: payload.details.as_ref(),
            client: "receiverd",
        };

        let response = self
            .http
            .post(&self.events_url)
            .json(&event)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request to PagerDuty failed");
                DispatchError::delivery(receiver_name, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Failed to trigger PagerDuty event");
            return Err(DispatchError::delivery(
                receiver_name,
                format!("status {}, body: {}", status, body),
            ));
        }

        // The event is accepted at this point; an unreadable body only loses the key.
        let incident_key = response
            .json::<EventResponse>()
            .await
            .ok()
            .and_then(|body| body.incident_key);
        info!("Successfully triggered PagerDuty event.");

        let mut metadata = serde_json::Map::new();
        if let Some(incident_key) = incident_key {
            metadata.insert("incident_key".to_string(), json!(incident_key));
        }
        Ok(NotificationOutcome::delivered(metadata))
    }
}

#[async_trait]
impl Notifier for PagerDutyNotifier {
    fn receiver_type(&self) -> ReceiverType {
        ReceiverType::PagerDuty
    }

    async fn notify(
        &self,
        receiver: &Receiver,
        payload: &NotificationPayload,
    ) -> Result<NotificationOutcome, DispatchError> {
        let NotificationPayload::PagerDuty(payload) = payload else {
            return Err(DispatchError::NotifierNotRegistered);
        };
        let service_key = receiver
            .configurations
            .get("service_key")
            .and_then(Value::as_str)
            .ok_or_else(|| ValidationError::MissingConfigKey("service_key".to_string()))?;

        self.trigger(&receiver.name, service_key, payload).await
    }
}
