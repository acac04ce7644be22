//! Delivers notifications to Slack users and channels.

pub mod api;
pub mod resolver;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use crate::core::{
    NotificationOutcome, NotificationPayload, Notifier, Receiver, ReceiverType, SlackPayload,
    SlackTargetKind,
};
use crate::error::{DispatchError, ValidationError};
use crate::value::Value;
use api::SlackClientFactory;
use async_trait::async_trait;
use resolver::resolve_and_authorize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// A message ready to be sent to Slack.
#[derive(Debug, Clone, PartialEq)]
pub struct SlackMessage {
    /// Channel name or user email.
    pub receiver_name: String,
    pub receiver_type: SlackTargetKind,
    /// Bot token of the workspace.
    pub token: String,
    pub message: String,
    pub blocks: Vec<serde_json::Value>,
}

impl SlackMessage {
    /// Combines a request payload with the receiver's stored bot token.
    pub fn build(receiver: &Receiver, payload: &SlackPayload) -> Result<Self, ValidationError> {
        let token = receiver
            .configurations
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| ValidationError::MissingConfigKey("token".to_string()))?;

        Ok(Self {
            receiver_name: payload.receiver_name.clone(),
            receiver_type: payload.receiver_type,
            token: token.to_string(),
            message: payload.message.clone(),
            blocks: payload.blocks.clone(),
        })
    }
}

/// Sends messages through the Slack Web API.
pub struct SlackNotifier {
    factory: Arc<dyn SlackClientFactory>,
}

impl SlackNotifier {
    pub fn new(factory: Arc<dyn SlackClientFactory>) -> Self {
        Self { factory }
    }

    /// Resolves the target and posts the message to it.
    ///
    /// Resolution errors are returned unchanged; a failed post is wrapped in
    /// [`DispatchError::DeliveryFailed`] naming the target.
    #[instrument(skip(self, message), fields(target = %message.receiver_name, kind = ?message.receiver_type))]
    pub async fn send(&self, message: &SlackMessage) -> Result<NotificationOutcome, DispatchError> {
        let client = self.factory.client(&message.token);
        let target_id =
            resolve_and_authorize(client.as_ref(), &message.receiver_name, message.receiver_type)
                .await?;

        match client
            .post_message(&target_id, &message.message, &message.blocks)
            .await
        {
            Ok(posted) => {
                info!(channel = %posted.channel, ts = %posted.ts, "Successfully sent message to Slack.");
                let mut metadata = serde_json::Map::new();
                metadata.insert("channel".to_string(), json!(posted.channel));
                metadata.insert("ts".to_string(), json!(posted.ts));
                Ok(NotificationOutcome::delivered(metadata))
            }
            Err(e) => {
                error!(error = %e, "Failed to send Slack message");
                Err(DispatchError::delivery(&message.receiver_name, e))
            }
        }
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    fn receiver_type(&self) -> ReceiverType {
        ReceiverType::Slack
    }

    async fn notify(
        &self,
        receiver: &Receiver,
        payload: &NotificationPayload,
    ) -> Result<NotificationOutcome, DispatchError> {
        let NotificationPayload::Slack(payload) = payload else {
            return Err(DispatchError::NotifierNotRegistered);
        };
        let message = SlackMessage::build(receiver, payload)?;
        self.send(&message).await
    }
}
