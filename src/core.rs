//! Core domain types and service traits for receiverd
//!
//! This module defines the receiver model, the notification request and
//! outcome types, and the trait contracts that the dispatcher is built on.

use crate::error::{DispatchError, StoreError};
use crate::value::Configuration;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The kind of platform a receiver delivers to.
///
/// Unknown type tags are kept as `Other` so that stored receivers of a type
/// this build doesn't know about can still be listed and read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReceiverType {
    Slack,
    PagerDuty,
    Http,
    Other(String),
}

impl ReceiverType {
    pub fn as_str(&self) -> &str {
        match self {
            ReceiverType::Slack => "slack",
            ReceiverType::PagerDuty => "pagerduty",
            ReceiverType::Http => "http",
            ReceiverType::Other(tag) => tag,
        }
    }
}

impl From<&str> for ReceiverType {
    fn from(tag: &str) -> Self {
        match tag {
            "slack" => ReceiverType::Slack,
            "pagerduty" => ReceiverType::PagerDuty,
            "http" => ReceiverType::Http,
            other => ReceiverType::Other(other.to_string()),
        }
    }
}

impl From<String> for ReceiverType {
    fn from(tag: String) -> Self {
        ReceiverType::from(tag.as_str())
    }
}

impl From<ReceiverType> for String {
    fn from(receiver_type: ReceiverType) -> Self {
        receiver_type.as_str().to_string()
    }
}

impl fmt::Display for ReceiverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named alert destination.
#[derive(Debug, Clone, PartialEq)]
pub struct Receiver {
    pub id: u64,
    pub name: String,
    pub receiver_type: ReceiverType,
    /// Free-form tags.
    pub labels: BTreeMap<String, String>,
    /// Type-specific settings and credentials.
    pub configurations: Configuration,
    /// Runtime-derived data, populated on read and never persisted.
    pub data: Configuration,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The caller-supplied part of a receiver, used for create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReceiver {
    pub name: String,
    pub receiver_type: ReceiverType,
    pub labels: BTreeMap<String, String>,
    pub configurations: Configuration,
}

/// Who a Slack message is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlackTargetKind {
    /// Addressed by email address.
    User,
    /// Addressed by channel name.
    Channel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlackPayload {
    pub receiver_name: String,
    pub receiver_type: SlackTargetKind,
    pub message: String,
    #[serde(default)]
    pub blocks: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagerDutyPayload {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpPayload {
    pub body: serde_json::Value,
}

/// The type-specific data carried by a notification request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPayload {
    Slack(SlackPayload),
    PagerDuty(PagerDutyPayload),
    Http(HttpPayload),
}

impl NotificationPayload {
    /// The receiver type this payload is meant for.
    pub fn receiver_type(&self) -> ReceiverType {
        match self {
            NotificationPayload::Slack(_) => ReceiverType::Slack,
            NotificationPayload::PagerDuty(_) => ReceiverType::PagerDuty,
            NotificationPayload::Http(_) => ReceiverType::Http,
        }
    }
}

/// A request to notify a single receiver. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRequest {
    pub receiver_id: u64,
    pub payload: Option<NotificationPayload>,
}

/// The result of a successful delivery.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NotificationOutcome {
    pub ok: bool,
    /// Backend-specific details, e.g. the Slack message timestamp.
    #[serde(flatten)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl NotificationOutcome {
    pub fn delivered(metadata: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { ok: true, metadata }
    }
}

// =============================================================================
// Service Traits
// =============================================================================

/// Persists and retrieves receivers.
///
/// Implementations do not validate; callers go through the receiver service,
/// which validates before any write.
#[async_trait]
pub trait ReceiverStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Receiver>, StoreError>;

    /// Returns `Ok(None)` when no receiver has this id.
    async fn get(&self, id: u64) -> Result<Option<Receiver>, StoreError>;

    async fn create(&self, receiver: NewReceiver) -> Result<Receiver, StoreError>;

    /// Replaces name, type, labels and configurations of an existing receiver.
    async fn update(&self, id: u64, receiver: NewReceiver) -> Result<Receiver, StoreError>;

    async fn delete(&self, id: u64) -> Result<(), StoreError>;
}

/// Delivers a notification to one kind of receiver.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// The receiver type this notifier handles.
    fn receiver_type(&self) -> ReceiverType;

    /// Builds the platform message from the receiver's stored configuration
    /// and the request payload, then sends it.
    ///
    /// # Returns
    /// * `Ok(NotificationOutcome)` once the platform accepted the message
    /// * `Err` for configuration, resolution or delivery failures. Nothing
    ///   is retried.
    async fn notify(
        &self,
        receiver: &Receiver,
        payload: &NotificationPayload,
    ) -> Result<NotificationOutcome, DispatchError>;
}
