//! Request and response bodies of the HTTP API.

use crate::core::{NewReceiver, NotificationPayload, Receiver, ReceiverType};
use crate::value::{decode_map, encode_map, EncodeError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Body of `POST /receivers` and `PUT /receivers/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceiverRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub receiver_type: ReceiverType,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub configurations: Map<String, Value>,
}

impl From<ReceiverRequest> for NewReceiver {
    fn from(request: ReceiverRequest) -> Self {
        NewReceiver {
            name: request.name,
            receiver_type: request.receiver_type,
            labels: request.labels,
            configurations: decode_map(request.configurations),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReceiverResponse {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub receiver_type: ReceiverType,
    pub labels: BTreeMap<String, String>,
    pub configurations: Map<String, Value>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<Receiver> for ReceiverResponse {
    type Error = EncodeError;

    fn try_from(receiver: Receiver) -> Result<Self, Self::Error> {
        Ok(Self {
            configurations: encode_map(&receiver.configurations)?,
            data: encode_map(&receiver.data)?,
            id: receiver.id,
            name: receiver.name,
            receiver_type: receiver.receiver_type,
            labels: receiver.labels,
            created_at: receiver.created_at,
            updated_at: receiver.updated_at,
        })
    }
}

/// Body of `POST /receivers/{id}/send`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendNotificationBody {
    #[serde(default)]
    pub data: Option<NotificationPayload>,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}
