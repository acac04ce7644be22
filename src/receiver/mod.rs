//! Receiver management: validation, persistence and the Slack-specific
//! enrichment that happens around it.

pub mod schema;
pub mod store;

use crate::core::{NewReceiver, Receiver, ReceiverStore, ReceiverType};
use crate::error::{ResolutionError, ServiceError, ValidationError};
use crate::notification::slack::api::SlackClientFactory;
use crate::value::{Configuration, Value};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Create/read/update/delete for receivers.
///
/// Every write is validated against [`schema::validate`] before the store is
/// touched. Slack receivers are created from OAuth credentials; the service
/// exchanges them for a bot token and stores only `token` and `workspace`.
#[derive(Clone)]
pub struct ReceiverService {
    store: Arc<dyn ReceiverStore>,
    slack: Arc<dyn SlackClientFactory>,
}

impl ReceiverService {
    pub fn new(store: Arc<dyn ReceiverStore>, slack: Arc<dyn SlackClientFactory>) -> Self {
        Self { store, slack }
    }

    pub async fn list(&self) -> Result<Vec<Receiver>, ServiceError> {
        Ok(self.store.list().await?)
    }

    /// Returns the receiver with runtime data attached.
    ///
    /// For Slack receivers `data["channels"]` holds the channels the app has
    /// joined in the receiver's workspace.
    #[instrument(skip(self))]
    pub async fn get(&self, id: u64) -> Result<Receiver, ServiceError> {
        let mut receiver = self
            .store
            .get(id)
            .await?
            .ok_or(ServiceError::NotFound(id))?;

        if receiver.receiver_type == ReceiverType::Slack {
            if let Some(token) = receiver.configurations.get("token").and_then(Value::as_str) {
                let channels = self.slack.client(token).joined_channels().await.map_err(|e| {
                    warn!(error = %e, "Failed to fetch joined channels");
                    ResolutionError::ChannelListFetchFailed(e.to_string())
                })?;
                let channels = channels
                    .into_iter()
                    .map(|channel| {
                        Value::Map(
                            [
                                ("id".to_string(), Value::from(channel.id)),
                                ("name".to_string(), Value::from(channel.name)),
                            ]
                            .into(),
                        )
                    })
                    .collect::<Vec<_>>();
                receiver.data.insert("channels".to_string(), Value::List(channels));
            }
        }

        Ok(receiver)
    }

    #[instrument(skip(self, receiver), fields(name = %receiver.name, receiver_type = %receiver.receiver_type))]
    pub async fn create(&self, receiver: NewReceiver) -> Result<Receiver, ServiceError> {
        let receiver = self.prepare(receiver).await?;
        let created = self.store.create(receiver).await?;
        metrics::counter!("receivers_written_total", "op" => "create").increment(1);
        info!(id = created.id, "Receiver created");
        Ok(created)
    }

    #[instrument(skip(self, receiver), fields(name = %receiver.name, receiver_type = %receiver.receiver_type))]
    pub async fn update(&self, id: u64, receiver: NewReceiver) -> Result<Receiver, ServiceError> {
        // Slack auth codes are single use, so the id must exist before the exchange.
        self.store.get(id).await?.ok_or(ServiceError::NotFound(id))?;
        let receiver = self.prepare(receiver).await?;
        let updated = self.store.update(id, receiver).await?;
        metrics::counter!("receivers_written_total", "op" => "update").increment(1);
        info!("Receiver updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: u64) -> Result<(), ServiceError> {
        self.store.delete(id).await?;
        metrics::counter!("receivers_written_total", "op" => "delete").increment(1);
        Ok(())
    }

    async fn prepare(&self, mut receiver: NewReceiver) -> Result<NewReceiver, ServiceError> {
        schema::validate(&receiver.receiver_type, &receiver.configurations)?;
        if receiver.receiver_type == ReceiverType::Slack {
            receiver.configurations = self.exchange_slack_code(&receiver.configurations).await?;
        }
        Ok(receiver)
    }

    async fn exchange_slack_code(
        &self,
        configurations: &Configuration,
    ) -> Result<Configuration, ServiceError> {
        let text = |key: &str| {
            configurations
                .get(key)
                .and_then(Value::as_str)
                .ok_or_else(|| ValidationError::MissingConfigKey(key.to_string()))
        };
        let (client_id, client_secret, auth_code) =
            (text("client_id")?, text("client_secret")?, text("auth_code")?);

        let credential = self
            .slack
            .exchange_auth_code(client_id, client_secret, auth_code)
            .await
            .map_err(|e| ServiceError::OAuthExchange(e.to_string()))?;

        Ok(Configuration::from([
            ("token".to_string(), Value::from(credential.access_token)),
            ("workspace".to_string(), Value::from(credential.workspace)),
        ]))
    }
}
