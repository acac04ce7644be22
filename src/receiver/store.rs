//! An in-process receiver store.

use crate::core::{NewReceiver, Receiver, ReceiverStore};
use crate::error::StoreError;
use crate::value::Configuration;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Keeps receivers in memory, keyed by id.
///
/// Ids start at 1 and are never reused. Reads return clones, so no lock is
/// held once a call returns.
pub struct InMemoryReceiverStore {
    receivers: RwLock<BTreeMap<u64, Receiver>>,
    next_id: AtomicU64,
}

impl InMemoryReceiverStore {
    pub fn new() -> Self {
        Self {
            receivers: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryReceiverStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReceiverStore for InMemoryReceiverStore {
    async fn list(&self) -> Result<Vec<Receiver>, StoreError> {
        Ok(self.receivers.read().await.values().cloned().collect())
    }

    async fn get(&self, id: u64) -> Result<Option<Receiver>, StoreError> {
        Ok(self.receivers.read().await.get(&id).cloned())
    }

    async fn create(&self, receiver: NewReceiver) -> Result<Receiver, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let now = Utc::now();
        let created = Receiver {
            id,
            name: receiver.name,
            receiver_type: receiver.receiver_type,
            labels: receiver.labels,
            configurations: receiver.configurations,
            data: Configuration::new(),
            created_at: now,
            updated_at: now,
        };
        self.receivers.write().await.insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: u64, receiver: NewReceiver) -> Result<Receiver, StoreError> {
        let mut receivers = self.receivers.write().await;
        let existing = receivers.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        existing.name = receiver.name;
        existing.receiver_type = receiver.receiver_type;
        existing.labels = receiver.labels;
        existing.configurations = receiver.configurations;
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn delete(&self, id: u64) -> Result<(), StoreError> {
        self.receivers.write().await.remove(&id);
        Ok(())
    }
}
