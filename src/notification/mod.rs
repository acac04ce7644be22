//! Delivers notifications to receivers.
//!
//! Each receiver type has one [`Notifier`] implementation, registered in a
//! [`NotifierRegistry`] keyed by type. The [`Dispatcher`] looks up the
//! receiver, picks the notifier for its type and hands it the request, so
//! adding a receiver type never touches the dispatcher.
pub mod dispatcher;
pub mod http;
pub mod pagerduty;
pub mod slack;

pub use dispatcher::Dispatcher;

use crate::core::{Notifier, ReceiverType};
use std::collections::HashMap;
use std::sync::Arc;

/// Notifiers keyed by the receiver type they handle.
#[derive(Clone, Default)]
pub struct NotifierRegistry {
    notifiers: HashMap<ReceiverType, Arc<dyn Notifier>>,
}

impl NotifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a notifier under its own receiver type, replacing any
    /// previous one.
    pub fn register(&mut self, notifier: Arc<dyn Notifier>) -> &mut Self {
        self.notifiers.insert(notifier.receiver_type(), notifier);
        self
    }

    pub fn with(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.register(notifier);
        self
    }

    pub fn get(&self, receiver_type: &ReceiverType) -> Option<&Arc<dyn Notifier>> {
        self.notifiers.get(receiver_type)
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl std::fmt::Debug for NotifierRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set()
            .entries(self.notifiers.keys().map(ReceiverType::as_str))
            .finish()
    }
}
