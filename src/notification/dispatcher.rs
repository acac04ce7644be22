//! The dispatcher routes a notification request to the notifier that handles
//! its receiver.

use crate::core::{
    NotificationOutcome, NotificationPayload, NotificationRequest, Notifier, Receiver,
    ReceiverStore,
};
use crate::error::DispatchError;
use crate::notification::NotifierRegistry;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

/// Single-shot, stateless notification dispatch.
///
/// Receivers are read from the store on every call and never cached.
/// Failures are returned to the caller as-is; nothing is retried.
pub struct Dispatcher {
    store: Arc<dyn ReceiverStore>,
    notifiers: NotifierRegistry,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn ReceiverStore>, notifiers: NotifierRegistry) -> Self {
        Self { store, notifiers }
    }

    /// Loads the receiver, selects its notifier and sends the notification.
    #[instrument(skip(self, request), fields(receiver_id = request.receiver_id))]
    pub async fn dispatch(
        &self,
        request: &NotificationRequest,
    ) -> Result<NotificationOutcome, DispatchError> {
        let start = Instant::now();
        let receiver = self.load_receiver(request.receiver_id).await?;
        let (notifier, payload) = self.select_notifier(&receiver, request.payload.as_ref())?;

        debug!(receiver_type = %receiver.receiver_type, "Dispatching notification");
        let result = notifier.notify(&receiver, payload).await;

        let outcome = if result.is_ok() { "success" } else { "failure" };
        metrics::counter!(
            "notifications_dispatched_total",
            "receiver_type" => receiver.receiver_type.to_string(),
            "outcome" => outcome
        )
        .increment(1);
        metrics::histogram!(
            "notification_dispatch_duration_seconds",
            "receiver_type" => receiver.receiver_type.to_string()
        )
        .record(start.elapsed().as_secs_f64());

        result
    }

    /// Like [`Dispatcher::dispatch`], but gives up with
    /// [`DispatchError::Cancelled`] as soon as `shutdown` fires. In-flight
    /// platform calls are dropped.
    pub async fn dispatch_until(
        &self,
        request: &NotificationRequest,
        mut shutdown: watch::Receiver<()>,
    ) -> Result<NotificationOutcome, DispatchError> {
        tokio::select! {
            biased;
            Ok(()) = shutdown.changed() => {
                warn!(receiver_id = request.receiver_id, "Notification dispatch cancelled.");
                Err(DispatchError::Cancelled)
            }
            result = self.dispatch(request) => result,
        }
    }

    // A store failure is reported the same way as an unknown id: the caller
    // supplied an id we cannot use.
    async fn load_receiver(&self, id: u64) -> Result<Receiver, DispatchError> {
        match self.store.get(id).await {
            Ok(Some(receiver)) => Ok(receiver),
            Ok(None) => Err(DispatchError::ReceiverLookupFailed(
                "receiver not found".to_string(),
            )),
            Err(e) => {
                warn!(error = %e, "Failed to load receiver for dispatch");
                Err(DispatchError::ReceiverLookupFailed(e.to_string()))
            }
        }
    }

    fn select_notifier<'a>(
        &'a self,
        receiver: &Receiver,
        payload: Option<&'a NotificationPayload>,
    ) -> Result<(&'a Arc<dyn Notifier>, &'a NotificationPayload), DispatchError> {
        let payload = payload
            .filter(|payload| payload.receiver_type() == receiver.receiver_type)
            .ok_or(DispatchError::NotifierNotRegistered)?;
        let notifier = self
            .notifiers
            .get(&receiver.receiver_type)
            .ok_or(DispatchError::NotifierNotRegistered)?;
        Ok((notifier, payload))
    }
}
