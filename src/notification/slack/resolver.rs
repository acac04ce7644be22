//! Resolves Slack target names to platform ids and checks that the app may post there.

use crate::core::SlackTargetKind;
use crate::error::ResolutionError;
use crate::notification::slack::api::SlackApi;
use tracing::{debug, instrument, warn};

/// Turns a human-readable Slack target into a user or channel id.
///
/// Users are looked up by email. Channels are matched by exact,
/// case-sensitive name against the channels the app has joined; a channel
/// the app was never invited to is reported as [`ResolutionError::NotChannelMember`]
/// rather than being left for `chat.postMessage` to reject.
///
/// Nothing is retried or cached.
#[instrument(skip(client))]
pub async fn resolve_and_authorize(
    client: &dyn SlackApi,
    target_name: &str,
    target_kind: SlackTargetKind,
) -> Result<String, ResolutionError> {
    match target_kind {
        SlackTargetKind::User => client
            .lookup_user_by_email(target_name)
            .await
            .map_err(|e| {
                warn!(error = %e, "Slack user lookup failed");
                ResolutionError::UserLookupFailed {
                    email: target_name.to_string(),
                    message: e.to_string(),
                }
            }),
        SlackTargetKind::Channel => {
            let channels = client
                .joined_channels()
                .await
                .map_err(|e| ResolutionError::ChannelListFetchFailed(e.to_string()))?;
            debug!(joined = channels.len(), "Fetched joined channels");

            channels
                .into_iter()
                .find(|channel| channel.name == target_name)
                .map(|channel| channel.id)
                .ok_or_else(|| ResolutionError::NotChannelMember(target_name.to_string()))
        }
    }
}
