//! Construction of the outbound platform clients from configuration.

use crate::config::Config;
use crate::notification::http::HttpNotifier;
use crate::notification::pagerduty::PagerDutyNotifier;
use crate::notification::slack::api::{SlackClientFactory, SlackHttpFactory};
use crate::notification::slack::SlackNotifier;
use crate::notification::NotifierRegistry;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Builds the Slack client factory backed by the real Web API.
pub fn slack_factory(config: &Config) -> Result<Arc<dyn SlackClientFactory>> {
    let factory = SlackHttpFactory::new(config.slack.api_base_url.clone(), config.slack.timeout())
        .context("failed to build Slack HTTP client")?;
    Ok(Arc::new(factory))
}

/// Registers one notifier per supported receiver type.
///
/// The Slack notifier shares `slack` with the receiver service, so both talk
/// to the same workspace client.
pub fn setup_notifiers(
    config: &Config,
    slack: Arc<dyn SlackClientFactory>,
) -> Result<NotifierRegistry> {
    let pagerduty = PagerDutyNotifier::new(
        config.pagerduty.events_url.clone(),
        config.pagerduty.timeout(),
    )
    .context("failed to build PagerDuty HTTP client")?;
    let http = HttpNotifier::new(config.http.timeout()).context("failed to build webhook HTTP client")?;

    let registry = NotifierRegistry::new()
        .with(Arc::new(SlackNotifier::new(slack)))
        .with(Arc::new(pagerduty))
        .with(Arc::new(http));
    info!(notifiers = ?registry, "Notifiers registered.");
    Ok(registry)
}
