//! The main application logic, decoupled from the entry point.

use crate::{
    api::{router, ApiServer, AppState},
    config::Config,
    core::ReceiverStore,
    internal_metrics::MetricsBuilder,
    notification::{slack::api::SlackClientFactory, Dispatcher},
    receiver::{store::InMemoryReceiverStore, ReceiverService},
    services,
};
use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

/// A handle to the running application.
pub struct App {
    addr: SocketAddr,
    server: JoinHandle<()>,
}

impl App {
    /// Creates a new `AppBuilder` to construct an `App`.
    pub fn builder(config: Config) -> AppBuilder {
        AppBuilder::new(config)
    }

    /// The address the API server is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Waits for the API server to drain after the shutdown signal.
    pub async fn run(self) -> Result<()> {
        if let Err(e) = self.server.await {
            error!("API server task panicked: {:?}", e);
        }
        info!("All tasks shut down.");
        Ok(())
    }
}

/// Builder for the main application.
///
/// Keeps construction separate from running, and lets tests swap out the
/// Slack client and the receiver store.
pub struct AppBuilder {
    config: Config,
    slack_factory_override: Option<Arc<dyn SlackClientFactory>>,
    store_override: Option<Arc<dyn ReceiverStore>>,
    metrics_override: Option<PrometheusHandle>,
}

impl AppBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            slack_factory_override: None,
            store_override: None,
            metrics_override: None,
        }
    }

    /// Overrides the Slack client factory for testing.
    pub fn slack_factory_override(mut self, factory: Arc<dyn SlackClientFactory>) -> Self {
        self.slack_factory_override = Some(factory);
        self
    }

    /// Overrides the receiver store for testing.
    pub fn store_override(mut self, store: Arc<dyn ReceiverStore>) -> Self {
        self.store_override = Some(store);
        self
    }

    /// Uses `handle` for `/metrics` instead of installing a global recorder.
    pub fn metrics_override(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_override = Some(handle);
        self
    }

    /// Builds all components, binds the listener and starts serving.
    #[instrument(skip_all)]
    pub async fn build(self, shutdown_rx: watch::Receiver<()>) -> Result<App> {
        let config = self.config;

        let metrics = match self.metrics_override {
            Some(handle) => Some(handle),
            None => MetricsBuilder::new(config.metrics.clone()).build(),
        };

        let slack = match self.slack_factory_override {
            Some(factory) => factory,
            None => services::slack_factory(&config)?,
        };
        let store = self
            .store_override
            .unwrap_or_else(|| Arc::new(InMemoryReceiverStore::new()) as Arc<dyn ReceiverStore>);
        let notifiers = services::setup_notifiers(&config, slack.clone())?;

        let state = AppState {
            service: ReceiverService::new(store.clone(), slack),
            dispatcher: Arc::new(Dispatcher::new(store, notifiers)),
            metrics,
            shutdown: shutdown_rx.clone(),
        };

        let listener = TcpListener::bind(config.server.listen_address)
            .await
            .with_context(|| {
                format!("failed to bind API server to {}", config.server.listen_address)
            })?;
        let addr = listener.local_addr()?;
        info!(%addr, "API server listening.");

        let server = ApiServer::new(listener, router(state), shutdown_rx);
        let server = tokio::spawn(server.run());

        Ok(App { addr, server })
    }
}
