//! Test helpers for running the full application instance.

use anyhow::Result;
use receiverd::{app::App, config::Config, notification::slack::api::SlackClientFactory};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::{sync::watch, task::JoinHandle, time::timeout};

/// A running instance of the application, bound to an ephemeral port.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    shutdown_tx: watch::Sender<()>,
    app_handle: JoinHandle<Result<()>>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Shuts down the application and waits for it to terminate.
    /// Fails if the application does not shut down within the specified timeout.
    pub async fn shutdown(self, timeout_duration: Duration) -> Result<()> {
        self.shutdown_tx
            .send(())
            .expect("Failed to send shutdown signal");

        match timeout(timeout_duration, self.app_handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(anyhow::anyhow!("App failed to shut down within the timeout")),
        }
    }
}

/// A builder for creating `TestApp` instances with specific configurations.
pub struct TestAppBuilder {
    pub config: Config,
    slack_factory: Option<Arc<dyn SlackClientFactory>>,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        let mut config = Config::default();
        config.server.listen_address = SocketAddr::from(([127, 0, 0, 1], 0));
        // The global recorder can only be installed once per process.
        config.metrics.enabled = false;
        Self {
            config,
            slack_factory: None,
        }
    }

    pub fn with_slack_factory(mut self, factory: Arc<dyn SlackClientFactory>) -> Self {
        self.slack_factory = Some(factory);
        self
    }

    pub fn with_config_modifier(mut self, modifier: impl FnOnce(&mut Config)) -> Self {
        modifier(&mut self.config);
        self
    }

    pub async fn build(self) -> Result<TestApp> {
        let (shutdown_tx, shutdown_rx) = watch::channel(());

        let mut builder = App::builder(self.config)
            .metrics_override(PrometheusBuilder::new().build_recorder().handle());
        if let Some(factory) = self.slack_factory {
            builder = builder.slack_factory_override(factory);
        }
        let app = builder.build(shutdown_rx).await?;
        let addr = app.addr();

        Ok(TestApp {
            addr,
            client: reqwest::Client::new(),
            shutdown_tx,
            app_handle: tokio::spawn(app.run()),
        })
    }
}
