//! Configuration management for receiverd
//!
//! This module defines the main `Config` struct and its sub-structs. It uses
//! the `figment` crate to layer built-in defaults, a `receiverd.toml` file,
//! `RECEIVERD_` environment variables and command-line arguments, in that
//! order of precedence.

use crate::cli::Cli;
use crate::notification::pagerduty::DEFAULT_EVENTS_URL;
use crate::notification::slack::api::DEFAULT_API_BASE_URL;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "receiverd.toml";

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// The logging level, in `tracing_subscriber::EnvFilter` syntax.
    pub log_level: String,
    pub server: ServerConfig,
    pub metrics: MetricsConfig,
    pub slack: SlackConfig,
    pub pagerduty: PagerDutyConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerConfig {
    /// Address the API server binds to.
    pub listen_address: SocketAddr,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MetricsConfig {
    /// Install the Prometheus recorder and serve `/metrics`.
    pub enabled: bool,
}

/// Slack Web API settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SlackConfig {
    pub api_base_url: String,
    pub timeout_seconds: u64,
}

/// PagerDuty Events API settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PagerDutyConfig {
    pub events_url: String,
    pub timeout_seconds: u64,
}

/// Outbound webhook settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
}

impl SlackConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl PagerDutyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Config {
    /// Loads the application configuration.
    ///
    /// The file named by `--config` is used if given, otherwise
    /// `receiverd.toml` in the working directory. A missing file is not an
    /// error; the defaults apply.
    pub fn load(cli: &Cli) -> Result<Self> {
        let path = cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            // e.g. RECEIVERD_SERVER__LISTEN_ADDRESS=0.0.0.0:8080
            .merge(Env::prefixed("RECEIVERD_").split("__"))
            .merge(cli.clone())
            .extract()?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            server: ServerConfig {
                listen_address: SocketAddr::from(([127, 0, 0, 1], 8080)),
            },
            metrics: MetricsConfig { enabled: true },
            slack: SlackConfig {
                api_base_url: DEFAULT_API_BASE_URL.to_string(),
                timeout_seconds: 10,
            },
            pagerduty: PagerDutyConfig {
                events_url: DEFAULT_EVENTS_URL.to_string(),
                timeout_seconds: 10,
            },
            http: HttpConfig { timeout_seconds: 10 },
        }
    }
}
