//! Command-Line Interface (CLI) argument parsing.
//!
//! The arguments are parsed at startup and merged over the configuration
//! file and environment variables, so a flag always wins.

use clap::Parser;
use figment::{
    value::{Dict, Map, Tag, Value},
    Error, Metadata, Profile, Provider,
};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Receiver management and notification dispatch service.
#[derive(Parser, Debug, Default, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address the API server listens on.
    #[arg(short, long, value_name = "ADDR")]
    pub listen_address: Option<SocketAddr>,

    /// Log level or filter directive, e.g. `debug` or `receiverd=trace`.
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Disable the Prometheus `/metrics` endpoint.
    #[arg(long)]
    pub no_metrics: bool,

    /// Base URL of the Slack Web API.
    #[arg(long, value_name = "URL")]
    pub slack_api_url: Option<String>,
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(addr) = self.listen_address {
            let mut server = Dict::new();
            server.insert("listen_address".into(), Value::from(addr.to_string()));
            dict.insert("server".into(), Value::Dict(Tag::Default, server));
        }

        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.clone()));
        }

        // Only an explicit flag overrides; absence leaves the file's value.
        if self.no_metrics {
            let mut metrics = Dict::new();
            metrics.insert("enabled".into(), Value::from(false));
            dict.insert("metrics".into(), Value::Dict(Tag::Default, metrics));
        }

        if let Some(url) = &self.slack_api_url {
            let mut slack = Dict::new();
            slack.insert("api_base_url".into(), Value::from(url.clone()));
            dict.insert("slack".into(), Value::Dict(Tag::Default, slack));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
