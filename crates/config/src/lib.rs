//! Folio configuration structures to map the relay.toml configuration.

#![deny(missing_docs)]

mod cors;
mod health;
mod loader;
mod relay;
mod server;

use std::path::Path;

pub use cors::{AnyOrList, CorsConfig, HttpMethod};
pub use health::HealthConfig;
pub use relay::{DEFAULT_BASE_URL, DEFAULT_MODEL, RelayConfig};
use serde::Deserialize;
pub use server::ServerConfig;

/// Main configuration structure for the Folio relay.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Chat relay and upstream API settings.
    #[serde(default)]
    pub relay: RelayConfig,
}

impl Config {
    /// Load configuration from a file path, expanding `{{ env.NAME }}` references.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
        loader::load(path)
    }

    /// Parse configuration from TOML text, expanding `{{ env.NAME }}` references.
    pub fn parse(content: &str) -> anyhow::Result<Config> {
        loader::parse(content)
    }

    /// Check that the configuration can serve requests: an upstream credential
    /// is present and all mounted paths are absolute.
    pub fn validate(&self) -> anyhow::Result<()> {
        loader::validate(self)
    }
}
