//! Config module contains the initial configuration of the app.

use std::env;

use config_crate::{Config as RawConfig, ConfigError, Environment, File};

/// Basic settings - queue, db and server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: Server,
    pub jwt: JWT,
    pub sentry: Option<SentryConfig>,
}

/// Common server settings
#[derive(Debug, Deserialize, Clone)]
pub struct Server {
    pub host: String,
    pub port: String,
    pub database: String,
    pub thread_count: usize,
}

/// Json Web Token seettings
#[derive(Debug, Deserialize, Clone)]
pub struct JWT {
    pub secret_key: String,
}

/// Sentry settings
#[derive(Debug, Deserialize, Clone)]
pub struct SentryConfig {
    pub dsn: String,
}

impl Config {
    /// Creates config from base.toml, which can be overwritten by a
    /// `config/<env>.toml` file where env comes from RUN_MODE, and after that
    /// by environment variables like MARKETPLACE_SERVER_PORT.
    pub fn new() -> Result<Self, ConfigError> {
        let env = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut s = RawConfig::new();
        s.merge(File::with_name("config/base"))?;
        s.merge(File::with_name(&format!("config/{}", env)).required(false))?;

        s.merge(Environment::with_prefix("MARKETPLACE"))?;

        s.try_into()
    }
}
