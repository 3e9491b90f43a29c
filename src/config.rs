use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "trivia.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub run_migrations: bool,
}

impl Settings {
    /// Defaults, then the optional config file, then `TRIVIA_*` variables.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        config::Config::builder()
            .set_default("database_url", "sqlite:trivia.db")?
            .set_default("host", "0.0.0.0")?
            .set_default("port", 5000_i64)?
            .set_default("run_migrations", true)?
            .add_source(file)
            .add_source(config::Environment::with_prefix("TRIVIA"))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn address(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .with_context(|| format!("Host {} is not a valid IP address", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
