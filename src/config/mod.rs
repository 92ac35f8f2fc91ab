use anyhow::{Context, Result};
use dotenvy::dotenv;
use serde::Deserialize;

fn default_max_connections() -> u32 {
    5
}

/// Configuration for the application
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,
    /// Upper bound on pooled database connections
    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Variables from a `.env` file are loaded first if the file exists,
    /// then `DATABASE_URL` and `DATABASE_MAX_CONNECTIONS` are read.
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::from_env::<Config>()
            .context("DATABASE_URL must be set in the environment or .env")?;

        Ok(config)
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    let config = Config::load()?;
    tracing::debug!(
        max_connections = config.database_max_connections,
        "configuration loaded"
    );

    Ok(config)
}
