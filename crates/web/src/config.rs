use anyhow::{Context, Result, ensure};
use storage::services::scan_transaction::DEFAULT_MAX_ATTEMPTS;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub api_keys: String,
    pub admin_api_keys: String,
    pub scan_max_attempts: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let scan_max_attempts = match std::env::var("SCAN_MAX_ATTEMPTS") {
            Ok(value) => value
                .parse()
                .context("SCAN_MAX_ATTEMPTS must be a positive number")?,
            Err(_) => DEFAULT_MAX_ATTEMPTS,
        };
        ensure!(scan_max_attempts >= 1, "SCAN_MAX_ATTEMPTS must be at least 1");

        let database_max_connections = match std::env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(value) => value
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a number")?,
            Err(_) => 10,
        };

        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("Cannot load PORT env variable")?
                .parse()
                .context("PORT must be a number")?,
            database_url: std::env::var("DATABASE_URL")
                .context("Cannot load DATABASE_URL env variable")?,
            database_max_connections,
            api_keys: std::env::var("API_KEYS").unwrap_or_default(),
            admin_api_keys: std::env::var("ADMIN_API_KEYS").unwrap_or_default(),
            scan_max_attempts,
        })
    }
}
