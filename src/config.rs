//! Application configuration loaded from environment variables.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// SQLite connection URL (e.g. `sqlite:calisheet.db`)
    pub database_url: String,
    /// JWKS endpoint of the identity provider
    pub jwks_url: String,
    /// Frontend URL for CORS
    pub frontend_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .unwrap_or(8000),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:calisheet.db".to_string()),
            jwks_url: env::var("JWKS_URL").map_err(|_| ConfigError::Missing("JWKS_URL"))?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:8081".to_string()),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            port: 8000,
            database_url: "sqlite::memory:".to_string(),
            jwks_url: "http://localhost:9999/.well-known/jwks.json".to_string(),
            frontend_url: "http://localhost:8081".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
