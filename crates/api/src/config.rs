//! Server configuration

use crate::error::{ApiError, ApiResult};

/// API server configuration, loaded from the environment
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// Postgres connection URL
    pub database_url: String,
}

impl Config {
    /// Create config from environment variables
    pub fn from_env() -> ApiResult<Self> {
        Ok(Self {
            bind_address: std::env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| ApiError::Config("DATABASE_URL not set".to_string()))?,
        })
    }
}
