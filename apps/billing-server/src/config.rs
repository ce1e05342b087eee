//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults suitable for local development.

use serde::{Deserialize, Serialize};
use std::env;

/// Billing server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server port
    pub http_port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// Company name shown on printed invoices
    pub company_name: String,

    /// Company address shown on printed invoices
    pub company_address: String,

    /// Company phone shown on printed invoices
    pub company_phone: String,

    /// Company email shown on printed invoices
    pub company_email: String,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Ok(ServerConfig {
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./billing.db".to_string()),

            company_name: env::var("COMPANY_NAME")
                .unwrap_or_else(|_| "Sharma Hardware & Traders".to_string()),

            company_address: env::var("COMPANY_ADDRESS")
                .unwrap_or_else(|_| "12 Market Road, Pune 411001".to_string()),

            company_phone: env::var("COMPANY_PHONE")
                .unwrap_or_else(|_| "+91 98765 43210".to_string()),

            company_email: env::var("COMPANY_EMAIL")
                .unwrap_or_else(|_| "billing@sharmahardware.example".to_string()),
        })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
