//! Configuration loaded from environment variables.

use std::env;

use anyhow::{Context, Result, bail};

use crate::listing::ValidationMode;

/// Storage engine selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// PostgreSQL at the given connection URL.
    Postgres { database_url: String },

    /// In-process tables. Nothing survives a restart.
    Memory,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// Storage engine (`STORE_BACKEND`, default: postgres).
    pub store: StoreBackend,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// How listing query parameters are validated (default: lenient).
    pub listing_validation: ValidationMode,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,

    /// Currency symbol for formatted prices (default: "$").
    pub currency_symbol: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            store: StoreBackend::Memory,
            database_max_connections: 10,
            listing_validation: ValidationMode::Lenient,
            cors_allowed_origins: vec!["*".to_string()],
            currency_symbol: "$".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let backend = env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .trim()
            .to_lowercase();
        let store = match backend.as_str() {
            "postgres" => StoreBackend::Postgres {
                database_url: env::var("DATABASE_URL")
                    .context("DATABASE_URL environment variable is required")?,
            },
            "memory" => StoreBackend::Memory,
            other => bail!("STORE_BACKEND must be 'postgres' or 'memory', got '{other}'"),
        };

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let listing_validation = env::var("LISTING_VALIDATION")
            .unwrap_or_else(|_| "lenient".to_string())
            .parse()
            .context("LISTING_VALIDATION must be 'lenient' or 'strict'")?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["*".to_string()]);

        let currency_symbol = env::var("CURRENCY_SYMBOL").unwrap_or_else(|_| "$".to_string());

        Ok(Self {
            port,
            store,
            database_max_connections,
            listing_validation,
            cors_allowed_origins,
            currency_symbol,
        })
    }
}
