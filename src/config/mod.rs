use std::env;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgSslMode};
use thiserror::Error;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_APP_NAME: &str = "ticket-purchase-api";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 5;
const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_DB_USER: &str = "postgres";
const DEFAULT_DB_NAME: &str = "tickets";
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Where tickets and purchases are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    /// From `DATABASE_URL` when set, otherwise from the `DB_*` variables.
    pub database: PgConnectOptions,
    /// Session `TimeZone` for every pooled connection (`DB_TIMEZONE`).
    pub db_timezone: Option<String>,
    pub app_name: String,
    pub db_max_connections: u32,
    pub shutdown_timeout: Duration,
    pub cors_allowed_origins: Vec<String>,
    /// `RUST_ENV=production`; turns on HSTS.
    pub production: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let store_backend = match var("STORE_BACKEND") {
            None => StoreBackend::Postgres,
            Some(value) => match value.to_lowercase().as_str() {
                "postgres" => StoreBackend::Postgres,
                "memory" => StoreBackend::Memory,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "STORE_BACKEND",
                        value,
                    })
                }
            },
        };

        let database = match var("DATABASE_URL") {
            // The URL may carry a password, so it is not echoed back.
            Some(url) => url.parse::<PgConnectOptions>().map_err(|_| ConfigError::Invalid {
                name: "DATABASE_URL",
                value: "<unparseable>".to_string(),
            })?,
            None => {
                // Credentials go through setters so URL delimiters in them
                // stay literal.
                let ssl_mode = match var("DB_SSL_MODE") {
                    None => PgSslMode::Disable,
                    Some(value) => value.parse::<PgSslMode>().map_err(|_| ConfigError::Invalid {
                        name: "DB_SSL_MODE",
                        value,
                    })?,
                };
                let options = PgConnectOptions::new()
                    .host(&var("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_string()))
                    .port(parse_or("DB_PORT", var("DB_PORT"), DEFAULT_DB_PORT)?)
                    .username(&var("DB_USER").unwrap_or_else(|| DEFAULT_DB_USER.to_string()))
                    .database(&var("DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.to_string()))
                    .ssl_mode(ssl_mode);
                match var("DB_PASSWORD") {
                    Some(password) => options.password(&password),
                    None => options,
                }
            }
        };

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            host: var("APP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or("APP_PORT", var("APP_PORT"), DEFAULT_PORT)?,
            store_backend,
            database,
            db_timezone: var("DB_TIMEZONE"),
            app_name: var("APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            db_max_connections: parse_or(
                "DB_MAX_CONNECTIONS",
                var("DB_MAX_CONNECTIONS"),
                DEFAULT_MAX_CONNECTIONS,
            )?,
            shutdown_timeout: Duration::from_secs(parse_or(
                "SHUTDOWN_TIMEOUT_SECS",
                var("SHUTDOWN_TIMEOUT_SECS"),
                DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            )?),
            cors_allowed_origins,
            production: var("RUST_ENV")
                .map(|v| v.to_lowercase() == "production")
                .unwrap_or(false),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Connection options with the per-process settings applied.
    pub fn pg_connect_options(&self) -> PgConnectOptions {
        let options = self.database.clone().application_name(&self.app_name);
        match &self.db_timezone {
            Some(timezone) => options.options([("TimeZone", timezone.as_str())]),
            None => options,
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
