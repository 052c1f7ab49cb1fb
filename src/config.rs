//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `DAILY_TRANSFER_LIMIT_PAISE` (optional): per-day cap on outgoing UPI
///   money (transfers + payments) per account, defaults to ₹50,000
/// - `LOCK_TIMEOUT_MS` (optional): bound on row-lock waits, defaults to 5000
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    /// The daily outgoing limit is deployment policy, so it is read from the
    /// environment rather than burned in as a constant.
    #[serde(default = "default_daily_transfer_limit_paise")]
    pub daily_transfer_limit_paise: i64,

    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

/// ₹50,000 in paise.
fn default_daily_transfer_limit_paise() -> i64 {
    5_000_000
}

fn default_lock_timeout_ms() -> u64 {
    5_000
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Parse environment variables into Config struct
        // Field names are automatically converted: database_url -> DATABASE_URL
        envy::from_env::<Config>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_everything_but_the_database_url() {
        let config: Config =
            envy::from_iter([("DATABASE_URL".to_string(), "postgres://x/y".to_string())])
                .expect("config parses");

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.daily_transfer_limit_paise, 5_000_000);
        assert_eq!(config.lock_timeout_ms, 5_000);
    }

    #[test]
    fn daily_limit_is_overridable() {
        let config: Config = envy::from_iter([
            ("DATABASE_URL".to_string(), "postgres://x/y".to_string()),
            (
                "DAILY_TRANSFER_LIMIT_PAISE".to_string(),
                "100000".to_string(),
            ),
        ])
        .expect("config parses");

        assert_eq!(config.daily_transfer_limit_paise, 100_000);
    }
}
