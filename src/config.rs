use crate::error::{AppError, Result};

/// Samples per ingest submission. The collector client always reports one
/// listing page at a time, which carries exactly one price per tier.
pub const SAMPLE_BATCH_SIZE: usize = 4;

/// Default trailing window, in days, for the evaluator and both rankings.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 30;

/// Minimum priced samples an item needs before it is eligible for a
/// ranking or a confident resell verdict.
pub const DEFAULT_MIN_SAMPLES: usize = 5;

/// Result cap for both ranking endpoints.
pub const DEFAULT_TOP_N: usize = 50;

/// Default window for the single-item average price query (days).
pub const AVG_PRICE_DEFAULT_DAYS: i64 = 7;

/// Resell heuristic defaults.
pub mod resell_defaults {
    /// observed_price must sit at or below avg * LOW_RATIO to count as low.
    pub const LOW_RATIO: f64 = 0.6;
    /// Fraction of history that must sit strictly above the observed price.
    pub const FRACTION_HIGHER_NEEDED: f64 = 0.5;
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub db_path: String,
    pub api_port: u16,
    /// Reference catalog JSON (items, item types, recipes). Missing file
    /// degrades to an empty catalog at startup (CATALOG_PATH).
    pub catalog_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| "tradepost.db".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            catalog_path: std::env::var("CATALOG_PATH")
                .unwrap_or_else(|_| "catalog.json".to_string()),
        })
    }
}
