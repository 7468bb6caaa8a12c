//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::config::db::DbSettings;
use crate::error::AppError;
use crate::services::round_scheduler::SchedulerConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db: DbSettings,
    pub scheduler: SchedulerConfig,
    /// JSON catalog seeded at startup when set.
    pub catalog_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let host = env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_var::<u16>("BACKEND_PORT", 3001)?;
        let db = DbSettings::from_env()?;

        let countdown_secs = parse_var::<u32>("COUNTDOWN_SECS", 5)?;
        let tick_ms = parse_var::<u64>("COUNTDOWN_TICK_MS", 1000)?;
        let settle_ms = parse_var::<u64>("QUESTION_SETTLE_MS", 500)?;
        let scheduler = SchedulerConfig {
            countdown_secs,
            tick: Duration::from_millis(tick_ms),
            settle: Duration::from_millis(settle_ms),
        };

        let catalog_path = env::var("CATALOG_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            host,
            port,
            db,
            scheduler,
            catalog_path,
        })
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AppError::config(format!("{name} has an invalid value: '{raw}'"))),
        Err(_) => Ok(default),
    }
}
