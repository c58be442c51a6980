use std::collections::HashMap;
use std::env;

use crate::error::{AppError, AppResult};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mongodb_uri: String,
    pub database_name: String,
    pub bind_address: String,
    pub port: u16,
    pub log_level: String,
    /// Authorization is disabled when unset.
    pub bot_token: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        Self::from_vars(env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> AppResult<Self> {
        let get = |key: &str| vars.get(key).filter(|v| !v.is_empty()).cloned();

        let mongodb_uri = get("MONGODB_URI")
            .ok_or_else(|| AppError::Config("MONGODB_URI environment variable is required".to_string()))?;

        let port = match get("PORT") {
            Some(port) => port
                .parse::<u16>()
                .map_err(|_| AppError::Config(format!("Invalid PORT: {port}")))?,
            None => 8080,
        };

        let log_level = get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()).to_lowercase();
        if !LOG_LEVELS.contains(&log_level.as_str()) {
            return Err(AppError::Config(format!(
                "Invalid LOG_LEVEL: {log_level}. Must be one of: {LOG_LEVELS:?}"
            )));
        }

        Ok(AppConfig {
            mongodb_uri,
            database_name: get("DATABASE_NAME").unwrap_or_else(|| "TripSplit".to_string()),
            bind_address: get("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            log_level,
            bot_token: get("BOT_API_TOKEN"),
        })
    }
}
