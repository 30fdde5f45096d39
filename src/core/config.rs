//! Process configuration read from the environment at startup
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::{anyhow, Result};
use std::env;

pub const DEFAULT_PORT: u16 = 8270;
pub const DEFAULT_DATABASE_PATH: &str = "data/passport_manager.db";
pub const DEFAULT_PHOTO_DIR: &str = "data/photos";
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Value of `TZ`; local time follows it through the C library
    pub timezone: Option<String>,
    /// 64 hex chars (32 bytes) used for document number encryption
    pub encryption_key: String,
    pub cf_tunnel_token: Option<String>,
    pub pushover_user_key: Option<String>,
    pub pushover_api_token: Option<String>,
    pub smtp_server: Option<String>,
    pub caldav_url: Option<String>,
    pub database_path: String,
    pub photo_dir: String,
    pub log_level: String,
    pub check_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup, so tests never touch the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let encryption_key = optional("ENCRYPTION_KEY")
            .ok_or_else(|| anyhow!("ENCRYPTION_KEY environment variable is required"))?;

        let port = match optional("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| anyhow!("Invalid PORT '{}': {}", raw, e))?,
            None => DEFAULT_PORT,
        };

        let check_interval_secs = match optional("CHECK_INTERVAL_SECS") {
            Some(raw) => {
                let secs = raw
                    .parse::<u64>()
                    .map_err(|e| anyhow!("Invalid CHECK_INTERVAL_SECS '{}': {}", raw, e))?;
                if secs == 0 {
                    return Err(anyhow!("CHECK_INTERVAL_SECS must be greater than zero"));
                }
                secs
            }
            None => DEFAULT_CHECK_INTERVAL_SECS,
        };

        Ok(Config {
            port,
            timezone: optional("TZ"),
            encryption_key,
            cf_tunnel_token: optional("CF_TUNNEL_TOKEN"),
            pushover_user_key: optional("PUSHOVER_USER_KEY"),
            pushover_api_token: optional("PUSHOVER_API_TOKEN"),
            smtp_server: optional("SMTP_SERVER"),
            caldav_url: optional("CALDAV_URL"),
            database_path: optional("DATABASE_PATH")
                .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
            photo_dir: optional("PHOTO_DIR").unwrap_or_else(|| DEFAULT_PHOTO_DIR.to_string()),
            log_level: optional("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            check_interval_secs,
        })
    }

    /// Link placed in notifications
    pub fn app_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}
