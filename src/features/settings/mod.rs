//! # Settings Feature
//!
//! User-editable settings persisted as JSON values in the `settings` table.
//! Settings are loaded fresh for every check or request; nothing is cached
//! in process state.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Environment credentials override stored integration settings
//! - 1.0.0: Theme, schedule and integration settings

use anyhow::{anyhow, Result};
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::Config;
use crate::database::Database;
use crate::features::notifications::NotificationSchedule;

pub const THEME_KEY: &str = "theme";
pub const SCHEDULE_KEY: &str = "notification_schedule";
pub const DAILY_SUMMARY_KEY: &str = "daily_summary_enabled";
pub const PUSHOVER_KEY: &str = "pushover";
pub const CALDAV_KEY: &str = "caldav";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(anyhow!("Invalid theme: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushoverSettings {
    pub enabled: bool,
    pub user_key: String,
    pub api_token: String,
    pub device: String,
    pub sound: String,
}

impl Default for PushoverSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            user_key: String::new(),
            api_token: String::new(),
            device: String::new(),
            sound: "pushover".to_string(),
        }
    }
}

impl PushoverSettings {
    /// Apply `PUSHOVER_USER_KEY` / `PUSHOVER_API_TOKEN` over stored values
    pub fn with_env(mut self, config: &Config) -> Self {
        if let Some(key) = &config.pushover_user_key {
            self.user_key = key.clone();
        }
        if let Some(token) = &config.pushover_api_token {
            self.api_token = token.clone();
        }
        self
    }

    pub fn is_configured(&self) -> bool {
        self.enabled && !self.user_key.trim().is_empty() && !self.api_token.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaldavSettings {
    pub enabled: bool,
    #[serde(rename = "caldav_url")]
    pub url: String,
    pub username: String,
    pub password: String,
    pub calendar_name: String,
}

impl Default for CaldavSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            url: String::new(),
            username: String::new(),
            password: String::new(),
            calendar_name: "Passport Renewals".to_string(),
        }
    }
}

impl CaldavSettings {
    /// Apply `CALDAV_URL` over the stored server URL
    pub fn with_env(mut self, config: &Config) -> Self {
        if let Some(url) = &config.caldav_url {
            self.url = url.clone();
        }
        self
    }

    pub fn is_configured(&self) -> bool {
        self.enabled
            && !self.url.trim().is_empty()
            && !self.username.trim().is_empty()
            && !self.password.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    pub theme: Theme,
    pub notification_schedule: NotificationSchedule,
    pub daily_summary_enabled: bool,
    pub pushover: PushoverSettings,
    pub caldav: CaldavSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            notification_schedule: NotificationSchedule::default(),
            daily_summary_enabled: true,
            pushover: PushoverSettings::default(),
            caldav: CaldavSettings::default(),
        }
    }
}

impl AppSettings {
    /// Read every setting, falling back to defaults for missing keys
    ///
    /// A stored value that no longer parses is logged and replaced by its
    /// default so one bad key cannot stall the scheduler.
    pub async fn load(db: &Database) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            theme: load_key(db, THEME_KEY, defaults.theme).await?,
            notification_schedule: load_key(db, SCHEDULE_KEY, defaults.notification_schedule)
                .await?,
            daily_summary_enabled: load_key(db, DAILY_SUMMARY_KEY, defaults.daily_summary_enabled)
                .await?,
            pushover: load_key(db, PUSHOVER_KEY, defaults.pushover).await?,
            caldav: load_key(db, CALDAV_KEY, defaults.caldav).await?,
        })
    }

    pub async fn save(&self, db: &Database) -> Result<()> {
        db.set_setting_json(THEME_KEY, &self.theme).await?;
        db.set_setting_json(SCHEDULE_KEY, &self.notification_schedule).await?;
        db.set_setting_json(DAILY_SUMMARY_KEY, &self.daily_summary_enabled).await?;
        db.set_setting_json(PUSHOVER_KEY, &self.pushover).await?;
        db.set_setting_json(CALDAV_KEY, &self.caldav).await?;
        Ok(())
    }

    /// Replace the schedule from its comma-separated text form
    pub fn set_schedule_text(&mut self, text: &str) -> Result<()> {
        self.notification_schedule = NotificationSchedule::parse_list(text)?;
        Ok(())
    }
}

/// Read one JSON setting; a missing or unparsable value yields `default`
pub(crate) async fn load_key<T: DeserializeOwned>(db: &Database, key: &str, default: T) -> Result<T> {
    let Some(raw) = db.get_setting(key).await? else {
        return Ok(default);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(value),
        Err(e) => {
            warn!("Setting '{}' is not valid ({}); using default", key, e);
            Ok(default)
        }
    }
}

/// Which integrations have enough configuration to be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntegrationStatus {
    pub pushover: bool,
    pub caldav: bool,
    pub smtp: bool,
    pub tunnel: bool,
}

impl IntegrationStatus {
    pub fn from_settings(settings: &AppSettings, config: &Config) -> Self {
        Self {
            pushover: settings.pushover.clone().with_env(config).is_configured(),
            caldav: settings.caldav.clone().with_env(config).is_configured(),
            smtp: config.smtp_server.is_some(),
            tunnel: config.cf_tunnel_token.is_some(),
        }
    }
}
