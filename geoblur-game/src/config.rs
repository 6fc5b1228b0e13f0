//! Presentation and platform knobs. Gameplay rules stay in `constants`.
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::clock::resolve_zone;
use crate::constants::{
    DEFAULT_REFERENCE_TIMEZONE, DEFAULT_ROLLOVER_POLL_SECS, DEFAULT_SHARE_URL,
    DEFAULT_STORAGE_PREFIX, STORAGE_DAILY_SUFFIX, STORAGE_STATS_SUFFIX,
};
use crate::day_index::{DayIndex, default_epoch};
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "GameConfig::default_reference_timezone")]
    pub reference_timezone: String,
    #[serde(default = "default_epoch")]
    pub epoch: NaiveDate,
    #[serde(default = "GameConfig::default_rollover_poll_secs")]
    pub rollover_poll_secs: u64,
    #[serde(default = "GameConfig::default_share_url")]
    pub share_url: String,
    #[serde(default = "GameConfig::default_storage_prefix")]
    pub storage_prefix: String,
}

impl GameConfig {
    fn default_reference_timezone() -> String {
        DEFAULT_REFERENCE_TIMEZONE.to_string()
    }

    const fn default_rollover_poll_secs() -> u64 {
        DEFAULT_ROLLOVER_POLL_SECS
    }

    fn default_share_url() -> String {
        DEFAULT_SHARE_URL.to_string()
    }

    fn default_storage_prefix() -> String {
        DEFAULT_STORAGE_PREFIX.to_string()
    }

    /// Parse and validate a JSON config; missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is out of range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error for a zero poll interval or an empty storage prefix.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rollover_poll_secs == 0 {
            return Err(ConfigError::PollInterval(self.rollover_poll_secs));
        }
        if self.storage_prefix.trim().is_empty() {
            return Err(ConfigError::EmptyStoragePrefix);
        }
        Ok(())
    }

    /// Configured zone, or the default reference zone if the name is unknown.
    #[must_use]
    pub fn zone(&self) -> Tz {
        resolve_zone(&self.reference_timezone)
    }

    #[must_use]
    pub const fn day_index(&self) -> DayIndex {
        DayIndex::new(self.epoch)
    }

    #[must_use]
    pub const fn rollover_poll_interval(&self) -> Duration {
        Duration::from_secs(self.rollover_poll_secs)
    }

    #[must_use]
    pub fn daily_storage_key(&self) -> String {
        format!("{}.{STORAGE_DAILY_SUFFIX}", self.storage_prefix.trim())
    }

    #[must_use]
    pub fn stats_storage_key(&self) -> String {
        format!("{}.{STORAGE_STATS_SUFFIX}", self.storage_prefix.trim())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            reference_timezone: Self::default_reference_timezone(),
            epoch: default_epoch(),
            rollover_poll_secs: Self::default_rollover_poll_secs(),
            share_url: Self::default_share_url(),
            storage_prefix: Self::default_storage_prefix(),
        }
    }
}
