//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CACHE_TTL_HOURS, DEFAULT_GRACE_PERIOD_MINUTES,
    DEFAULT_LOOKUP_BASE_URL, DEFAULT_LOOKUP_RESULT_LIMIT, DEFAULT_LOOKUP_TIMEOUT_SECS,
    DEFAULT_MAX_SNOOZES, DEFAULT_SCAN_CRON, DEFAULT_SNOOZE_OPTIONS_MINUTES,
};
use crate::{MedMinderError, Result};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reminders: ReminderConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub lookup: LookupConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Reminder scanning, grace and snooze configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// Minutes after the scheduled time during which a dose is still due.
    pub grace_period_minutes: u32,
    /// Snoozes allowed per dose instance before it stops being offered.
    pub max_snoozes: u32,
    /// Six-field cron expression driving the periodic scan.
    pub scan_cron: String,
    pub snooze_options_minutes: Vec<u32>,
    /// Mark doses missed when their grace window elapses without action.
    pub sweep_missed: bool,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            grace_period_minutes: DEFAULT_GRACE_PERIOD_MINUTES,
            max_snoozes: DEFAULT_MAX_SNOOZES,
            scan_cron: DEFAULT_SCAN_CRON.to_string(),
            snooze_options_minutes: DEFAULT_SNOOZE_OPTIONS_MINUTES.to_vec(),
            sweep_missed: true,
        }
    }
}

/// Local fast-lookup cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_entries: u64,
    /// Keys are day-scoped, so a TTL longer than a day acts as the daily reset.
    pub ttl_hours: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_entries: DEFAULT_CACHE_MAX_ENTRIES, ttl_hours: DEFAULT_CACHE_TTL_HOURS }
    }
}

/// Medication name lookup configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub result_limit: u32,
    pub enabled: bool,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LOOKUP_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_LOOKUP_TIMEOUT_SECS,
            result_limit: DEFAULT_LOOKUP_RESULT_LIMIT,
            enabled: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

impl Config {
    /// Reject configurations the reminder engine cannot run with.
    ///
    /// # Errors
    /// Returns `MedMinderError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.reminders.grace_period_minutes == 0 {
            return Err(MedMinderError::Config("grace_period_minutes must be positive".into()));
        }
        if self.reminders.max_snoozes == 0 {
            return Err(MedMinderError::Config("max_snoozes must be positive".into()));
        }
        if self.reminders.snooze_options_minutes.is_empty()
            || self.reminders.snooze_options_minutes.contains(&0)
        {
            return Err(MedMinderError::Config(
                "snooze_options_minutes must list positive durations".into(),
            ));
        }
        if self.cache.max_entries == 0 {
            return Err(MedMinderError::Config("cache.max_entries must be positive".into()));
        }
        Ok(())
    }
}
