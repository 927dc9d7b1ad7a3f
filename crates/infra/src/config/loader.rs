//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from `MEDMINDER_*` environment variables
//! 2. If none are set, falls back to loading from file; a set but invalid
//!    variable is an error
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//! 5. Without any source, the built-in defaults apply
//!
//! Every field has a default, so a partial environment or file only
//! overrides what it names. The result is always validated.
//!
//! ## Environment Variables
//! - `MEDMINDER_GRACE_PERIOD_MINUTES`: Minutes a dose stays due after its time
//! - `MEDMINDER_MAX_SNOOZES`: Snoozes allowed per dose
//! - `MEDMINDER_SCAN_CRON`: Cron expression (with seconds) for reminder scans
//! - `MEDMINDER_SNOOZE_OPTIONS`: Comma-separated snooze intervals in minutes
//! - `MEDMINDER_SWEEP_MISSED`: Mark expired doses missed on each scan (true/false)
//! - `MEDMINDER_CACHE_MAX_ENTRIES`: Local cache capacity
//! - `MEDMINDER_CACHE_TTL_HOURS`: Local cache entry lifetime
//! - `MEDMINDER_LOOKUP_BASE_URL`: Medication catalogue endpoint
//! - `MEDMINDER_LOOKUP_TIMEOUT_SECONDS`: Catalogue request timeout
//! - `MEDMINDER_LOOKUP_RESULT_LIMIT`: Catalogue result limit
//! - `MEDMINDER_LOOKUP_ENABLED`: Use the remote catalogue (true/false)
//! - `MEDMINDER_LOG_LEVEL`: Default tracing filter
//! - `MEDMINDER_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./medminder.json` or `./medminder.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use medminder_domain::{Config, MedMinderError, Result};

const ENV_PREFIX: &str = "MEDMINDER_";

const ENV_KEYS: [&str; 13] = [
    "MEDMINDER_GRACE_PERIOD_MINUTES",
    "MEDMINDER_MAX_SNOOZES",
    "MEDMINDER_SCAN_CRON",
    "MEDMINDER_SNOOZE_OPTIONS",
    "MEDMINDER_SWEEP_MISSED",
    "MEDMINDER_CACHE_MAX_ENTRIES",
    "MEDMINDER_CACHE_TTL_HOURS",
    "MEDMINDER_LOOKUP_BASE_URL",
    "MEDMINDER_LOOKUP_TIMEOUT_SECONDS",
    "MEDMINDER_LOOKUP_RESULT_LIMIT",
    "MEDMINDER_LOOKUP_ENABLED",
    "MEDMINDER_LOG_LEVEL",
    "MEDMINDER_LOG_JSON",
];

/// Load configuration with automatic fallback strategy
///
/// Environment variables win when any `MEDMINDER_*` variable is set; an
/// invalid value there is an error, never a silent fallback. Otherwise a
/// probed config file is used, and without one the defaults.
///
/// # Errors
/// Returns `MedMinderError::Config` if a source has invalid values, a file
/// cannot be parsed, or the resulting configuration fails validation.
pub fn load() -> Result<Config> {
    load_with(|key| std::env::var(key).ok(), probe_config_paths)
}

fn load_with(
    var: impl Fn(&str) -> Option<String>,
    probe: impl FnOnce() -> Option<PathBuf>,
) -> Result<Config> {
    if env_configured(&var) {
        let config = load_from_vars(var)?;
        tracing::info!("Configuration loaded from environment variables");
        return Ok(config);
    }

    tracing::debug!("No {ENV_PREFIX}* environment variables set, trying file");
    match probe() {
        Some(path) => load_from_file(Some(path)),
        None => {
            tracing::info!("No config file found; using defaults");
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }
}

fn env_configured(var: &impl Fn(&str) -> Option<String>) -> bool {
    ENV_KEYS.into_iter().any(|key| var(key).is_some())
}

/// Load configuration from environment variables
///
/// Unset variables keep their defaults, but at least one `MEDMINDER_*`
/// variable must be present.
///
/// # Errors
/// Returns `MedMinderError::Config` if no variable is set or a value cannot
/// be parsed.
pub fn load_from_env() -> Result<Config> {
    load_from_vars(|key| std::env::var(key).ok())
}

/// Build a configuration from a variable lookup.
fn load_from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Config> {
    if !env_configured(&var) {
        return Err(MedMinderError::Config(format!("No {ENV_PREFIX}* environment variables set")));
    }

    let mut config = Config::default();
    let reminders = &mut config.reminders;
    override_parsed(&var, "MEDMINDER_GRACE_PERIOD_MINUTES", &mut reminders.grace_period_minutes)?;
    override_parsed(&var, "MEDMINDER_MAX_SNOOZES", &mut reminders.max_snoozes)?;
    if let Some(cron) = var("MEDMINDER_SCAN_CRON") {
        reminders.scan_cron = cron;
    }
    if let Some(options) = var("MEDMINDER_SNOOZE_OPTIONS") {
        reminders.snooze_options_minutes = parse_list("MEDMINDER_SNOOZE_OPTIONS", &options)?;
    }
    reminders.sweep_missed = env_bool(&var, "MEDMINDER_SWEEP_MISSED", reminders.sweep_missed)?;

    override_parsed(&var, "MEDMINDER_CACHE_MAX_ENTRIES", &mut config.cache.max_entries)?;
    override_parsed(&var, "MEDMINDER_CACHE_TTL_HOURS", &mut config.cache.ttl_hours)?;

    let lookup = &mut config.lookup;
    if let Some(url) = var("MEDMINDER_LOOKUP_BASE_URL") {
        lookup.base_url = url;
    }
    override_parsed(&var, "MEDMINDER_LOOKUP_TIMEOUT_SECONDS", &mut lookup.timeout_seconds)?;
    override_parsed(&var, "MEDMINDER_LOOKUP_RESULT_LIMIT", &mut lookup.result_limit)?;
    lookup.enabled = env_bool(&var, "MEDMINDER_LOOKUP_ENABLED", lookup.enabled)?;

    if let Some(level) = var("MEDMINDER_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool(&var, "MEDMINDER_LOG_JSON", config.logging.json)?;

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `MedMinderError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - The parsed configuration fails validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(MedMinderError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            MedMinderError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| MedMinderError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| MedMinderError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| MedMinderError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(MedMinderError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidate_files(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidate_files(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidate_files(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("medminder.json"),
        dir.join("medminder.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
        dir.join("../../config.json"),
        dir.join("../../config.toml"),
    ]
}

fn override_parsed<T>(
    var: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) -> Result<()>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(raw) = var(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|e| MedMinderError::Config(format!("Invalid value for {key}: {e}")))?;
    }
    Ok(())
}

fn parse_list(key: &str, raw: &str) -> Result<Vec<u32>> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<u32>()
                .map_err(|e| MedMinderError::Config(format!("Invalid value for {key}: {e}")))
        })
        .collect()
}

/// Parse boolean from a variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(var: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> Result<bool> {
    let Some(raw) = var(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(MedMinderError::Config(format!("Invalid value for {key}: {raw:?}"))),
    }
}
