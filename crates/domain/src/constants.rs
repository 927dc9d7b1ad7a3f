//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Reminder window configuration
pub const DEFAULT_GRACE_PERIOD_MINUTES: u32 = 120;
pub const DEFAULT_MAX_SNOOZES: u32 = 3;
pub const DEFAULT_SCAN_CRON: &str = "0 * * * * *";
pub const DEFAULT_SNOOZE_OPTIONS_MINUTES: [u32; 3] = [5, 10, 30];

// Inventory amounts are exact fractions with at most this denominator
pub const MAX_AMOUNT_DENOMINATOR: i64 = 1000;

// Intake reasons
pub const GRACE_EXPIRED_REASON: &str = "Grace period expired";
pub const DEFAULT_MISSED_REASON: &str = "No reason provided";

// Local cache configuration
pub const DEFAULT_CACHE_MAX_ENTRIES: u64 = 10_000;
pub const DEFAULT_CACHE_TTL_HOURS: u64 = 48;
pub const RESOLVED_CACHE_PREFIX: &str = "intake";
pub const SNOOZE_CACHE_PREFIX: &str = "snooze";

// Medication name lookup
pub const DEFAULT_LOOKUP_BASE_URL: &str = "https://api.fda.gov/drug/label.json";
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_LOOKUP_RESULT_LIMIT: u32 = 20;
pub const MIN_LOOKUP_QUERY_LEN: usize = 2;
pub const UNKNOWN_MEDICATION_NAME: &str = "Unknown";
