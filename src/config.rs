use dotenvy::dotenv;
use std::env;
use std::sync::{Arc, OnceLock};

/// ✅ Global Config stored in `OnceLock`
static CONFIG: OnceLock<Arc<Config>> = OnceLock::new();

#[derive(Clone, Debug)]
pub struct Config {
    /// Days after the week start before a submission counts as late.
    pub late_grace_days: i64,
    /// TTL for cached supervision scopes.
    pub scope_cache_ttl_secs: u64,
    pub scope_cache_capacity: u64,
    /// Reject a second timesheet for the same (employee, week) on create.
    pub enforce_unique_week: bool,
}

impl Config {
    /// ✅ Load environment variables and set defaults
    pub fn from_env() -> Self {
        dotenv().ok(); // Load .env only once

        Self {
            late_grace_days: env::var("LATE_GRACE_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(7),
            scope_cache_ttl_secs: env::var("SCOPE_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(600),
            scope_cache_capacity: env::var("SCOPE_CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            enforce_unique_week: env::var("ENFORCE_UNIQUE_WEEK")
                .map(|v| v != "false")
                .unwrap_or(true),
        }
    }

    /// ✅ Safe access to Config, initialized lazily
    pub fn get() -> Arc<Config> {
        CONFIG.get_or_init(|| Arc::new(Self::from_env())).clone()
    }
}
