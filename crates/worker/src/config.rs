//! Engine configuration loaded from environment variables.

use std::time::Duration;

use lightwatch_events::dispatcher::{DEFAULT_MAX_IN_FLIGHT, DEFAULT_QUEUE_CAPACITY};
use lightwatch_events::DispatcherConfig;

/// Default seconds between evaluation passes.
pub const DEFAULT_EVAL_INTERVAL_SECS: u64 = 30;

/// Default seconds allowed for notification drain at shutdown.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),
}

/// Log output format for the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// `json` (any case) selects JSON output; anything else is text.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }

    /// Read `LOG_FORMAT` alone, so logging can start before the rest of
    /// the configuration is loaded.
    pub fn from_env() -> Self {
        Self::parse(std::env::var("LOG_FORMAT").ok().as_deref())
    }
}

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Time between the starts of consecutive evaluation passes.
    pub eval_interval: Duration,
    /// Notification queue and in-flight sizing.
    pub dispatcher: DispatcherConfig,
    /// Time allowed for draining notifications at shutdown.
    pub shutdown_timeout: Duration,
    /// Restrict evaluation to rules of one service.
    pub rule_scope_service: Option<String>,
    /// JSON file of rule definitions to seed at startup.
    pub rules_seed_file: Option<String>,
    pub log_format: LogFormat,
}

impl EngineConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                 | Default    |
    /// |-------------------------|------------|
    /// | `DATABASE_URL`          | (required) |
    /// | `EVAL_INTERVAL_SECS`    | `30`       |
    /// | `NOTIFY_QUEUE_CAPACITY` | `256`      |
    /// | `NOTIFY_MAX_IN_FLIGHT`  | `16`       |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `10`       |
    /// | `RULE_SCOPE_SERVICE`    | unset      |
    /// | `RULES_SEED_FILE`       | unset      |
    /// | `LOG_FORMAT`            | `text`     |
    ///
    /// Unparsable or zero numeric values fall back to their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            non_empty(lookup("DATABASE_URL")).ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let eval_interval_secs =
            positive_or_default(&lookup, "EVAL_INTERVAL_SECS", DEFAULT_EVAL_INTERVAL_SECS);
        let queue_capacity =
            positive_or_default(&lookup, "NOTIFY_QUEUE_CAPACITY", DEFAULT_QUEUE_CAPACITY as u64);
        let max_in_flight =
            positive_or_default(&lookup, "NOTIFY_MAX_IN_FLIGHT", DEFAULT_MAX_IN_FLIGHT as u64);
        let shutdown_timeout_secs =
            positive_or_default(&lookup, "SHUTDOWN_TIMEOUT_SECS", DEFAULT_SHUTDOWN_TIMEOUT_SECS);

        let log_format = LogFormat::parse(lookup("LOG_FORMAT").as_deref());

        Ok(Self {
            database_url,
            eval_interval: Duration::from_secs(eval_interval_secs),
            dispatcher: DispatcherConfig {
                queue_capacity: queue_capacity as usize,
                max_in_flight: max_in_flight as usize,
            },
            shutdown_timeout: Duration::from_secs(shutdown_timeout_secs),
            rule_scope_service: non_empty(lookup("RULE_SCOPE_SERVICE")),
            rules_seed_file: non_empty(lookup("RULES_SEED_FILE")),
            log_format,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn positive_or_default<F>(lookup: &F, key: &str, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => value,
        _ => {
            tracing::warn!(
                key,
                value = %raw,
                default,
                "Invalid configuration value, using default"
            );
            default
        }
    }
}
