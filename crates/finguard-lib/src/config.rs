// ============================
// crates/finguard-lib/src/config.rs
// ============================
//! Configuration management.
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::auth::rate_limit::RateLimitConfig;
use crate::error::AppError;

/// Default config file looked up in the working directory
pub const CONFIG_FILE: &str = "finguard.toml";

/// Prefix for environment overrides, e.g. `FINGUARD_AUTH_LIMITER__MAX_ATTEMPTS`
pub const ENV_PREFIX: &str = "FINGUARD_";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit logs as JSON lines
    pub json_logs: bool,
    /// Directory holding the audit log file
    pub data_dir: PathBuf,
    /// Limiter guarding sign-in and sign-up
    pub auth_limiter: RateLimitSettings,
    /// Limiter for everything else
    pub general_limiter: RateLimitSettings,
    /// Audit log settings
    pub audit: AuditSettings,
}

/// Rate limiter settings, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Rolling window over which attempts are counted
    pub window_ms: u64,
    /// Attempts allowed per window
    pub max_attempts: u32,
    /// Block applied once the window is full
    pub block_duration_ms: u64,
}

/// Audit log settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditSettings {
    /// Entries retained before the oldest are evicted
    pub capacity: usize,
    /// Amount above which a transaction is recorded as large
    pub large_transaction_threshold: f64,
    /// User agent recorded on every entry
    pub user_agent: String,
}

impl RateLimitSettings {
    /// Auth limiter defaults: 5 attempts per 15 minutes, 30 minute block
    pub const AUTH: Self = Self {
        window_ms: 15 * 60 * 1000,
        max_attempts: 5,
        block_duration_ms: 30 * 60 * 1000,
    };

    /// General limiter defaults: 20 attempts per 5 minutes, 5 minute block
    pub const GENERAL: Self = Self {
        window_ms: 5 * 60 * 1000,
        max_attempts: 20,
        block_duration_ms: 5 * 60 * 1000,
    };

    /// Convert into the limiter's configuration
    pub fn to_config(&self) -> RateLimitConfig {
        RateLimitConfig::new(
            Duration::from_millis(self.window_ms),
            self.max_attempts,
            Duration::from_millis(self.block_duration_ms),
        )
    }

    fn validate(&self, name: &str) -> Result<(), AppError> {
        if self.window_ms == 0 {
            return Err(AppError::Config(format!("{name}.window_ms must be positive")));
        }
        if self.max_attempts == 0 {
            return Err(AppError::Config(format!("{name}.max_attempts must be positive")));
        }
        if self.block_duration_ms == 0 {
            return Err(AppError::Config(format!(
                "{name}.block_duration_ms must be positive"
            )));
        }
        Ok(())
    }
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            capacity: 100,
            large_transaction_threshold: 10_000.0,
            user_agent: format!("finguard/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            data_dir: PathBuf::from("data"),
            auth_limiter: RateLimitSettings::AUTH,
            general_limiter: RateLimitSettings::GENERAL,
            audit: AuditSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings: defaults, then `finguard.toml`, then `FINGUARD_` env vars
    pub fn load() -> Result<Self, AppError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load settings with an explicit config file path
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check invariants the rest of the crate relies on
    pub fn validate(&self) -> Result<(), AppError> {
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(AppError::Config(format!(
                "log_level must be one of {LOG_LEVELS:?}, got {}",
                self.log_level
            )));
        }
        self.auth_limiter.validate("auth_limiter")?;
        self.general_limiter.validate("general_limiter")?;

        if self.audit.capacity == 0 {
            return Err(AppError::Config("audit.capacity must be positive".to_string()));
        }
        let threshold = self.audit.large_transaction_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(AppError::Config(
                "audit.large_transaction_threshold must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }

    /// Path of the flat-file audit log
    pub fn audit_log_path(&self) -> PathBuf {
        self.data_dir.join("audit_logs.json")
    }
}
