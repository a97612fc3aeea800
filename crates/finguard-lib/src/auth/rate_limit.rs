// ============================
// crates/finguard-lib/src/auth/rate_limit.rs
// ============================
//! Sliding-window rate limiting with temporary blocks.
//!
//! Each `(identifier, action)` pair keeps the timestamps of its recent
//! attempts. Once the window holds `max_attempts` of them the pair is blocked
//! for `block_duration`. The block and the window expire independently.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use metrics::counter;

use crate::audit::{AuditEventType, AuditLogger, Metadata};
use crate::clock::Clock;
use crate::metrics::{RATE_LIMIT_ALLOWED, RATE_LIMIT_BLOCKED, RATE_LIMIT_DENIED, RATE_LIMIT_PURGED};

/// Auth limiter window (15 minutes)
pub const AUTH_WINDOW: Duration = Duration::from_secs(15 * 60);
/// Auth limiter attempts per window
pub const AUTH_MAX_ATTEMPTS: u32 = 5;
/// Auth limiter block (30 minutes)
pub const AUTH_BLOCK_DURATION: Duration = Duration::from_secs(30 * 60);

/// General limiter window (5 minutes)
pub const GENERAL_WINDOW: Duration = Duration::from_secs(5 * 60);
/// General limiter attempts per window
pub const GENERAL_MAX_ATTEMPTS: u32 = 20;
/// General limiter block (5 minutes)
pub const GENERAL_BLOCK_DURATION: Duration = Duration::from_secs(5 * 60);

/// Immutable limiter configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    window: Duration,
    max_attempts: u32,
    block_duration: Duration,
}

impl RateLimitConfig {
    pub fn new(window: Duration, max_attempts: u32, block_duration: Duration) -> Self {
        Self {
            window,
            max_attempts,
            block_duration,
        }
    }

    /// Stricter limits for sign-in and sign-up
    pub fn auth() -> Self {
        Self::new(AUTH_WINDOW, AUTH_MAX_ATTEMPTS, AUTH_BLOCK_DURATION)
    }

    /// Looser limits for everything else
    pub fn general() -> Self {
        Self::new(GENERAL_WINDOW, GENERAL_MAX_ATTEMPTS, GENERAL_BLOCK_DURATION)
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn block_duration(&self) -> Duration {
        self.block_duration
    }
}

/// Attempt history and block state for one composite key
#[derive(Debug, Clone, Default)]
struct RateLimitWindow {
    /// Non-decreasing attempt times
    attempts: Vec<DateTime<Utc>>,
    /// When the current block ends; kept after it passes
    blocked_until: Option<DateTime<Utc>>,
}

impl RateLimitWindow {
    fn valid_attempts(&self, now: DateTime<Utc>, window: Duration) -> usize {
        self.attempts
            .iter()
            .filter(|ts| within_window(now, **ts, window))
            .count()
    }

    fn prune(&mut self, now: DateTime<Utc>, window: Duration) {
        self.attempts.retain(|ts| within_window(now, *ts, window));
    }

    fn active_block(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.blocked_until.filter(|until| now < *until)
    }
}

fn within_window(now: DateTime<Utc>, ts: DateTime<Utc>, window: Duration) -> bool {
    // a timestamp ahead of `now` (clock stepped back) still counts
    (now - ts).to_std().map_or(true, |elapsed| elapsed < window)
}

fn add_duration(now: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(by)
        .ok()
        .and_then(|by| now.checked_add_signed(by))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Outcome of one check, decided under the key's lock
enum Decision {
    Allowed,
    Blocked { until: DateTime<Utc> },
    Tripped { until: DateTime<Utc>, attempts: usize },
}

/// Rate limiter for `(identifier, action)` pairs.
///
/// Cloning shares the underlying state.
#[derive(Clone)]
pub struct RateLimiter {
    /// Composite key to window
    windows: Arc<DashMap<String, RateLimitWindow>>,
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
    audit: AuditLogger,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimitConfig, clock: Arc<dyn Clock>, audit: AuditLogger) -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
            config,
            clock,
            audit,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    fn key(identifier: &str, action: &str) -> String {
        format!("{identifier}:{action}")
    }

    /// Decide whether a new attempt may proceed, recording it if so.
    ///
    /// The identifier is opaque; it is never parsed. Denials are written to
    /// the audit log as `RATE_LIMIT_EXCEEDED` security events.
    pub async fn check_limit(&self, identifier: &str, action: &str) -> bool {
        let now = self.clock.now();

        // prune, compare and append under the entry lock; released before any await
        let decision = {
            let mut window = self
                .windows
                .entry(Self::key(identifier, action))
                .or_default();

            if let Some(until) = window.active_block(now) {
                Decision::Blocked { until }
            } else {
                window.prune(now, self.config.window);
                let attempts = window.attempts.len();
                if attempts >= self.config.max_attempts as usize {
                    let until = add_duration(now, self.config.block_duration);
                    window.blocked_until = Some(until);
                    Decision::Tripped { until, attempts }
                } else {
                    window.attempts.push(now);
                    Decision::Allowed
                }
            }
        };

        let mut metadata = Metadata::new();
        metadata.insert("identifier".to_string(), identifier.into());
        metadata.insert("action".to_string(), action.into());

        match decision {
            Decision::Allowed => {
                counter!(RATE_LIMIT_ALLOWED).increment(1);
                tracing::debug!(%identifier, %action, "rate limit check passed");
                return true;
            },
            Decision::Blocked { until } => {
                counter!(RATE_LIMIT_DENIED).increment(1);
                tracing::warn!(%identifier, %action, blocked_until = %until, "attempt while blocked");
                metadata.insert("blocked_until".to_string(), until.into());
            },
            Decision::Tripped { until, attempts } => {
                counter!(RATE_LIMIT_DENIED).increment(1);
                counter!(RATE_LIMIT_BLOCKED).increment(1);
                tracing::warn!(%identifier, %action, attempts, blocked_until = %until, "rate limit exceeded, blocking");
                metadata.insert("attempts".to_string(), attempts.into());
            },
        }

        self.audit
            .log_security_event(
                AuditEventType::RateLimitExceeded,
                &format!("Rate limit exceeded for {action} by {identifier}"),
                Some(metadata),
            )
            .await;
        false
    }

    /// Attempts left in the current window. Read-only.
    pub fn remaining_attempts(&self, identifier: &str, action: &str) -> u32 {
        let now = self.clock.now();
        let used = self
            .windows
            .get(&Self::key(identifier, action))
            .map_or(0, |window| window.valid_attempts(now, self.config.window));
        let used = u32::try_from(used).unwrap_or(u32::MAX);
        self.config.max_attempts.saturating_sub(used)
    }

    /// When the current block ends, if the pair is blocked right now
    pub fn blocked_until(&self, identifier: &str, action: &str) -> Option<DateTime<Utc>> {
        let now = self.clock.now();
        self.windows
            .get(&Self::key(identifier, action))
            .and_then(|window| window.active_block(now))
    }

    /// Drop keys with no attempts in the window and no active block.
    ///
    /// Nothing expires on its own; `AppState` calls this once per window.
    pub fn purge_idle(&self) -> usize {
        let now = self.clock.now();
        let window = self.config.window;
        let before = self.windows.len();

        self.windows.retain(|_, state| {
            state.active_block(now).is_some() || state.valid_attempts(now, window) > 0
        });

        let removed = before.saturating_sub(self.windows.len());
        if removed > 0 {
            counter!(RATE_LIMIT_PURGED).increment(removed as u64);
            tracing::debug!(removed, "purged idle rate limit keys");
        }
        removed
    }

    /// Number of keys currently tracked
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}
