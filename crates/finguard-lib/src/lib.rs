// ============================
// crates/finguard-lib/src/lib.rs
// ============================
//! Security layer for the FinGuard personal-finance app: rate limiting,
//! password strength, audit logging and the authentication flows built on
//! top of them.

pub mod audit;
pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod metrics;
pub mod storage;
pub mod validation;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::audit::{AuditLogger, SessionIdentity};
use crate::auth::{AuthGateway, AuthProvider, InMemoryAuthProvider, RateLimiter};
use crate::clock::{Clock, SystemClock};
use crate::config::Settings;
use crate::storage::{AuditStore, FlatFileAuditStore};

/// Shortest interval between idle-key sweeps
const MIN_SWEEP_PERIOD: Duration = Duration::from_secs(1);

/// Application state shared by every caller
#[derive(Clone)]
pub struct AppState {
    /// Settings the state was built from
    pub settings: Arc<Settings>,
    /// Time source for limiters and audit timestamps
    pub clock: Arc<dyn Clock>,
    /// Who is signed in right now
    pub identity: Arc<SessionIdentity>,
    /// Audit log handle
    pub audit: AuditLogger,
    /// Limiter guarding sign-in and sign-up
    pub auth_limiter: RateLimiter,
    /// Limiter for other sensitive operations
    pub general_limiter: RateLimiter,
    /// Authentication flows
    pub gateway: AuthGateway,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Spawns the audit writer and one idle-key sweeper per limiter, so must
    /// be called from within a tokio runtime.
    pub fn new(
        settings: Settings,
        store: Arc<dyn AuditStore>,
        provider: Arc<dyn AuthProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let identity = Arc::new(SessionIdentity::new());
        let audit = AuditLogger::spawn(store, identity.clone(), clock.clone(), &settings.audit);

        let auth_limiter = RateLimiter::new(
            settings.auth_limiter.to_config(),
            clock.clone(),
            audit.clone(),
        );
        let general_limiter = RateLimiter::new(
            settings.general_limiter.to_config(),
            clock.clone(),
            audit.clone(),
        );
        spawn_limiter_sweeper(auth_limiter.clone());
        spawn_limiter_sweeper(general_limiter.clone());

        let gateway = AuthGateway::new(
            auth_limiter.clone(),
            audit.clone(),
            provider,
            identity.clone(),
        );

        Self {
            settings: Arc::new(settings),
            clock,
            identity,
            audit,
            auth_limiter,
            general_limiter,
            gateway,
        }
    }

    /// Create a state backed by the flat-file audit log under `data_dir`
    /// and a local credential store.
    pub fn open(settings: Settings) -> anyhow::Result<Self> {
        let store = FlatFileAuditStore::new(settings.audit_log_path(), settings.audit.capacity)?;
        tracing::info!(path = %store.path().display(), "opened audit log");

        Ok(Self::new(
            settings,
            Arc::new(store),
            Arc::new(InMemoryAuthProvider::default()),
            Arc::new(SystemClock),
        ))
    }
}

/// Drop idle limiter keys once per window so the key map stays bounded
fn spawn_limiter_sweeper(limiter: RateLimiter) {
    let period = limiter.config().window().max(MIN_SWEEP_PERIOD);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            limiter.purge_idle();
        }
    });
}
