// ==============================
// tests/unit/rate_limit_tests.rs
// ==============================
//! Rate limiter behaviour through the public API, on simulated time.
use std::sync::Arc;
use std::time::Duration;

use finguard_lib::{
    audit::{AnonymousIdentity, AuditEventType, AuditLogger},
    auth::{RateLimitConfig, RateLimiter},
    clock::ManualClock,
    config::AuditSettings,
    storage::MemoryAuditStore,
};
use crate::test_utils::epoch;

fn limiter(config: RateLimitConfig) -> (RateLimiter, Arc<ManualClock>, AuditLogger) {
    let clock = Arc::new(ManualClock::new(epoch()));
    let audit = AuditLogger::spawn(
        Arc::new(MemoryAuditStore::default()),
        Arc::new(AnonymousIdentity),
        clock.clone(),
        &AuditSettings::default(),
    );
    (RateLimiter::new(config, clock.clone(), audit.clone()), clock, audit)
}

#[tokio::test]
async fn test_end_to_end_timeline() {
    let (limiter, clock, _audit) = limiter(RateLimitConfig::new(
        Duration::from_millis(1000),
        2,
        Duration::from_millis(2000),
    ));

    assert!(limiter.check_limit("a@b.com", "signin").await);
    clock.advance(Duration::from_millis(100));
    assert!(limiter.check_limit("a@b.com", "signin").await);
    clock.advance(Duration::from_millis(100));
    assert!(!limiter.check_limit("a@b.com", "signin").await);
    clock.advance(Duration::from_millis(2100));
    assert!(limiter.check_limit("a@b.com", "signin").await);
}

#[tokio::test]
async fn test_auth_defaults_allow_five_then_block_for_thirty_minutes() {
    let (limiter, clock, _audit) = limiter(RateLimitConfig::auth());

    for _ in 0..5 {
        assert!(limiter.check_limit("user@example.com", "signin").await);
    }
    assert!(!limiter.check_limit("user@example.com", "signin").await);

    // 29 minutes in: still blocked, and blocked checks do not extend the block
    clock.advance(Duration::from_secs(29 * 60));
    assert!(!limiter.check_limit("user@example.com", "signin").await);

    clock.advance(Duration::from_secs(60));
    assert!(limiter.check_limit("user@example.com", "signin").await);
}

#[tokio::test]
async fn test_general_defaults() {
    let (limiter, _clock, _audit) = limiter(RateLimitConfig::general());

    for _ in 0..20 {
        assert!(limiter.check_limit("client", "export").await);
    }
    assert!(!limiter.check_limit("client", "export").await);
    assert_eq!(limiter.remaining_attempts("client", "other"), 20);
}

#[tokio::test]
async fn test_actions_are_tracked_separately() {
    let (limiter, _clock, _audit) = limiter(RateLimitConfig::new(
        Duration::from_secs(60),
        1,
        Duration::from_secs(60),
    ));

    assert!(limiter.check_limit("a@b.com", "signin").await);
    assert!(limiter.check_limit("a@b.com", "signup").await);
    assert!(!limiter.check_limit("a@b.com", "signin").await);
}

#[tokio::test]
async fn test_every_denial_is_audited() {
    let (limiter, _clock, audit) = limiter(RateLimitConfig::new(
        Duration::from_secs(60),
        1,
        Duration::from_secs(60),
    ));

    assert!(limiter.check_limit("a@b.com", "signin").await);
    assert!(!limiter.check_limit("a@b.com", "signin").await);
    assert!(!limiter.check_limit("a@b.com", "signin").await);

    let logs = audit.get_audit_logs(10).await;
    assert_eq!(logs.len(), 2);
    assert!(logs
        .iter()
        .all(|e| e.event_type == AuditEventType::RateLimitExceeded));
    assert_eq!(
        logs[0].event_description,
        "Security event: Rate limit exceeded for signin by a@b.com"
    );
}
