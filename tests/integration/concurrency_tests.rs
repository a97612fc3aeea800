// ==============================
// tests/integration/concurrency_tests.rs
// ==============================
//! The limiter must stay exact when checks race across worker threads.
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

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_checks_never_exceed_the_maximum() {
    let clock = Arc::new(ManualClock::new(epoch()));
    let audit = AuditLogger::spawn(
        Arc::new(MemoryAuditStore::new(1000)),
        Arc::new(AnonymousIdentity),
        clock.clone(),
        &AuditSettings::default(),
    );
    let limiter = RateLimiter::new(
        RateLimitConfig::new(Duration::from_secs(60), 5, Duration::from_secs(60)),
        clock,
        audit.clone(),
    );

    let mut handles = Vec::new();
    for _ in 0..64 {
        let limiter = limiter.clone();
        handles.push(tokio::spawn(async move {
            limiter.check_limit("shared@example.com", "signin").await
        }));
    }

    let mut allowed = 0;
    for handle in handles {
        if handle.await.unwrap() {
            allowed += 1;
        }
    }
    assert_eq!(allowed, 5);

    let denials = audit
        .get_audit_logs(1000)
        .await
        .into_iter()
        .filter(|e| e.event_type == AuditEventType::RateLimitExceeded)
        .count();
    assert_eq!(denials, 59);
}
