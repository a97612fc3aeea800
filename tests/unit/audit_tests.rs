// ==============================
// tests/unit/audit_tests.rs
// ==============================
//! Audit logger behaviour against the in-memory store.
use std::sync::Arc;

use finguard_lib::{
    audit::{AuditEventType, AuditLogger, Metadata, MetadataValue, SessionIdentity},
    clock::ManualClock,
    config::AuditSettings,
    storage::MemoryAuditStore,
};
use crate::test_utils::epoch;

fn logger(capacity: usize) -> (AuditLogger, Arc<SessionIdentity>) {
    let identity = Arc::new(SessionIdentity::new());
    let audit = AuditLogger::spawn(
        Arc::new(MemoryAuditStore::new(capacity)),
        identity.clone(),
        Arc::new(ManualClock::new(epoch())),
        &AuditSettings::default(),
    );
    (audit, identity)
}

#[tokio::test]
async fn test_capacity_evicts_oldest_first() {
    let (audit, _identity) = logger(100);

    for i in 0..150 {
        audit
            .log_event(AuditEventType::SettingsUpdate, format!("view {i}"), None)
            .await;
    }

    let logs = audit.get_audit_logs(500).await;
    assert_eq!(logs.len(), 100);
    assert_eq!(logs[0].event_description, "view 149");
    assert_eq!(logs[99].event_description, "view 50");
}

#[tokio::test]
async fn test_entries_carry_user_and_client_context() {
    let (audit, identity) = logger(10);

    audit
        .log_event(AuditEventType::AccountUpdate, "rename account", None)
        .await;
    identity.set("user-42");
    audit
        .log_event(AuditEventType::AccountUpdate, "close account", None)
        .await;

    let logs = audit.get_audit_logs(10).await;
    assert_eq!(logs[0].user_id.as_deref(), Some("user-42"));
    assert_eq!(logs[1].user_id, None);
    for entry in &logs {
        assert_eq!(entry.client.ip_address, "client");
        assert!(entry.client.user_agent.starts_with("finguard/"));
        assert_eq!(entry.created_at, epoch());
        assert!(entry.metadata.contains_key("timestamp"));
    }
    assert_ne!(logs[0].id, logs[1].id);
}

#[tokio::test]
async fn test_large_transaction_is_reclassified() {
    let (audit, _identity) = logger(10);

    audit
        .log_transaction_event(AuditEventType::TransactionCreate, Some(15000.0), Some("Acme"))
        .await;
    audit
        .log_transaction_event(AuditEventType::TransactionCreate, Some(500.0), Some("Acme"))
        .await;

    let logs = audit.get_audit_logs(10).await;
    assert_eq!(logs[0].event_type, AuditEventType::TransactionCreate);
    assert_eq!(
        logs[0].metadata.get("flagged_as_large"),
        Some(&MetadataValue::Bool(false))
    );
    assert_eq!(logs[1].event_type, AuditEventType::LargeTransaction);
    assert_eq!(logs[1].event_description, "transaction create for Acme (15000)");
    assert_eq!(
        logs[1].metadata.get("flagged_as_large"),
        Some(&MetadataValue::Bool(true))
    );
}

#[tokio::test]
async fn test_security_event_severity_cannot_be_overridden() {
    let (audit, _identity) = logger(10);

    let mut metadata = Metadata::new();
    metadata.insert("severity".to_string(), "low".into());
    metadata.insert("reason".to_string(), "new device".into());
    audit
        .log_security_event(AuditEventType::SuspiciousActivity, "new device sign-in", Some(metadata))
        .await;

    let logs = audit.get_audit_logs(1).await;
    assert_eq!(logs[0].event_description, "Security event: new device sign-in");
    assert_eq!(
        logs[0].metadata.get("severity"),
        Some(&MetadataValue::String("high".to_string()))
    );
    assert_eq!(
        logs[0].metadata.get("reason"),
        Some(&MetadataValue::String("new device".to_string()))
    );
}

#[tokio::test]
async fn test_profile_changes_are_namespaced() {
    let (audit, _identity) = logger(10);

    let mut changes = Metadata::new();
    changes.insert("preferred_currency".to_string(), "USD".into());
    audit
        .log_profile_event(AuditEventType::ProfileUpdate, Some(changes))
        .await;

    let logs = audit.get_audit_logs(1).await;
    assert_eq!(logs[0].event_description, "Profile update");
    assert!(logs[0].metadata.contains_key("changes.preferred_currency"));
}
