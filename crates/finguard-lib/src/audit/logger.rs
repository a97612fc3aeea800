// ============================
// crates/finguard-lib/src/audit/logger.rs
// ============================
//! Best-effort audit logger backed by a single writer task.
//!
//! Callers build entries and hand them to the writer over an unbounded
//! channel, so logging never waits on storage and never fails the operation
//! it accompanies. Reads go through the same channel and therefore observe
//! every entry logged before them.
use std::sync::Arc;

use finguard_common::{AuditEventType, AuditLogEntry, ClientContext, Metadata, MetadataValue};
use metrics::counter;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use super::identity::IdentityProvider;
use crate::clock::Clock;
use crate::config::AuditSettings;
use crate::metrics::{AUDIT_PERSIST_FAILED, AUDIT_RECORDED};
use crate::storage::AuditStore;

/// Default number of entries returned by [`AuditLogger::get_audit_logs`] callers
pub const DEFAULT_AUDIT_PAGE: usize = 50;

/// Message sent *into* the writer
#[derive(Debug)]
enum AuditCommand {
    Append(Box<AuditLogEntry>),
    Recent {
        limit: usize,
        resp_tx: oneshot::Sender<Vec<AuditLogEntry>>,
    },
    Flush {
        resp_tx: oneshot::Sender<()>,
    },
}

/// Owns the store; the only place entries are written
struct AuditWriter {
    store: Arc<dyn AuditStore>,
}

impl AuditWriter {
    async fn run(self, mut cmd_rx: mpsc::UnboundedReceiver<AuditCommand>) {
        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                AuditCommand::Append(entry) => {
                    let id = entry.id;
                    if let Err(e) = self.store.append(*entry).await {
                        counter!(AUDIT_PERSIST_FAILED).increment(1);
                        tracing::error!(entry_id = %id, error = %e, "Failed to log audit event");
                    }
                },
                AuditCommand::Recent { limit, resp_tx } => {
                    let entries = match self.store.recent(limit).await {
                        Ok(entries) => entries,
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to retrieve audit logs");
                            Vec::new()
                        },
                    };
                    let _ = resp_tx.send(entries);
                },
                AuditCommand::Flush { resp_tx } => {
                    let _ = resp_tx.send(());
                },
            }
        }
        tracing::debug!("audit writer stopped");
    }
}

/// Records security- and domain-relevant events
#[derive(Clone)]
pub struct AuditLogger {
    cmd_tx: mpsc::UnboundedSender<AuditCommand>,
    identity: Arc<dyn IdentityProvider>,
    clock: Arc<dyn Clock>,
    client: ClientContext,
    large_transaction_threshold: f64,
}

impl AuditLogger {
    /// Spawn the writer task and return a handle to it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        store: Arc<dyn AuditStore>,
        identity: Arc<dyn IdentityProvider>,
        clock: Arc<dyn Clock>,
        settings: &AuditSettings,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        tokio::spawn(AuditWriter { store }.run(cmd_rx));

        Self {
            cmd_tx,
            identity,
            clock,
            client: ClientContext::new(settings.user_agent.clone()),
            large_transaction_threshold: settings.large_transaction_threshold,
        }
    }

    /// Record an event. Never fails; storage errors are logged and dropped.
    pub async fn log_event(
        &self,
        event_type: AuditEventType,
        description: impl Into<String>,
        metadata: Option<Metadata>,
    ) {
        let user_id = self.identity.current_user_id().await;
        let now = self.clock.now();

        let mut metadata = metadata.unwrap_or_default();
        metadata.insert("timestamp".to_string(), MetadataValue::Timestamp(now));

        let entry = AuditLogEntry {
            id: Uuid::new_v4(),
            user_id,
            event_type,
            event_description: description.into(),
            metadata,
            client: self.client.clone(),
            created_at: now,
        };

        tracing::info!(
            target: "audit",
            entry_id = %entry.id,
            event_type = %entry.event_type,
            user_id = ?entry.user_id,
            description = %entry.event_description,
            "[AUDIT]"
        );

        if self.cmd_tx.send(AuditCommand::Append(Box::new(entry))).is_err() {
            counter!(AUDIT_PERSIST_FAILED).increment(1);
            tracing::error!("Failed to log audit event: writer is gone");
            return;
        }
        counter!(AUDIT_RECORDED, "event_type" => event_type.as_str()).increment(1);
    }

    /// Record a sign-in/sign-up style outcome
    pub async fn log_auth_event(
        &self,
        event_type: AuditEventType,
        email: Option<&str>,
        success: bool,
    ) {
        let action = event_type.as_str().replacen('_', " ", 1).to_lowercase();
        let outcome = if success { "successful" } else { "failed" };
        let description = match email.filter(|e| !e.is_empty()) {
            Some(email) => format!("{action} {outcome} for {email}"),
            None => format!("{action} {outcome}"),
        };

        let mut metadata = Metadata::new();
        if let Some(email) = email {
            metadata.insert("email".to_string(), email.into());
        }
        metadata.insert("success".to_string(), success.into());

        self.log_event(event_type, description, Some(metadata)).await;
    }

    /// Record a profile change; `changes` are stored under `changes.<field>`
    pub async fn log_profile_event(&self, event_type: AuditEventType, changes: Option<Metadata>) {
        let description = format!(
            "Profile {}",
            event_type.as_str().replacen("PROFILE_", "", 1).to_lowercase()
        );

        let metadata = changes.map(|changes| {
            changes
                .into_iter()
                .map(|(field, value)| (format!("changes.{field}"), value))
                .collect::<Metadata>()
        });

        self.log_event(event_type, description, metadata).await;
    }

    /// Record a transaction event.
    ///
    /// Amounts above the configured threshold are recorded as
    /// [`AuditEventType::LargeTransaction`] whatever `event_type` says. The
    /// threshold ignores currency.
    pub async fn log_transaction_event(
        &self,
        event_type: AuditEventType,
        amount: Option<f64>,
        merchant: Option<&str>,
    ) {
        let is_large = amount.is_some_and(|a| a > self.large_transaction_threshold);
        let recorded_type = if is_large {
            AuditEventType::LargeTransaction
        } else {
            event_type
        };

        let mut description = event_type
            .as_str()
            .replacen("TRANSACTION_", "Transaction ", 1)
            .to_lowercase();
        if let Some(merchant) = merchant.filter(|m| !m.is_empty()) {
            description.push_str(&format!(" for {merchant}"));
        }
        if let Some(amount) = amount.filter(|a| *a != 0.0 && !a.is_nan()) {
            description.push_str(&format!(" ({amount})"));
        }

        let mut metadata = Metadata::new();
        if let Some(amount) = amount {
            metadata.insert("amount".to_string(), amount.into());
        }
        if let Some(merchant) = merchant {
            metadata.insert("merchant".to_string(), merchant.into());
        }
        metadata.insert("flagged_as_large".to_string(), is_large.into());

        self.log_event(recorded_type, description, Some(metadata)).await;
    }

    /// Record a security event; always tagged `severity: "high"`
    pub async fn log_security_event(
        &self,
        event_type: AuditEventType,
        details: &str,
        metadata: Option<Metadata>,
    ) {
        let mut metadata = metadata.unwrap_or_default();
        metadata.insert("severity".to_string(), "high".into());

        self.log_event(event_type, format!("Security event: {details}"), Some(metadata))
            .await;
    }

    /// The most recent `limit` entries, newest first.
    ///
    /// Returns an empty list if the log cannot be read.
    pub async fn get_audit_logs(&self, limit: usize) -> Vec<AuditLogEntry> {
        let (resp_tx, resp_rx) = oneshot::channel();
        if self
            .cmd_tx
            .send(AuditCommand::Recent { limit, resp_tx })
            .is_err()
        {
            tracing::error!("Failed to retrieve audit logs: writer is gone");
            return Vec::new();
        }
        resp_rx.await.unwrap_or_default()
    }

    /// Wait until every entry logged so far has been handed to the store
    pub async fn flush(&self) {
        let (resp_tx, resp_rx) = oneshot::channel();
        if self.cmd_tx.send(AuditCommand::Flush { resp_tx }).is_ok() {
            let _ = resp_rx.await;
        }
    }
}
