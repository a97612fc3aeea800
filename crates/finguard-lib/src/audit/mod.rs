// ============================
// crates/finguard-lib/src/audit/mod.rs
// ============================
//! Audit logging.

pub mod identity;
pub mod logger;

pub use finguard_common::{AuditEventType, AuditLogEntry, Metadata, MetadataValue};
pub use identity::{AnonymousIdentity, IdentityProvider, SessionIdentity};
pub use logger::{AuditLogger, DEFAULT_AUDIT_PAGE};
