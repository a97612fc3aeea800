// ================
// common/src/lib.rs
// ================
//! Common types shared between the `FinGuard` security core and its callers.
//! This module defines the audit event taxonomy and the serialised shape of
//! an audit log entry.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder recorded as the IP address. A trusted network boundary fills
/// in the real address; client code never does.
pub const CLIENT_IP_PLACEHOLDER: &str = "client";

/// Closed set of audit event categories
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEventType {
    // Authentication
    UserSignIn,
    UserSignUp,
    UserSignOut,
    PasswordChange,
    EmailChange,

    // Profile
    ProfileUpdate,
    ProfileDelete,

    // Accounts
    AccountCreate,
    AccountUpdate,
    AccountDelete,

    // Transactions
    LargeTransaction,
    TransactionCreate,
    TransactionUpdate,
    TransactionDelete,

    // Security
    FailedLogin,
    PasswordResetRequest,
    FailedPasswordReset,
    SuspiciousActivity,
    RateLimitExceeded,

    // Settings
    SettingsUpdate,
}

impl AuditEventType {
    /// Every variant, in declaration order
    pub const ALL: [AuditEventType; 20] = [
        Self::UserSignIn,
        Self::UserSignUp,
        Self::UserSignOut,
        Self::PasswordChange,
        Self::EmailChange,
        Self::ProfileUpdate,
        Self::ProfileDelete,
        Self::AccountCreate,
        Self::AccountUpdate,
        Self::AccountDelete,
        Self::LargeTransaction,
        Self::TransactionCreate,
        Self::TransactionUpdate,
        Self::TransactionDelete,
        Self::FailedLogin,
        Self::PasswordResetRequest,
        Self::FailedPasswordReset,
        Self::SuspiciousActivity,
        Self::RateLimitExceeded,
        Self::SettingsUpdate,
    ];

    /// Wire name of the event type, e.g. `USER_SIGN_IN`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserSignIn => "USER_SIGN_IN",
            Self::UserSignUp => "USER_SIGN_UP",
            Self::UserSignOut => "USER_SIGN_OUT",
            Self::PasswordChange => "PASSWORD_CHANGE",
            Self::EmailChange => "EMAIL_CHANGE",
            Self::ProfileUpdate => "PROFILE_UPDATE",
            Self::ProfileDelete => "PROFILE_DELETE",
            Self::AccountCreate => "ACCOUNT_CREATE",
            Self::AccountUpdate => "ACCOUNT_UPDATE",
            Self::AccountDelete => "ACCOUNT_DELETE",
            Self::LargeTransaction => "LARGE_TRANSACTION",
            Self::TransactionCreate => "TRANSACTION_CREATE",
            Self::TransactionUpdate => "TRANSACTION_UPDATE",
            Self::TransactionDelete => "TRANSACTION_DELETE",
            Self::FailedLogin => "FAILED_LOGIN",
            Self::PasswordResetRequest => "PASSWORD_RESET_REQUEST",
            Self::FailedPasswordReset => "FAILED_PASSWORD_RESET",
            Self::SuspiciousActivity => "SUSPICIOUS_ACTIVITY",
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            Self::SettingsUpdate => "SETTINGS_UPDATE",
        }
    }
}

impl fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single metadata value attached to an audit entry
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MetadataValue {
    String(String),
    Number(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::String(value)
    }
}

/// JSON has no NaN or infinity, so non-finite numbers are kept as text
impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        if value.is_finite() {
            MetadataValue::Number(value)
        } else {
            MetadataValue::String(value.to_string())
        }
    }
}

impl From<u32> for MetadataValue {
    fn from(value: u32) -> Self {
        MetadataValue::Number(f64::from(value))
    }
}

impl From<usize> for MetadataValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: usize) -> Self {
        MetadataValue::Number(value as f64)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for MetadataValue {
    fn from(value: DateTime<Utc>) -> Self {
        MetadataValue::Timestamp(value)
    }
}

/// String-keyed metadata map; ordered so serialised entries are stable
pub type Metadata = BTreeMap<String, MetadataValue>;

/// Client context captured with every entry
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClientContext {
    /// Caller IP address (placeholder outside a trusted boundary)
    pub ip_address: String,
    /// Caller user-agent string
    pub user_agent: String,
}

impl ClientContext {
    /// Context for a client identified only by its user agent
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            ip_address: CLIENT_IP_PLACEHOLDER.to_string(),
            user_agent: user_agent.into(),
        }
    }
}

/// Immutable record of a security- or domain-relevant event
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AuditLogEntry {
    /// Generated identifier
    pub id: Uuid,
    /// Actor, when one was signed in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Event category
    pub event_type: AuditEventType,
    /// Human-readable description
    pub event_description: String,
    /// Structured metadata
    #[serde(default)]
    pub metadata: Metadata,
    /// Client context
    #[serde(flatten)]
    pub client: ClientContext,
    /// Creation time
    pub created_at: DateTime<Utc>,
}
