// ==============
// crates/finguard-lib/src/metrics.rs

//! Central place for metric keys
pub const RATE_LIMIT_ALLOWED: &str = "rate_limit.allowed";
pub const RATE_LIMIT_DENIED: &str = "rate_limit.denied";
pub const RATE_LIMIT_BLOCKED: &str = "rate_limit.blocked";
pub const RATE_LIMIT_PURGED: &str = "rate_limit.purged";
pub const AUDIT_RECORDED: &str = "audit.recorded";
pub const AUDIT_PERSIST_FAILED: &str = "audit.persist_failed";
pub const AUTH_ATTEMPT: &str = "auth.attempt";
pub const AUTH_SUCCESS: &str = "auth.success";
pub const AUTH_FAILURE: &str = "auth.failure";
