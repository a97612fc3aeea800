// ============================
// crates/finguard-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod gateway;
pub mod password;
pub mod provider;
pub mod rate_limit;

pub use gateway::{AuthGateway, ANONYMOUS_IDENTIFIER, SIGN_IN_ACTION, SIGN_UP_ACTION};
pub use password::{
    hash_password, validate_password_strength, verify_password, PasswordStrength,
    MIN_PASSWORD_LENGTH,
};
pub use provider::{AuthProvider, AuthProviderError, InMemoryAuthProvider};
pub use rate_limit::{RateLimitConfig, RateLimiter};
