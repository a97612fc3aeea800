// ============================
// crates/finguard-lib/src/auth/provider.rs
// ============================
//! The authentication backend seam, plus a local credential store.
use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use scrypt::Params;
use thiserror::Error;
use uuid::Uuid;

use super::password::{hash_password, verify_password};
use crate::validation::SignUpForm;

/// Message returned for unknown accounts and wrong passwords alike
pub const INVALID_CREDENTIALS: &str = "Invalid login credentials";

/// Message returned when the email is already taken
pub const ALREADY_REGISTERED: &str = "User already registered";

/// Failures reported by an [`AuthProvider`]
#[derive(Error, Debug)]
pub enum AuthProviderError {
    /// The backend refused the request; the message is safe to show
    #[error("{0}")]
    Rejected(String),

    /// Anything else; details stay in the logs
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// External authentication backend
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Check credentials, returning the user id
    async fn sign_in(&self, email: &str, password: &str) -> Result<String, AuthProviderError>;

    /// Create an account, returning the new user id
    async fn sign_up(&self, form: &SignUpForm) -> Result<String, AuthProviderError>;

    async fn sign_out(&self) -> Result<(), AuthProviderError>;
}

#[derive(Debug, Clone)]
struct StoredUser {
    user_id: String,
    password_hash: String,
}

/// Credential store kept in process memory, scrypt-hashed
pub struct InMemoryAuthProvider {
    users: DashMap<String, StoredUser>,
    params: Params,
}

impl InMemoryAuthProvider {
    pub fn new(params: Params) -> Self {
        Self {
            users: DashMap::new(),
            params,
        }
    }

    /// Number of registered accounts
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn key(email: &str) -> String {
        email.trim().to_lowercase()
    }
}

impl Default for InMemoryAuthProvider {
    fn default() -> Self {
        Self::new(Params::recommended())
    }
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<String, AuthProviderError> {
        let Some(user) = self.users.get(&Self::key(email)).map(|u| u.clone()) else {
            return Err(AuthProviderError::Rejected(INVALID_CREDENTIALS.to_string()));
        };

        if verify_password(&user.password_hash, password) {
            Ok(user.user_id)
        } else {
            Err(AuthProviderError::Rejected(INVALID_CREDENTIALS.to_string()))
        }
    }

    async fn sign_up(&self, form: &SignUpForm) -> Result<String, AuthProviderError> {
        let key = Self::key(&form.email);
        if self.users.contains_key(&key) {
            return Err(AuthProviderError::Rejected(ALREADY_REGISTERED.to_string()));
        }

        // hash outside the map lock
        let password_hash = hash_password(&form.password, self.params)?;
        let user_id = Uuid::new_v4().to_string();

        match self.users.entry(key) {
            Entry::Occupied(_) => Err(AuthProviderError::Rejected(ALREADY_REGISTERED.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(StoredUser {
                    user_id: user_id.clone(),
                    password_hash,
                });
                tracing::debug!(%user_id, "registered local account");
                Ok(user_id)
            },
        }
    }

    async fn sign_out(&self) -> Result<(), AuthProviderError> {
        Ok(())
    }
}
