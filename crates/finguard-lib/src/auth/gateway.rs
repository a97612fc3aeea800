// ============================
// crates/finguard-lib/src/auth/gateway.rs
// ============================
//! Sign-in, sign-up and sign-out, guarded by the auth rate limiter and
//! recorded in the audit log.
use std::sync::Arc;

use metrics::counter;

use super::provider::{AuthProvider, AuthProviderError};
use super::rate_limit::RateLimiter;
use crate::audit::{AuditEventType, AuditLogger, SessionIdentity};
use crate::error::{AppError, UNEXPECTED_ERROR_MESSAGE};
use crate::metrics::{AUTH_ATTEMPT, AUTH_FAILURE, AUTH_SUCCESS};
use crate::validation::{SignInForm, SignUpForm};

/// Limiter action for sign-in attempts
pub const SIGN_IN_ACTION: &str = "signin";

/// Limiter action for sign-up attempts
pub const SIGN_UP_ACTION: &str = "signup";

/// Identifier used when no email was supplied
pub const ANONYMOUS_IDENTIFIER: &str = "anonymous";

/// Front door for the authentication flows
#[derive(Clone)]
pub struct AuthGateway {
    limiter: RateLimiter,
    audit: AuditLogger,
    provider: Arc<dyn AuthProvider>,
    session: Arc<SessionIdentity>,
}

impl AuthGateway {
    pub fn new(
        limiter: RateLimiter,
        audit: AuditLogger,
        provider: Arc<dyn AuthProvider>,
        session: Arc<SessionIdentity>,
    ) -> Self {
        Self {
            limiter,
            audit,
            provider,
            session,
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    fn identifier(email: &str) -> &str {
        if email.is_empty() {
            ANONYMOUS_IDENTIFIER
        } else {
            email
        }
    }

    /// Reject the attempt if the limiter says so; the limiter has already
    /// written the audit entry. Keyed on the email as typed, never the
    /// sanitised one.
    async fn guard(&self, email: &str, action: &'static str) -> Result<(), AppError> {
        counter!(AUTH_ATTEMPT, "action" => action).increment(1);

        let identifier = Self::identifier(email);
        if self.limiter.check_limit(identifier, action).await {
            return Ok(());
        }
        counter!(AUTH_FAILURE, "action" => action, "reason" => "rate_limited").increment(1);
        Err(AppError::RateLimited {
            blocked_until: self.limiter.blocked_until(identifier, action),
        })
    }

    /// Sign in, returning the user id.
    pub async fn sign_in(&self, form: &SignInForm) -> Result<String, AppError> {
        self.guard(&form.raw_email, SIGN_IN_ACTION).await?;
        form.validate()?;

        match self.provider.sign_in(&form.email, &form.password).await {
            Ok(user_id) => {
                self.session.set(user_id.clone());
                self.audit
                    .log_auth_event(AuditEventType::UserSignIn, Some(&form.email), true)
                    .await;
                counter!(AUTH_SUCCESS, "action" => SIGN_IN_ACTION).increment(1);
                tracing::info!(%user_id, "sign-in succeeded");
                Ok(user_id)
            },
            Err(err) => {
                self.audit
                    .log_auth_event(AuditEventType::FailedLogin, Some(&form.email), false)
                    .await;
                Err(self.provider_failure(SIGN_IN_ACTION, err))
            },
        }
    }

    /// Register a new account, returning the user id.
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<String, AppError> {
        self.guard(&form.raw_email, SIGN_UP_ACTION).await?;
        form.validate()?;

        let result = self.provider.sign_up(form).await;
        self.audit
            .log_auth_event(AuditEventType::UserSignUp, Some(&form.email), result.is_ok())
            .await;

        match result {
            Ok(user_id) => {
                counter!(AUTH_SUCCESS, "action" => SIGN_UP_ACTION).increment(1);
                tracing::info!(%user_id, "sign-up succeeded");
                Ok(user_id)
            },
            Err(err) => Err(self.provider_failure(SIGN_UP_ACTION, err)),
        }
    }

    /// End the session. The audit entry still carries the departing user.
    pub async fn sign_out(&self) -> Result<(), AppError> {
        let result = self.provider.sign_out().await;
        self.audit
            .log_auth_event(AuditEventType::UserSignOut, None, result.is_ok())
            .await;

        match result {
            Ok(()) => {
                self.session.clear();
                Ok(())
            },
            Err(err) => Err(self.provider_failure("signout", err)),
        }
    }

    fn provider_failure(&self, action: &'static str, err: AuthProviderError) -> AppError {
        match err {
            AuthProviderError::Rejected(msg) => {
                counter!(AUTH_FAILURE, "action" => action, "reason" => "rejected").increment(1);
                tracing::info!(%action, reason = %msg, "authentication rejected");
                AppError::Auth(msg)
            },
            AuthProviderError::Unexpected(err) => {
                counter!(AUTH_FAILURE, "action" => action, "reason" => "unexpected").increment(1);
                tracing::error!(%action, error = ?err, "authentication backend failed");
                AppError::Internal(UNEXPECTED_ERROR_MESSAGE.to_string())
            },
        }
    }
}
