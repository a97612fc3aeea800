// ============================
// crates/finguard-lib/src/validation/mod.rs
// ============================
//! Input validation for the sign-in and sign-up flows.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::auth::password::{validate_password_strength, MIN_PASSWORD_LENGTH};

// Common validation constants
const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit
const MAX_LOCAL_PART_LENGTH: usize = 64;
const MAX_NAME_LENGTH: usize = 50;
const CURRENCY_CODE_LENGTH: usize = 3;
const MAX_INPUT_LENGTH: usize = 1000;

// Regex patterns for validation
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .unwrap()
});
static JAVASCRIPT_PROTOCOL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript:").unwrap());
static EVENT_HANDLER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)on[a-z0-9_]+=").unwrap());

/// Possible validation errors; the message is shown to the user as-is
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0}")]
    MissingField(String),

    #[error("{0}")]
    InvalidEmail(String),

    #[error("{0}")]
    InvalidPassword(String),

    #[error("{0}")]
    InvalidName(String),

    #[error("{0}")]
    InvalidCurrency(String),

    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate an email address
pub fn validate_email(email: &str) -> ValidationResult<&str> {
    let invalid = || ValidationError::InvalidEmail("Invalid email format".to_string());

    if !EMAIL_REGEX.is_match(email) {
        return Err(invalid());
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail(
            "Email address too long".to_string(),
        ));
    }

    let local_part = email.split('@').next().unwrap_or_default();
    if local_part.len() > MAX_LOCAL_PART_LENGTH {
        return Err(ValidationError::InvalidEmail(
            "Email local part too long".to_string(),
        ));
    }

    // Shapes the pattern lets through but no mail server accepts
    if email.contains("..")
        || email.starts_with('.')
        || email.ends_with('.')
        || email.contains("@.")
        || email.contains(".@")
    {
        return Err(invalid());
    }

    Ok(email)
}

/// Strip markup and script vectors from free-text input
pub fn sanitize_input(input: &str) -> String {
    let stripped: String = input.trim().chars().filter(|c| !matches!(c, '<' | '>')).collect();
    let stripped = JAVASCRIPT_PROTOCOL_REGEX.replace_all(&stripped, "");
    let stripped = EVENT_HANDLER_REGEX.replace_all(&stripped, "");
    stripped.chars().take(MAX_INPUT_LENGTH).collect()
}

fn require_email(email: &str) -> ValidationResult<()> {
    if email.is_empty() {
        return Err(ValidationError::MissingField("Email is required".to_string()));
    }
    if validate_email(email).is_err() {
        return Err(ValidationError::InvalidEmail(
            "Please enter a valid email address".to_string(),
        ));
    }
    Ok(())
}

fn require_name(value: &str, label: &str) -> ValidationResult<()> {
    let length = value.chars().count();
    if length == 0 {
        return Err(ValidationError::MissingField(format!("{label} is required")));
    }
    if length > MAX_NAME_LENGTH {
        return Err(ValidationError::InvalidName(format!(
            "{label} must be less than {MAX_NAME_LENGTH} characters"
        )));
    }
    if sanitize_input(value).is_empty() {
        return Err(ValidationError::InvalidName(format!("{label} cannot be empty")));
    }
    Ok(())
}

/// Credentials submitted on the sign-in form
#[derive(Clone)]
pub struct SignInForm {
    /// Email exactly as typed; keys the rate limiter
    pub raw_email: String,
    /// Sanitised email
    pub email: String,
    pub password: Zeroizing<String>,
}

impl SignInForm {
    /// Build the form from raw input, sanitising the email
    pub fn from_input(email: &str, password: &str) -> Self {
        Self {
            raw_email: email.to_string(),
            email: sanitize_input(email),
            password: Zeroizing::new(password.to_string()),
        }
    }

    /// Report the first failing rule
    pub fn validate(&self) -> ValidationResult<()> {
        require_email(&self.email)?;
        if self.password.is_empty() {
            return Err(ValidationError::MissingField("Password is required".to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for SignInForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInForm")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Details submitted on the sign-up form
#[derive(Clone)]
pub struct SignUpForm {
    /// Email exactly as typed; keys the rate limiter
    pub raw_email: String,
    /// Sanitised email
    pub email: String,
    pub password: Zeroizing<String>,
    pub confirm_password: Zeroizing<String>,
    /// Sanitised first name
    pub first_name: String,
    /// Sanitised last name
    pub last_name: String,
    /// ISO 4217 code, e.g. `NGN`
    pub preferred_currency: String,
}

/// Raw sign-up input, before sanitisation
#[derive(Debug, Clone, Copy)]
pub struct SignUpInput<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub preferred_currency: &'a str,
}

impl SignUpForm {
    /// Build the form from raw input, sanitising free-text fields
    pub fn from_input(input: SignUpInput<'_>) -> Self {
        Self {
            raw_email: input.email.to_string(),
            email: sanitize_input(input.email),
            password: Zeroizing::new(input.password.to_string()),
            confirm_password: Zeroizing::new(input.confirm_password.to_string()),
            first_name: sanitize_input(input.first_name),
            last_name: sanitize_input(input.last_name),
            preferred_currency: input.preferred_currency.to_string(),
        }
    }

    /// Report the first failing rule, checking fields in form order
    pub fn validate(&self) -> ValidationResult<()> {
        require_email(&self.email)?;

        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::InvalidPassword(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
            )));
        }
        if !validate_password_strength(&self.password).is_valid {
            return Err(ValidationError::InvalidPassword(
                "Password must contain uppercase, lowercase, numbers, and special characters"
                    .to_string(),
            ));
        }

        require_name(&self.first_name, "First name")?;
        require_name(&self.last_name, "Last name")?;

        if self.preferred_currency.chars().count() != CURRENCY_CODE_LENGTH {
            return Err(ValidationError::InvalidCurrency(
                "Currency must be a valid 3-letter code".to_string(),
            ));
        }

        if *self.password != *self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(())
    }
}

impl fmt::Debug for SignUpForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpForm")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("preferred_currency", &self.preferred_currency)
            .finish()
    }
}
