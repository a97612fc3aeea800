// ==============================
// tests/integration/auth_flow_tests.rs
// ==============================
//! Sign-up, sign-in and sign-out through `AppState` with a real credential
//! store and flat-file audit log.
use std::time::Duration;

use finguard_lib::{
    audit::AuditEventType,
    error::AppError,
    validation::{SignInForm, SignUpForm, SignUpInput},
};
use crate::test_utils::{compressed_limits, setup_test_env};

fn sign_up_form(email: &str) -> SignUpForm {
    SignUpForm::from_input(SignUpInput {
        email,
        password: "Tr0ub4dor&3xyz!",
        confirm_password: "Tr0ub4dor&3xyz!",
        first_name: "Ada",
        last_name: "Lovelace",
        preferred_currency: "NGN",
    })
}

#[tokio::test]
async fn test_register_sign_in_sign_out() {
    let (state, _clock, _temp_dir) = setup_test_env(|_| {}).await;

    let user_id = state.gateway.sign_up(&sign_up_form("ada@example.com")).await.unwrap();
    let signed_in = state
        .gateway
        .sign_in(&SignInForm::from_input("ada@example.com", "Tr0ub4dor&3xyz!"))
        .await
        .unwrap();
    assert_eq!(signed_in, user_id);
    assert_eq!(state.identity.get().as_deref(), Some(user_id.as_str()));

    state.gateway.sign_out().await.unwrap();
    assert_eq!(state.identity.get(), None);

    let logs = state.audit.get_audit_logs(10).await;
    let kinds: Vec<_> = logs.iter().map(|e| e.event_type).collect();
    assert_eq!(
        kinds,
        vec![
            AuditEventType::UserSignOut,
            AuditEventType::UserSignIn,
            AuditEventType::UserSignUp,
        ]
    );
}

#[tokio::test]
async fn test_weak_password_is_refused_before_the_backend() {
    let (state, _clock, _temp_dir) = setup_test_env(|_| {}).await;

    let form = SignUpForm::from_input(SignUpInput {
        email: "ada@example.com",
        password: "password",
        confirm_password: "password",
        first_name: "Ada",
        last_name: "Lovelace",
        preferred_currency: "NGN",
    });
    let err = state.gateway.sign_up(&form).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(state.audit.get_audit_logs(10).await.is_empty());
}

#[tokio::test]
async fn test_brute_force_is_blocked_then_recovers() {
    let (state, clock, _temp_dir) = setup_test_env(|settings| {
        settings.auth_limiter = compressed_limits();
    })
    .await;
    state.gateway.sign_up(&sign_up_form("ada@example.com")).await.unwrap();

    let wrong = SignInForm::from_input("ada@example.com", "guess");
    for _ in 0..2 {
        let err = state.gateway.sign_in(&wrong).await.unwrap_err();
        assert_eq!(err.sanitized_message(), "Invalid login credentials");
    }

    // the right password does not help while blocked
    let right = SignInForm::from_input("ada@example.com", "Tr0ub4dor&3xyz!");
    let err = state.gateway.sign_in(&right).await.unwrap_err();
    assert_eq!(err.error_code(), "RATE_001");
    assert!(err.sanitized_message().starts_with("Too many failed attempts"));

    clock.advance(Duration::from_millis(2100));
    assert!(state.gateway.sign_in(&right).await.is_ok());

    let logs = state.audit.get_audit_logs(10).await;
    let failed = logs
        .iter()
        .filter(|e| e.event_type == AuditEventType::FailedLogin)
        .count();
    let limited = logs
        .iter()
        .filter(|e| e.event_type == AuditEventType::RateLimitExceeded)
        .count();
    assert_eq!(failed, 2);
    assert_eq!(limited, 1);
}

#[tokio::test]
async fn test_duplicate_registration_is_audited_as_failed_sign_up() {
    let (state, _clock, _temp_dir) = setup_test_env(|_| {}).await;

    state.gateway.sign_up(&sign_up_form("ada@example.com")).await.unwrap();
    let err = state
        .gateway
        .sign_up(&sign_up_form("ada@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err.sanitized_message(), "User already registered");

    let logs = state.audit.get_audit_logs(1).await;
    assert_eq!(logs[0].event_type, AuditEventType::UserSignUp);
    assert_eq!(
        logs[0].event_description,
        "user sign_up failed for ada@example.com"
    );
}

#[tokio::test]
async fn test_general_limiter_is_independent_of_auth() {
    let (state, _clock, _temp_dir) = setup_test_env(|_| {}).await;

    for _ in 0..20 {
        assert!(state.general_limiter.check_limit("ada@example.com", "export").await);
    }
    assert!(!state.general_limiter.check_limit("ada@example.com", "export").await);

    // sign-in attempts use their own limiter
    assert_eq!(
        state.auth_limiter.remaining_attempts("ada@example.com", "signin"),
        5
    );
    assert!(state.general_limiter.blocked_until("ada@example.com", "export").is_some());
}

#[tokio::test(start_paused = true)]
async fn test_idle_limiter_keys_are_swept() {
    let (state, clock, _temp_dir) = setup_test_env(|settings| {
        settings.general_limiter = compressed_limits();
    })
    .await;

    assert!(state.general_limiter.check_limit("ada@example.com", "export").await);
    clock.advance(Duration::from_secs(2));
    assert!(state.general_limiter.check_limit("bob@example.com", "export").await);
    assert_eq!(state.general_limiter.tracked_keys(), 2);

    // the sweeper wakes once per window
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(state.general_limiter.tracked_keys(), 1);
    assert_eq!(
        state.general_limiter.remaining_attempts("bob@example.com", "export"),
        1
    );
}
