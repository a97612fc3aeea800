// ==============================
// tests/unit/password_tests.rs
// ==============================
use finguard_lib::auth::validate_password_strength;

#[test]
fn test_common_password_scores_zero() {
    let result = validate_password_strength("password");
    assert_eq!(result.score, 0);
    assert!(!result.is_valid);
    assert!(result
        .feedback
        .contains(&"Avoid common password patterns"));
}

#[test]
fn test_strong_password_is_valid_with_no_feedback() {
    let result = validate_password_strength("Tr0ub4dor&3xyz!");
    assert!(result.score >= 3);
    assert!(result.is_valid);
    assert!(result.feedback.is_empty());
}

#[test]
fn test_score_is_bounded() {
    for candidate in [
        "",
        "a",
        "aaaaaaaa",
        "12345678",
        "QWERTYqwerty123!!!",
        "Correct-Horse-Battery-Staple-42",
        "\u{2028}\u{2028}\u{2028}",
    ] {
        let result = validate_password_strength(candidate);
        assert!(result.score <= 4, "{candidate:?}");
    }
}

#[test]
fn test_short_password_is_never_valid() {
    let result = validate_password_strength("Zy9!Zy9");
    assert!(!result.is_valid);
    assert_eq!(
        result.feedback.first(),
        Some(&"Password must be at least 8 characters long")
    );
}

#[test]
fn test_strength_serializes_for_display() {
    let result = validate_password_strength("abc");
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["score"], 0);
    assert_eq!(json["is_valid"], false);
    assert!(json["feedback"].as_array().unwrap().len() >= 4);
}
