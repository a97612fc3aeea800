// ============================
// crates/finguard-lib/src/auth/password.rs
// ============================
//! Password strength scoring, plus hashing for the local credential store.
use rand::Rng;
use scrypt::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Params, Scrypt,
};
use serde::Serialize;

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Length at which a password earns the length bonus
pub const LONG_PASSWORD_LENGTH: usize = 12;

/// Characters that count as "special"
pub const SPECIAL_CHARACTERS: &str = r#"!@#$%^&*()_+-=[]{};':"\|,.<>/?"#;

/// Weak prefixes, matched case-insensitively at the start
const COMMON_PREFIXES: [&str; 5] = ["password", "123456", "qwerty", "admin", "welcome"];

/// Ascending three-character runs
const SEQUENCES: [&str; 13] = [
    "012", "123", "234", "345", "456", "567", "678", "789", "890", "abc", "bcd", "cde", "def",
];

pub const FEEDBACK_TOO_SHORT: &str = "Password must be at least 8 characters long";
pub const FEEDBACK_UPPERCASE: &str = "Add uppercase letters";
pub const FEEDBACK_LOWERCASE: &str = "Add lowercase letters";
pub const FEEDBACK_NUMBERS: &str = "Add numbers";
pub const FEEDBACK_SPECIAL: &str = "Add special characters (!@#$%^&*)";
pub const FEEDBACK_COMMON: &str = "Avoid common password patterns";
pub const FEEDBACK_SEQUENTIAL: &str = "Avoid sequential characters";
pub const FEEDBACK_REPEATED: &str = "Avoid repeated characters";

/// Result of scoring a password
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordStrength {
    /// 0 (very weak) to 4 (strong); the formula tops out at 3
    pub score: u8,
    /// What to fix, in check order
    pub feedback: Vec<&'static str>,
    pub is_valid: bool,
}

impl PasswordStrength {
    /// Label shown next to the strength meter
    pub fn label(&self) -> &'static str {
        match self.score {
            0 => "Very Weak",
            1 => "Weak",
            2 => "Fair",
            3 => "Good",
            _ => "Strong",
        }
    }
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn has_repeated_run(password: &str) -> bool {
    let chars: Vec<char> = password.chars().collect();
    chars
        .windows(3)
        .any(|w| !is_line_terminator(w[0]) && w[0] == w[1] && w[1] == w[2])
}

/// Score a password.
///
/// Deterministic and pure. Scores are tracked in half points: length >= 12
/// earns 2, each character class present earns 1, a common prefix costs 2,
/// a sequential run costs 1 and a repeated run costs 1, never going below
/// zero. The final score is rounded half up, so the maximum is 3.
pub fn validate_password_strength(password: &str) -> PasswordStrength {
    let mut feedback = Vec::new();
    let mut halves: u8 = 0;
    let length = password.chars().count();

    if length < MIN_PASSWORD_LENGTH {
        feedback.push(FEEDBACK_TOO_SHORT);
    } else if length >= LONG_PASSWORD_LENGTH {
        halves += 2;
    }

    let classes = [
        (password.chars().any(|c| c.is_ascii_uppercase()), FEEDBACK_UPPERCASE),
        (password.chars().any(|c| c.is_ascii_lowercase()), FEEDBACK_LOWERCASE),
        (password.chars().any(|c| c.is_ascii_digit()), FEEDBACK_NUMBERS),
        (
            password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)),
            FEEDBACK_SPECIAL,
        ),
    ];
    for (present, hint) in classes {
        if present {
            halves += 1;
        } else {
            feedback.push(hint);
        }
    }

    let lowered = password.to_ascii_lowercase();

    if COMMON_PREFIXES.iter().any(|prefix| lowered.starts_with(prefix)) {
        feedback.push(FEEDBACK_COMMON);
        halves = halves.saturating_sub(2);
    }

    if SEQUENCES.iter().any(|seq| lowered.contains(seq)) {
        feedback.push(FEEDBACK_SEQUENTIAL);
        halves = halves.saturating_sub(1);
    }

    if has_repeated_run(password) {
        feedback.push(FEEDBACK_REPEATED);
        halves = halves.saturating_sub(1);
    }

    PasswordStrength {
        score: halves.div_ceil(2),
        feedback,
        is_valid: halves >= 4 && length >= MIN_PASSWORD_LENGTH,
    }
}

/// Hash a password using scrypt with the given cost parameters
pub fn hash_password(plain: &str, params: Params) -> anyhow::Result<String> {
    let mut salt_bytes = [0u8; 16];
    rand::rng().fill(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)?;

    let hash = Scrypt
        .hash_password_customized(plain.as_bytes(), None, None, params, &salt)?
        .to_string();
    Ok(hash)
}

/// Verify a password against a hash
pub fn verify_password(hash: &str, plain: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };
    Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok()
}
