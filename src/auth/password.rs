use crate::error::AppError;
use bcrypt::{hash, verify};

pub const MIN_PASSWORD_LENGTH: usize = 6;

pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
}

/// Checks a candidate password against the identity password policy.
///
/// Returns one message per failed rule, in rule order; an empty list means the
/// password is acceptable.
pub fn password_policy_violations(password: &str) -> Vec<String> {
    let mut violations = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        violations.push(format!(
            "Passwords must be at least {} characters.",
            MIN_PASSWORD_LENGTH
        ));
    }
    if password.chars().all(|c| c.is_ascii_alphanumeric()) {
        violations.push("Passwords must have at least one non alphanumeric character.".into());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push("Passwords must have at least one digit ('0'-'9').".into());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        violations.push("Passwords must have at least one lowercase ('a'-'z').".into());
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        violations.push("Passwords must have at least one uppercase ('A'-'Z').".into());
    }

    violations
}
