use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::borrow::Cow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

lazy_static! {
    // Letters, digits and the separators identity usernames may contain.
    static ref USERNAME_REGEX: regex::Regex =
        regex::Regex::new(r"^[a-zA-Z0-9\-._@+]+$").expect("username pattern is valid");
}

/// A user record owned by the identity store.
#[derive(Debug, Clone, FromRow)]
pub struct ApplicationUser {
    pub id: Uuid,
    pub user_name: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Payload of `POST /api/register`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDto {
    #[validate(custom = "user_name_allowed")]
    pub user_name: String,
    #[validate(email(message = "Email is invalid."))]
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: String,
    pub role: String,
}

fn user_name_allowed(user_name: &str) -> Result<(), ValidationError> {
    if USERNAME_REGEX.is_match(user_name) {
        return Ok(());
    }
    let mut error = ValidationError::new("invalid_user_name");
    error.message = Some(Cow::from(format!(
        "Username '{}' is invalid, can only contain letters or digits.",
        user_name
    )));
    Err(error)
}

/// Payload of `POST /api/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginDto {
    pub user_name: String,
    pub password: String,
}

/// Public summary of a user. `role` is the first role assigned to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub user_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: String,
}

impl UserDto {
    pub fn from_user(user: &ApplicationUser, roles: &[String]) -> Self {
        Self {
            id: user.id.to_string(),
            user_name: user.user_name.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: roles.first().cloned().unwrap_or_default(),
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserDto,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_dto(user_name: &str, email: &str) -> RegisterDto {
        RegisterDto {
            user_name: user_name.to_string(),
            email: email.to_string(),
            first_name: None,
            last_name: None,
            password: "Secret1!".to_string(),
            role: "admin".to_string(),
        }
    }

    #[test]
    fn test_register_dto_validation() {
        assert!(register_dto("jane.doe@corp", "jane@example.com").validate().is_ok());
        assert!(register_dto("jane doe", "jane@example.com").validate().is_err());
        assert!(register_dto("", "jane@example.com").validate().is_err());
        assert!(register_dto("jane", "not-an-email").validate().is_err());
    }

    #[test]
    fn test_rejected_user_name_is_quoted() {
        let errors = register_dto("jane doe", "jane@example.com")
            .validate()
            .unwrap_err();
        assert_eq!(
            crate::validation::messages(&errors),
            vec!["Username 'jane doe' is invalid, can only contain letters or digits.".to_string()]
        );
    }

    #[test]
    fn test_register_dto_reads_camel_case() {
        let dto: RegisterDto = serde_json::from_value(serde_json::json!({
            "userName": "jane",
            "email": "jane@example.com",
            "firstName": "Jane",
            "password": "Secret1!",
            "role": "admin"
        }))
        .unwrap();

        assert_eq!(dto.user_name, "jane");
        assert_eq!(dto.first_name.as_deref(), Some("Jane"));
        assert!(dto.last_name.is_none());
    }

    #[test]
    fn test_user_dto_takes_first_role() {
        let user = ApplicationUser {
            id: Uuid::new_v4(),
            user_name: "jane".to_string(),
            email: "jane@example.com".to_string(),
            first_name: Some("Jane".to_string()),
            last_name: None,
            password_hash: String::new(),
            created_at: Utc::now(),
        };

        let dto = UserDto::from_user(&user, &["admin".to_string(), "customer".to_string()]);
        assert_eq!(dto.role, "admin");
        assert_eq!(dto.id, user.id.to_string());

        let dto = UserDto::from_user(&user, &[]);
        assert_eq!(dto.role, "");
    }
}
