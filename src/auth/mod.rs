//! Registration, login and bearer-token handling.
//!
//! [`AuthService`] is the auth repository used by the `/api/register` and `/api/login`
//! handlers. Users and roles live in an [`IdentityStore`]; passwords are hashed with
//! bcrypt and login issues a JWT through [`TokenService`].

pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::{ApplicationUser, LoginDto, LoginResponse, RegisterDto, UserDto};
use crate::store::IdentityStore;

pub use extractors::{Actor, AuthenticatedUser};
pub use middleware::AuthMiddleware;
pub use password::{hash_password, password_policy_violations, verify_password};
pub use token::{Claims, TokenService};

/// Error reported for any failed login, whatever the cause.
pub const INVALID_LOGIN: &str = "Invalid Login";

#[derive(Clone)]
pub struct AuthService {
    identities: Arc<dyn IdentityStore>,
    tokens: TokenService,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(identities: Arc<dyn IdentityStore>, tokens: TokenService, bcrypt_cost: u32) -> Self {
        Self {
            identities,
            tokens,
            bcrypt_cost,
        }
    }

    /// Whether no user holds `user_name` (case-insensitively).
    pub async fn is_unique(&self, user_name: &str) -> Result<bool, AppError> {
        Ok(self.identities.find_by_name(user_name).await?.is_none())
    }

    /// Creates a user and assigns the requested role.
    ///
    /// Username/email rules and the password policy are all evaluated and reported
    /// together as `AppError::Validation`; an unknown role is rejected before the user
    /// is stored.
    pub async fn register(&self, dto: &RegisterDto) -> Result<UserDto, AppError> {
        let mut violations = match dto.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => crate::validation::messages(&errors),
        };
        violations.extend(password_policy_violations(&dto.password));
        if !violations.is_empty() {
            return Err(AppError::Validation(violations));
        }

        let role = self
            .identities
            .find_role(&dto.role)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("Role '{}' does not exist.", dto.role)))?;

        let user = ApplicationUser {
            id: Uuid::new_v4(),
            user_name: dto.user_name.clone(),
            email: dto.email.clone(),
            first_name: dto.first_name.clone(),
            last_name: dto.last_name.clone(),
            password_hash: hash_password(&dto.password, self.bcrypt_cost)?,
            created_at: Utc::now(),
        };
        let user = self.identities.create_user(user).await?;
        self.identities.add_to_role(user.id, &role).await?;

        let roles = self.identities.roles_for(user.id).await?;
        log::info!("registered user {} with role {}", user.user_name, role);
        Ok(UserDto::from_user(&user, &roles))
    }

    /// Verifies the credentials and issues a token carrying the user's id, name and roles.
    ///
    /// Unknown users and wrong passwords both fail with `BadRequest(INVALID_LOGIN)`.
    pub async fn login(&self, dto: &LoginDto) -> Result<LoginResponse, AppError> {
        let user = match self.identities.find_by_name(&dto.user_name).await? {
            Some(user) => user,
            None => return Err(AppError::BadRequest(INVALID_LOGIN.into())),
        };

        if !verify_password(&dto.password, &user.password_hash)? {
            return Err(AppError::BadRequest(INVALID_LOGIN.into()));
        }

        let roles = self.identities.roles_for(user.id).await?;
        let token = self.tokens.generate(&user, &roles)?;

        Ok(LoginResponse {
            user: UserDto::from_user(&user, &roles),
            token,
        })
    }
}
