//! Persistence ports for categories and identities.
//!
//! Handlers receive these as `web::Data<dyn CategoryRepository>` and
//! `web::Data<dyn IdentityStore>`; `main` picks the Postgres implementations when a
//! database is configured and the in-memory ones otherwise.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{ApplicationUser, Category, NewCategory};

pub use memory::{InMemoryCategoryRepository, InMemoryIdentityStore};
pub use postgres::{PgCategoryRepository, PgIdentityStore};

/// Error message reported when a category name is already taken.
pub const DUPLICATE_NAME: &str = "Name already exists";
/// Error message reported when a category id does not resolve to a record.
pub const INVALID_ID: &str = "Invalid Id";

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Every category, ordered by id.
    async fn list_all(&self) -> Result<Vec<Category>, AppError>;

    async fn get_by_id(&self, id: i32) -> Result<Option<Category>, AppError>;

    /// Case-insensitive exact match on the name.
    async fn get_by_name(&self, name: &str) -> Result<Option<Category>, AppError>;

    /// Assigns `max(id) + 1` and persists the category.
    ///
    /// Fails with `BadRequest(DUPLICATE_NAME)` if the name is taken at write time.
    async fn create(&self, category: NewCategory) -> Result<Category, AppError>;

    /// Replaces the mutable fields of an existing category.
    ///
    /// Fails with `NotFound(INVALID_ID)` for an unknown id and with
    /// `BadRequest(DUPLICATE_NAME)` if another category holds the name.
    async fn update(&self, category: &Category) -> Result<Category, AppError>;

    /// Removes the category permanently.
    async fn delete(&self, category: &Category) -> Result<(), AppError>;
}

/// User and role storage backing registration and login.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Case-insensitive lookup by username.
    async fn find_by_name(&self, user_name: &str) -> Result<Option<ApplicationUser>, AppError>;

    /// Persists a new user. Fails with `BadRequest` if the username is taken.
    async fn create_user(&self, user: ApplicationUser) -> Result<ApplicationUser, AppError>;

    /// Registers a role if no role with that name (case-insensitively) exists.
    async fn ensure_role(&self, role: &str) -> Result<(), AppError>;

    /// Canonical spelling of a role, if it exists.
    async fn find_role(&self, role: &str) -> Result<Option<String>, AppError>;

    async fn add_to_role(&self, user_id: Uuid, role: &str) -> Result<(), AppError>;

    /// Roles assigned to the user, in assignment order.
    async fn roles_for(&self, user_id: Uuid) -> Result<Vec<String>, AppError>;
}

pub(crate) fn duplicate_user_name(user_name: &str) -> AppError {
    AppError::BadRequest(format!("Username '{}' is already taken.", user_name))
}
