//! Postgres-backed stores.
//!
//! Category writes run inside a transaction that takes a `SHARE ROW EXCLUSIVE` lock on
//! the `categories` table, so the name check, the id assignment and the write are
//! atomic with respect to concurrent writers. Schema lives in `migrations/`.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{duplicate_user_name, CategoryRepository, IdentityStore, DUPLICATE_NAME, INVALID_ID};
use crate::error::AppError;
use crate::models::{ApplicationUser, Category, NewCategory};

const CATEGORY_COLUMNS: &str =
    "id, name, created_by, created_on, last_modified_by, last_modified_on";

const LOCK_CATEGORIES: &str = "LOCK TABLE categories IN SHARE ROW EXCLUSIVE MODE";

fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => db_error.is_unique_violation(),
        _ => false,
    }
}

/// Applies pending migrations from `migrations/`.
pub async fn migrate(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn list_all(&self) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories ORDER BY id",
            CATEGORY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories WHERE id = $1",
            CATEGORY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories WHERE LOWER(name) = LOWER($1)",
            CATEGORY_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn create(&self, category: NewCategory) -> Result<Category, AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(LOCK_CATEGORIES).execute(&mut *tx).await?;

        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM categories WHERE LOWER(name) = LOWER($1))",
        )
        .bind(&category.name)
        .fetch_one(&mut *tx)
        .await?;
        if taken {
            return Err(AppError::BadRequest(DUPLICATE_NAME.into()));
        }

        let created = sqlx::query_as::<_, Category>(&format!(
            "INSERT INTO categories (id, name, created_by, created_on)
             SELECT COALESCE(MAX(id), 0) + 1, $1, $2, $3 FROM categories
             RETURNING {}",
            CATEGORY_COLUMNS
        ))
        .bind(&category.name)
        .bind(&category.created_by)
        .bind(category.created_on)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::BadRequest(DUPLICATE_NAME.into())
            } else {
                AppError::from(e)
            }
        })?;

        tx.commit().await?;
        Ok(created)
    }

    async fn update(&self, category: &Category) -> Result<Category, AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(LOCK_CATEGORIES).execute(&mut *tx).await?;

        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM categories WHERE id <> $1 AND LOWER(name) = LOWER($2))",
        )
        .bind(category.id)
        .bind(&category.name)
        .fetch_one(&mut *tx)
        .await?;
        if taken {
            return Err(AppError::BadRequest(DUPLICATE_NAME.into()));
        }

        let updated = sqlx::query_as::<_, Category>(&format!(
            "UPDATE categories
             SET name = $1, last_modified_by = $2, last_modified_on = $3
             WHERE id = $4
             RETURNING {}",
            CATEGORY_COLUMNS
        ))
        .bind(&category.name)
        .bind(&category.last_modified_by)
        .bind(category.last_modified_on)
        .bind(category.id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(INVALID_ID.into()))?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete(&self, category: &Category) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(category.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(INVALID_ID.into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn find_by_name(&self, user_name: &str) -> Result<Option<ApplicationUser>, AppError> {
        let user = sqlx::query_as::<_, ApplicationUser>(
            "SELECT id, user_name, email, first_name, last_name, password_hash, created_at
             FROM users WHERE LOWER(user_name) = LOWER($1)",
        )
        .bind(user_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, user: ApplicationUser) -> Result<ApplicationUser, AppError> {
        sqlx::query_as::<_, ApplicationUser>(
            "INSERT INTO users (id, user_name, email, first_name, last_name, password_hash, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id, user_name, email, first_name, last_name, password_hash, created_at",
        )
        .bind(user.id)
        .bind(&user.user_name)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                duplicate_user_name(&user.user_name)
            } else {
                AppError::from(e)
            }
        })
    }

    async fn ensure_role(&self, role: &str) -> Result<(), AppError> {
        sqlx::query("INSERT INTO roles (name) VALUES ($1) ON CONFLICT DO NOTHING")
            .bind(role)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_role(&self, role: &str) -> Result<Option<String>, AppError> {
        let name = sqlx::query_scalar::<_, String>("SELECT name FROM roles WHERE LOWER(name) = LOWER($1)")
            .bind(role)
            .fetch_optional(&self.pool)
            .await?;
        Ok(name)
    }

    async fn add_to_role(&self, user_id: Uuid, role: &str) -> Result<(), AppError> {
        let canonical = self
            .find_role(role)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("Role '{}' does not exist.", role)))?;

        sqlx::query(
            "INSERT INTO user_roles (user_id, role_name) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(canonical)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn roles_for(&self, user_id: Uuid) -> Result<Vec<String>, AppError> {
        let roles = sqlx::query_scalar::<_, String>(
            "SELECT role_name FROM user_roles WHERE user_id = $1 ORDER BY assigned_at, role_name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(roles)
    }
}
