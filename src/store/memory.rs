//! In-memory stores used when no database is configured, and by the test suite.
//!
//! Each store keeps its state behind a `tokio::sync::RwLock`; every check-then-write
//! sequence runs under a single write guard.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{duplicate_user_name, CategoryRepository, IdentityStore, DUPLICATE_NAME, INVALID_ID};
use crate::error::AppError;
use crate::models::{ApplicationUser, Category, NewCategory};

#[derive(Debug, Default)]
pub struct InMemoryCategoryRepository {
    categories: RwLock<BTreeMap<i32, Category>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories(categories: impl IntoIterator<Item = Category>) -> Self {
        Self {
            categories: RwLock::new(categories.into_iter().map(|c| (c.id, c)).collect()),
        }
    }

    /// A store holding the demo categories "1", "2" and "3".
    pub fn seeded() -> Self {
        let now = Utc::now();
        Self::with_categories((1..=3).map(|id| {
            NewCategory {
                name: id.to_string(),
                created_by: id.to_string(),
                created_on: now,
            }
            .into_category(id)
        }))
    }
}

fn name_taken(categories: &BTreeMap<i32, Category>, name: &str, except: Option<i32>) -> bool {
    let name = name.to_lowercase();
    categories
        .values()
        .any(|c| Some(c.id) != except && c.name.to_lowercase() == name)
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn list_all(&self) -> Result<Vec<Category>, AppError> {
        Ok(self.categories.read().await.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Category>, AppError> {
        Ok(self.categories.read().await.get(&id).cloned())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Category>, AppError> {
        let name = name.to_lowercase();
        Ok(self
            .categories
            .read()
            .await
            .values()
            .find(|c| c.name.to_lowercase() == name)
            .cloned())
    }

    async fn create(&self, category: NewCategory) -> Result<Category, AppError> {
        let mut categories = self.categories.write().await;
        if name_taken(&categories, &category.name, None) {
            return Err(AppError::BadRequest(DUPLICATE_NAME.into()));
        }

        let id = categories.keys().next_back().copied().unwrap_or(0) + 1;
        let category = category.into_category(id);
        categories.insert(id, category.clone());
        Ok(category)
    }

    async fn update(&self, category: &Category) -> Result<Category, AppError> {
        let mut categories = self.categories.write().await;
        if !categories.contains_key(&category.id) {
            return Err(AppError::NotFound(INVALID_ID.into()));
        }
        if name_taken(&categories, &category.name, Some(category.id)) {
            return Err(AppError::BadRequest(DUPLICATE_NAME.into()));
        }

        categories.insert(category.id, category.clone());
        Ok(category.clone())
    }

    async fn delete(&self, category: &Category) -> Result<(), AppError> {
        match self.categories.write().await.remove(&category.id) {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(INVALID_ID.into())),
        }
    }
}

#[derive(Debug, Default)]
struct Identities {
    users: HashMap<Uuid, ApplicationUser>,
    roles: Vec<String>,
    user_roles: HashMap<Uuid, Vec<String>>,
}

#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    inner: RwLock<Identities>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn find_role_in(roles: &[String], role: &str) -> Option<String> {
    let role = role.to_lowercase();
    roles.iter().find(|r| r.to_lowercase() == role).cloned()
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find_by_name(&self, user_name: &str) -> Result<Option<ApplicationUser>, AppError> {
        let user_name = user_name.to_lowercase();
        Ok(self
            .inner
            .read()
            .await
            .users
            .values()
            .find(|u| u.user_name.to_lowercase() == user_name)
            .cloned())
    }

    async fn create_user(&self, user: ApplicationUser) -> Result<ApplicationUser, AppError> {
        let mut inner = self.inner.write().await;
        let user_name = user.user_name.to_lowercase();
        if inner
            .users
            .values()
            .any(|u| u.user_name.to_lowercase() == user_name)
        {
            return Err(duplicate_user_name(&user.user_name));
        }

        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn ensure_role(&self, role: &str) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        if find_role_in(&inner.roles, role).is_none() {
            inner.roles.push(role.to_string());
        }
        Ok(())
    }

    async fn find_role(&self, role: &str) -> Result<Option<String>, AppError> {
        Ok(find_role_in(&self.inner.read().await.roles, role))
    }

    async fn add_to_role(&self, user_id: Uuid, role: &str) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let role = find_role_in(&inner.roles, role)
            .ok_or_else(|| AppError::BadRequest(format!("Role '{}' does not exist.", role)))?;
        if !inner.users.contains_key(&user_id) {
            return Err(AppError::NotFound("User not found".into()));
        }

        let assigned = inner.user_roles.entry(user_id).or_default();
        if !assigned.contains(&role) {
            assigned.push(role);
        }
        Ok(())
    }

    async fn roles_for(&self, user_id: Uuid) -> Result<Vec<String>, AppError> {
        Ok(self
            .inner
            .read()
            .await
            .user_roles
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}
