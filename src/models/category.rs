use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::borrow::Cow;
use validator::{Validate, ValidationError};

/// A category as persisted by the store, including its audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Category {
    /// Unique identifier, assigned by the store as `max(id) + 1`.
    pub id: i32,
    /// Display name, unique case-insensitively.
    pub name: String,
    pub created_by: Option<String>,
    pub created_on: Option<DateTime<Utc>>,
    pub last_modified_by: Option<String>,
    pub last_modified_on: Option<DateTime<Utc>>,
}

/// A category that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub created_by: String,
    pub created_on: DateTime<Utc>,
}

impl NewCategory {
    /// Builds the record to persist from a create payload, stamping the audit fields.
    pub fn from_dto(dto: &CategoryCreateDto, actor: &str, now: DateTime<Utc>) -> Self {
        Self {
            name: dto.name.clone(),
            created_by: actor.to_string(),
            created_on: now,
        }
    }

    pub fn into_category(self, id: i32) -> Category {
        Category {
            id,
            name: self.name,
            created_by: Some(self.created_by),
            created_on: Some(self.created_on),
            last_modified_by: None,
            last_modified_on: None,
        }
    }
}

impl Category {
    /// Applies an update payload: replaces the name and stamps the last-modified fields.
    /// Id and creation stamps are left untouched.
    pub fn apply_update(&mut self, dto: &CategoryUpdateDto, actor: &str, now: DateTime<Utc>) {
        self.name = dto.name.clone();
        self.last_modified_by = Some(actor.to_string());
        self.last_modified_on = Some(now);
    }
}

/// The shape of a category exposed to API consumers. Audit fields are not part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDto {
    pub id: i32,
    pub name: String,
}

impl From<&Category> for CategoryDto {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
        }
    }
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
        }
    }
}

/// Payload of `POST /api/category`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoryCreateDto {
    #[serde(default)]
    #[validate(custom = "name_not_blank")]
    pub name: String,
}

/// Payload of `PUT /api/category`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoryUpdateDto {
    /// Missing ids deserialize as `0`. Id rules are checked in `validation::validate_update`.
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    #[validate(custom = "name_not_blank")]
    pub name: String,
}

fn name_not_blank(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.message = Some(Cow::from("'Name' must not be empty."));
        return Err(error);
    }
    Ok(())
}
