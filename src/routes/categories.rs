use crate::{
    auth::Actor,
    error::AppError,
    models::{CategoryCreateDto, CategoryDto, CategoryUpdateDto, NewCategory},
    response::ApiResponse,
    store::{CategoryRepository, DUPLICATE_NAME, INVALID_ID},
    validation::{validate_create, validate_update},
};
use actix_web::{delete, get, http::StatusCode, post, put, web, HttpResponse};
use chrono::Utc;

const NON_POSITIVE_ID: &str = "Id is zero or negative";

/// Lists every category.
///
/// ## Responses:
/// - `200 OK`: envelope whose `result` is an array of `{id, name}`.
#[get("/categories")]
pub async fn get_categories(
    repo: web::Data<dyn CategoryRepository>,
) -> Result<HttpResponse, AppError> {
    log::info!(">>> GET /api/categories");

    let categories: Vec<CategoryDto> = repo
        .list_all()
        .await?
        .into_iter()
        .map(CategoryDto::from)
        .collect();

    Ok(ApiResponse::ok(categories).into_response())
}

/// Retrieves a single category by id.
///
/// ## Responses:
/// - `200 OK`: envelope carrying the category.
/// - `400 Bad Request`: the id is zero or negative.
/// - `404 Not Found`: no category has this id. The envelope carries no error message.
#[get("/category/{id}")]
pub async fn get_category(
    repo: web::Data<dyn CategoryRepository>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    log::info!(">>> GET /api/category/{}", id);

    if id < 1 {
        return Err(AppError::BadRequest(NON_POSITIVE_ID.into()));
    }

    match repo.get_by_id(id).await? {
        Some(category) => Ok(ApiResponse::ok(CategoryDto::from(category)).into_response()),
        None => Ok(ApiResponse::failure(StatusCode::NOT_FOUND, Vec::new()).into_response()),
    }
}

/// Creates a category.
///
/// Checks run in order and the first failing stage answers: payload rules, name
/// emptiness, name uniqueness (case-insensitive). The creation is stamped with the
/// caller and the current time.
///
/// ## Responses:
/// - `200 OK`: envelope carrying the created category and its new id.
/// - `400 Bad Request`: rule violations, or `"Name already exists"`.
#[post("/category")]
pub async fn create_category(
    repo: web::Data<dyn CategoryRepository>,
    dto: web::Json<CategoryCreateDto>,
    actor: Actor,
) -> Result<HttpResponse, AppError> {
    log::info!(">>> POST /api/category");

    let violations = validate_create(&dto);
    if !violations.is_empty() {
        return Err(AppError::Validation(violations));
    }
    if dto.name.is_empty() {
        return Err(AppError::BadRequest("Invalid".into()));
    }
    if repo.get_by_name(&dto.name).await?.is_some() {
        return Err(AppError::BadRequest(DUPLICATE_NAME.into()));
    }

    let category = repo
        .create(NewCategory::from_dto(&dto, actor.name(), Utc::now()))
        .await?;
    log::info!("created category {} ({})", category.id, category.name);

    Ok(ApiResponse::ok(CategoryDto::from(category)).into_response())
}

/// Renames a category.
///
/// Checks run in order: payload rules, name emptiness, uniqueness of the name among
/// the other categories, existence of the id. The change is stamped with the caller
/// and the current time; id and creation stamps are preserved.
///
/// ## Responses:
/// - `200 OK`: envelope carrying the updated category.
/// - `400 Bad Request`: rule violations, or `"Name already exists"`.
/// - `404 Not Found`: `"Invalid Id"`.
#[put("/category")]
pub async fn update_category(
    repo: web::Data<dyn CategoryRepository>,
    dto: web::Json<CategoryUpdateDto>,
    actor: Actor,
) -> Result<HttpResponse, AppError> {
    log::info!(">>> PUT /api/category");

    let violations = validate_update(&dto);
    if !violations.is_empty() {
        return Err(AppError::Validation(violations));
    }
    if dto.name.is_empty() {
        return Err(AppError::BadRequest("Invalid".into()));
    }

    let name = dto.name.to_lowercase();
    let clash = repo
        .list_all()
        .await?
        .iter()
        .any(|c| c.id != dto.id && c.name.to_lowercase() == name);
    if clash {
        return Err(AppError::BadRequest(DUPLICATE_NAME.into()));
    }

    let mut category = repo
        .get_by_id(dto.id)
        .await?
        .ok_or_else(|| AppError::NotFound(INVALID_ID.into()))?;
    category.apply_update(&dto, actor.name(), Utc::now());

    let category = repo.update(&category).await?;
    Ok(ApiResponse::ok(CategoryDto::from(category)).into_response())
}

/// Deletes a category permanently.
///
/// ## Responses:
/// - `200 OK`: envelope carrying the deleted category.
/// - `400 Bad Request`: the id is zero or negative.
/// - `404 Not Found`: `"Invalid Id"`.
#[delete("/category/{id}")]
pub async fn delete_category(
    repo: web::Data<dyn CategoryRepository>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    log::info!(">>> DELETE /api/category/{}", id);

    if id < 1 {
        return Err(AppError::BadRequest(NON_POSITIVE_ID.into()));
    }

    let category = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(INVALID_ID.into()))?;
    repo.delete(&category).await?;
    log::info!("deleted category {} ({})", category.id, category.name);

    Ok(ApiResponse::ok(CategoryDto::from(category)).into_response())
}
