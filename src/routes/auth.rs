use crate::{
    auth::AuthService,
    error::AppError,
    models::{LoginDto, RegisterDto},
    response::ApiResponse,
};
use actix_web::{post, web, HttpResponse};

/// Register a new user
///
/// Rejects taken usernames, then hands the payload to the identity store, which
/// enforces username/email rules, the password policy and the existence of the role.
/// Every identity failure is reported verbatim with `400 Bad Request`.
#[post("/register")]
pub async fn register(
    auth: web::Data<AuthService>,
    dto: web::Json<RegisterDto>,
) -> Result<HttpResponse, AppError> {
    log::info!(">>> POST /api/register");

    if !auth.is_unique(&dto.user_name).await? {
        return Err(AppError::BadRequest("Username already exists!".into()));
    }

    let user = auth.register(&dto).await?;
    Ok(ApiResponse::ok(user).into_response())
}

/// Login user
///
/// Verifies the credentials and returns the user summary with a bearer token valid
/// for the configured lifetime. Any failure answers `400 Bad Request` with
/// `"Invalid Login"`.
#[post("/login")]
pub async fn login(
    auth: web::Data<AuthService>,
    dto: web::Json<LoginDto>,
) -> Result<HttpResponse, AppError> {
    log::info!(">>> POST /api/login");

    let response = auth.login(&dto).await?;
    Ok(ApiResponse::ok(response).into_response())
}
