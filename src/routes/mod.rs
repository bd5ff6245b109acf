pub mod auth;
pub mod categories;
pub mod demo;
pub mod health;

use actix_web::web;
use std::sync::Arc;

use crate::auth::{AuthMiddleware, AuthService, TokenService};
use crate::error::AppError;
use crate::store::CategoryRepository;

/// Shared services injected into the handlers.
#[derive(Clone)]
pub struct AppState {
    pub categories: Arc<dyn CategoryRepository>,
    pub auth: AuthService,
    pub tokens: TokenService,
}

/// JSON extractor settings: malformed bodies answer with a `400` envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

/// Registers the shared services and every route of the service.
///
/// Literal routes are registered before the `/{id}` demo route.
pub fn configure(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::from(state.categories))
            .app_data(web::Data::new(state.auth))
            .app_data(web::Data::new(state.tokens.clone()))
            .app_data(json_config())
            .service(
                web::scope("/api")
                    .service(categories::get_categories)
                    .service(categories::get_category)
                    .service(categories::create_category)
                    .service(categories::update_category)
                    .service(categories::delete_category)
                    .service(auth::register)
                    .service(auth::login),
            )
            .service(health::health)
            .service(
                web::resource("/weatherforecast")
                    .wrap(AuthMiddleware::new(state.tokens))
                    .route(web::get().to(demo::weather_forecast)),
            )
            .service(demo::index)
            .service(demo::index_post)
            .service(demo::echo_id);
    }
}
