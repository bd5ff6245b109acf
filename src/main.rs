use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use chrono::Duration;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

use minimal_api::auth::{AuthService, TokenService};
use minimal_api::config::Config;
use minimal_api::routes::{self, AppState};
use minimal_api::store::{
    postgres, CategoryRepository, IdentityStore, InMemoryCategoryRepository,
    InMemoryIdentityStore, PgCategoryRepository, PgIdentityStore,
};

fn other_error(err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}

async fn build_stores(
    config: &Config,
) -> std::io::Result<(Arc<dyn CategoryRepository>, Arc<dyn IdentityStore>)> {
    match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await
                .map_err(other_error)?;
            postgres::migrate(&pool).await.map_err(other_error)?;
            log::info!("using Postgres stores");
            Ok((
                Arc::new(PgCategoryRepository::new(pool.clone())),
                Arc::new(PgIdentityStore::new(pool)),
            ))
        }
        None => {
            log::warn!("DATABASE_URL not set; using in-memory stores, data will not survive a restart");
            let categories = if config.seed_categories {
                InMemoryCategoryRepository::seeded()
            } else {
                InMemoryCategoryRepository::new()
            };
            Ok((Arc::new(categories), Arc::new(InMemoryIdentityStore::new())))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(|e| {
        log::error!("invalid configuration: {}", e);
        other_error(e)
    })?;

    let (categories, identities) = build_stores(&config).await?;
    for role in &config.roles {
        identities.ensure_role(role).await.map_err(other_error)?;
    }

    let tokens = TokenService::new(&config.jwt_secret, Duration::days(config.token_ttl_days));
    let state = AppState {
        categories,
        auth: AuthService::new(identities, tokens.clone(), config.bcrypt_cost),
        tokens,
    };

    log::info!("Starting server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::configure(state.clone()))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
