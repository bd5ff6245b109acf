#![doc = "The `minimal_api` library crate."]
#![doc = ""]
#![doc = "A category catalogue served over HTTP: CRUD endpoints wrapped in a uniform"]
#![doc = "response envelope, registration and login issuing JWT bearer tokens, and a few"]
#![doc = "demo endpoints. The binary (`main.rs`) reads the configuration, picks the"]
#![doc = "Postgres or in-memory stores and mounts `routes::configure` on an actix-web server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod response;
pub mod routes;
pub mod store;
pub mod validation;

pub use crate::error::AppError;
pub use crate::response::ApiResponse;
