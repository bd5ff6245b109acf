use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::middleware::bearer_token;
use crate::auth::token::{Claims, TokenService};
use crate::error::AppError;

/// Name recorded in audit fields when the caller presents no valid token.
pub const ANONYMOUS: &str = "anonymous";

/// Claims of the caller, as verified by `AuthMiddleware`.
///
/// Only usable on routes wrapped by the middleware; elsewhere extraction fails with
/// `AppError::Unauthorized`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Claims>().cloned() {
            Some(claims) => ready(Ok(AuthenticatedUser(claims))),
            None => {
                let err = AppError::Unauthorized(
                    "Claims not found in request. Ensure AuthMiddleware is active.".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}

/// Who is making the request, for audit stamping.
///
/// Resolves to the username of a valid bearer token, or to [`ANONYMOUS`]. Never fails:
/// category endpoints do not require authentication.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor(pub String);

impl Actor {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl FromRequest for Actor {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        if let Some(claims) = req.extensions().get::<Claims>() {
            return ready(Ok(Actor(claims.name.clone())));
        }

        let name = match (req.app_data::<web::Data<TokenService>>(), bearer_token(req.headers())) {
            (Some(tokens), Some(token)) => match tokens.verify(token) {
                Ok(claims) => claims.name,
                Err(err) => {
                    log::debug!("ignoring bearer token for audit: {}", err);
                    ANONYMOUS.to_string()
                }
            },
            _ => ANONYMOUS.to_string(),
        };
        ready(Ok(Actor(name)))
    }
}
