use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::Claims;
use crate::error::AppError;

/// The verified identity of the caller.
///
/// Read from the [`Claims`] that `AuthMiddleware` stores in the request extensions.
/// A request without claims is `Unauthorized`; a verified token that carries no
/// email is a `BadRequest`, since the owner predicate cannot be built from it.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub email: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.extensions().get::<Claims>() {
            Some(claims) if !claims.sub.trim().is_empty() => Ok(AuthenticatedUser {
                email: claims.sub.clone(),
            }),
            Some(_) => Err(AppError::BadRequest("User email not found".into())),
            None => Err(AppError::Unauthorized("Unauthorized access".into())),
        };
        ready(result.map_err(Into::into))
    }
}
