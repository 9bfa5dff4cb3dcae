use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header, Method},
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::{AuthState, Claims};
use crate::error::AppError;

/// Routes under `/api` reachable without a bearer token.
const PUBLIC_ROUTES: &[(&str, &str)] = &[
    ("POST", "/api/users"),
    ("POST", "/api/users/login"),
    ("GET", "/api/users"),
    ("GET", "/api/todos"),
];

fn is_public(method: &Method, path: &str) -> bool {
    let path = path.strip_suffix('/').unwrap_or(path);
    PUBLIC_ROUTES
        .iter()
        .any(|(m, p)| *m == method.as_str() && *p == path)
}

/// Verifies the `Authorization: Bearer <token>` header and stores the decoded
/// [`Claims`] in the request extensions. Requests without a valid token are answered
/// with 401 before any handler (and therefore any storage call) runs.
///
/// Routing happens after this check, so an unknown path under `/api` such as
/// `GET /api/nope` is also a 401 without a token. With a valid token it is a 404.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

fn authenticate(req: &ServiceRequest) -> Result<Claims, AppError> {
    let state = req
        .app_data::<web::Data<AuthState>>()
        .ok_or_else(|| AppError::InternalServerError("AuthState is not registered".into()))?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Unauthorized access".into()))?;

    state.tokens.verify(token)
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if !is_public(req.method(), req.path()) {
            match authenticate(&req) {
                Ok(claims) => {
                    req.extensions_mut().insert(claims);
                }
                Err(err) => {
                    log::warn!("{} {} rejected: {}", req.method(), req.path(), err);
                    let response = req.into_response(err.error_response()).map_into_right_body();
                    return Box::pin(ready(Ok(response)));
                }
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}
