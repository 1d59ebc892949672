use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::verify_token;
use crate::error::{AppError, LOGIN_PATH};
use crate::state::AppState;

/// Name of the cookie holding the session token.
pub const AUTH_COOKIE: &str = "todo_session";

/// Paths reachable without a session.
fn is_public(path: &str) -> bool {
    path == "/health" || path.starts_with(LOGIN_PATH) || path.starts_with("/logout/")
}

/// Session token from the cookie, falling back to an `Authorization: Bearer` header.
fn session_token(req: &ServiceRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(AUTH_COOKIE) {
        return Some(cookie.value().to_string());
    }
    req.headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

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
        if is_public(req.path()) {
            return self.pass(req);
        }

        let secret = match req.app_data::<web::Data<AppState>>() {
            Some(state) => state.auth.jwt_secret.clone(),
            None => {
                let app_err = AppError::InternalServerError("Application state is not configured".into());
                return reject(req, app_err);
            }
        };

        match session_token(&req) {
            Some(token) => match verify_token(&token, &secret) {
                Ok(claims) => {
                    req.extensions_mut().insert(claims);
                    self.pass(req)
                }
                Err(app_err) => {
                    log::warn!("Rejected session for {}: {}", req.path(), app_err);
                    reject(req, app_err)
                }
            },
            None => reject(req, AppError::Unauthorized("Missing session".into())),
        }
    }
}

impl<S, B> AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    fn pass(
        &self,
        req: ServiceRequest,
    ) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>> {
        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}

/// Answers the request with the error's response (a redirect to the login page for
/// `Unauthorized`) without calling the wrapped service.
fn reject<B: 'static>(
    req: ServiceRequest,
    app_err: AppError,
) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>> {
    let response = req.error_response(app_err).map_into_right_body();
    Box::pin(async move { Ok(response) })
}
