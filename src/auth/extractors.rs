use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::auth::token::Claims;
use crate::error::AppError;
use crate::models::Role;

/// The signed-in user, taken from the claims `AuthMiddleware` stored in request extensions.
///
/// Missing claims mean the middleware did not run for this route; the request is then
/// treated as anonymous and sent to the login page.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
    /// The login this request belongs to; flash messages are queued per session.
    pub session: Uuid,
}

impl AuthenticatedUser {
    /// Fails with `Forbidden` unless the user is an administrator.
    pub fn require_administrator(&self) -> Result<(), AppError> {
        if self.role.is_administrator() {
            Ok(())
        } else {
            log::warn!("{} attempted an administrator action", self.username);
            Err(AppError::Forbidden(
                "Only administrators may do that.".into(),
            ))
        }
    }
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        AuthenticatedUser {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
            session: claims.sid,
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Claims>().cloned() {
            Some(claims) => ready(Ok(AuthenticatedUser::from(claims))),
            None => {
                let err = AppError::Unauthorized("No session claims on request".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
