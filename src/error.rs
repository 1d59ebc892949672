//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! It centralizes error management, providing a consistent way to handle and represent
//! the failures that can occur while serving lists, tasks and comments.
//!
//! `AppError` implements `actix_web::error::ResponseError` so handlers can return it
//! directly. Since every client of this service is a browser, errors are rendered as
//! HTML pages, and `Unauthorized` turns into a redirect to the login page.
//! `From` implementations for `sqlx::Error`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error` and `bcrypt::BcryptError` allow the `?` operator.

use actix_web::{
    http::{header, StatusCode},
    HttpResponse, ResponseError,
};
use std::fmt;
use validator::ValidationErrors;

use crate::views;

/// Where anonymous visitors are sent.
pub const LOGIN_PATH: &str = "/login/";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// No valid session (answered with a 303 redirect to the login page).
    Unauthorized(String),
    /// Authenticated, but the role or group membership does not allow the action (HTTP 403).
    Forbidden(String),
    /// Malformed request data, such as an unparseable due date (HTTP 400).
    BadRequest(String),
    /// A requested record does not exist (HTTP 404).
    NotFound(String),
    /// A lookup expected a single record but matched several, or a unique name is taken (HTTP 409).
    Conflict(String),
    /// Unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// Failure reported by the database layer (HTTP 500).
    DatabaseError(String),
    /// Form input failed validation (HTTP 422 Unprocessable Entity).
    ValidationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::SEE_OTHER,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (title, detail) = match self {
            AppError::Unauthorized(_) => {
                return HttpResponse::SeeOther()
                    .insert_header((header::LOCATION, LOGIN_PATH))
                    .finish();
            }
            AppError::Forbidden(msg) => ("Permission denied", msg.as_str()),
            AppError::BadRequest(msg) => ("Bad request", msg.as_str()),
            AppError::NotFound(msg) => ("Not found", msg.as_str()),
            AppError::Conflict(msg) => ("Conflict", msg.as_str()),
            AppError::ValidationError(msg) => ("Invalid input", msg.as_str()),
            // Database details stay in the log.
            AppError::InternalServerError(msg) | AppError::DatabaseError(msg) => {
                log::error!("{}", msg);
                ("Server error", "Something went wrong on our side.")
            }
        };

        HttpResponse::build(self.status_code())
            .content_type("text/html; charset=utf-8")
            .body(views::layout::error_page(title, detail))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` maps to `AppError::NotFound`; everything else becomes `AppError::DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> AppError {
        AppError::DatabaseError(format!("Migration failed: {}", error))
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// A token that fails to decode or verify means the session is gone.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
