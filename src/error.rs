//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every failure a handler, the query engine or a store can produce is expressed as one
//! of its variants, which map onto the four classes callers care about: input errors
//! (400), identity failures (401), missing resources (404) and storage or internal
//! failures (500).
//!
//! `AppError` implements `actix_web::error::ResponseError` so that it renders as the
//! common error envelope `{"success": false, "message": ...}`. Storage and internal
//! errors are logged with their cause and rendered with a generic message.
//! `From` implementations for `sqlx::Error`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error`, `bcrypt::BcryptError` and `tokio`'s timeout error
//! allow the `?` operator to be used everywhere.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::ValidationErrors;

/// Message sent to clients in place of storage or internal failure details.
pub const GENERIC_FAILURE_MESSAGE: &str = "Internal server error";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Missing or invalid identity proof (HTTP 401).
    Unauthorized(String),
    /// Malformed or invalid caller input (HTTP 400).
    BadRequest(String),
    /// The targeted resource does not exist or is not visible to the caller (HTTP 404).
    NotFound(String),
    /// Unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// The store is unreachable, timed out, or rejected the operation (HTTP 500).
    DatabaseError(String),
    /// Input failed field validation (HTTP 400).
    ValidationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Body of every failed response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub message: String,
}

impl AppError {
    /// The message exposed to the caller. Storage and internal details stay in the logs.
    pub fn public_message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::ValidationError(msg) => msg,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                GENERIC_FAILURE_MESSAGE
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            log::error!("{}", self);
        }
        HttpResponse::build(self.status_code()).json(ErrorEnvelope {
            success: false,
            message: self.public_message().to_string(),
        })
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound`; every other database error becomes `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
///
/// Only the first failing field is reported, using its custom message when one is set.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by_key(|(field, _)| *field);

        let message = fields
            .first()
            .and_then(|(field, errs)| errs.first().map(|err| (field, err)))
            .map(|(field, err)| match &err.message {
                Some(msg) => msg.to_string(),
                None => format!("\"{}\" failed {} validation", field, err.code),
            })
            .unwrap_or_else(|| errors.to_string());

        AppError::ValidationError(message)
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::Unauthorized`.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(format!("Invalid token: {}", error))
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

/// A storage call that outlived the configured query timeout.
impl From<tokio::time::error::Elapsed> for AppError {
    fn from(_: tokio::time::error::Elapsed) -> AppError {
        AppError::DatabaseError("storage operation timed out".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use validator::Validate;

    #[test]
    fn test_error_responses() {
        let error = AppError::Unauthorized("Invalid token".into());
        assert_eq!(error.error_response().status(), 401);

        let error = AppError::BadRequest("Invalid input".into());
        assert_eq!(error.error_response().status(), 400);

        let error = AppError::ValidationError("title too short".into());
        assert_eq!(error.error_response().status(), 400);

        let error = AppError::NotFound("Todo not found".into());
        assert_eq!(error.error_response().status(), 404);

        let error = AppError::DatabaseError("connection refused".into());
        assert_eq!(error.error_response().status(), 500);
    }

    #[actix_rt::test]
    async fn test_storage_details_are_not_leaked() {
        let error = AppError::DatabaseError("password authentication failed".into());
        let body = to_bytes(error.error_response().into_body()).await.unwrap();
        let envelope: ErrorEnvelope = serde_json::from_slice(&body).unwrap();

        assert!(!envelope.success);
        assert_eq!(envelope.message, GENERIC_FAILURE_MESSAGE);
    }

    #[derive(Validate)]
    struct Titled {
        #[validate(length(min = 3))]
        title: String,
    }

    #[test]
    fn test_validation_message_names_the_field() {
        let errors = Titled { title: "ab".into() }.validate().unwrap_err();
        match AppError::from(errors) {
            AppError::ValidationError(msg) => assert!(msg.contains("title"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
