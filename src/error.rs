//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every variant is recoverable at the request boundary: authentication and authorization
//! failures become redirects carrying a flash message, the rest become plain error pages.
//!
//! `AppError` implements `actix_web::error::ResponseError`, so handlers and extractors can
//! return it directly. `From` implementations for `sqlx::Error`, `bcrypt::BcryptError`,
//! `jsonwebtoken::errors::Error` and `actix_web::error::BlockingError` allow the `?` operator.
//!
//! Field validation failures are not part of this type; see
//! [`crate::validation::ValidationFailed`], which carries the submitted form back to the view.

use actix_web::{
    error::{BlockingError, ResponseError},
    http::{header, StatusCode},
    HttpResponse,
};
use std::fmt;

use crate::flash::FlashMessage;

pub const LOGIN_PATH: &str = "/login";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// A protected page was requested without a session.
    /// Redirects to the login page with "Login required".
    AuthenticationRequired,
    /// The current user does not own the record it tried to change.
    /// Redirects to `redirect_to` with "Forbidden access.".
    AuthorizationDenied { redirect_to: String },
    /// Email/password pair did not match a user.
    LoginFailed,
    /// Represents a situation where a requested resource was not found (HTTP 404).
    NotFound(String),
    /// Represents a client-side error due to a malformed or invalid request (HTTP 400).
    BadRequest(String),
    /// Represents an unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// Represents an error originating from database operations (HTTP 500).
    /// Wraps errors from the `sqlx` crate.
    DatabaseError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::AuthenticationRequired => write!(f, "Login required"),
            AppError::AuthorizationDenied { .. } => write!(f, "Forbidden access."),
            AppError::LoginFailed => write!(f, "Login failed"),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// 303 redirect that leaves `flash` for the next page.
pub fn redirect_with_flash(location: &str, flash: FlashMessage) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .cookie(flash.to_cookie())
        .finish()
}

fn error_page(status: StatusCode, heading: &str) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(format!(
            "<!DOCTYPE html><html><head><title>{heading}</title></head>\
             <body><h1>{heading}</h1><p><a href=\"/\">Back to tasks</a></p></body></html>"
        ))
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::AuthenticationRequired
            | AppError::AuthorizationDenied { .. }
            | AppError::LoginFailed => StatusCode::SEE_OTHER,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::AuthenticationRequired => {
                redirect_with_flash(LOGIN_PATH, FlashMessage::alert(self.to_string()))
            }
            AppError::AuthorizationDenied { redirect_to } => {
                redirect_with_flash(redirect_to, FlashMessage::alert(self.to_string()))
            }
            AppError::LoginFailed => {
                redirect_with_flash(LOGIN_PATH, FlashMessage::alert(self.to_string()))
            }
            AppError::NotFound(_) => error_page(self.status_code(), "Not Found"),
            AppError::BadRequest(_) => error_page(self.status_code(), "Bad Request"),
            // Internal details stay in the logs.
            AppError::InternalServerError(msg) | AppError::DatabaseError(msg) => {
                log::error!("request failed: {}", msg);
                error_page(self.status_code(), "Something went wrong")
            }
        }
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `sqlx::Error::RowNotFound` maps to `AppError::NotFound`,
/// while other database errors become `AppError::DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

/// A token that fails verification is treated as no session at all.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(_: jsonwebtoken::errors::Error) -> AppError {
        AppError::AuthenticationRequired
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

impl From<BlockingError> for AppError {
    fn from(error: BlockingError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
