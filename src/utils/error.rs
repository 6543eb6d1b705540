//! Error types for the crate

use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, AppError>;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input validation errors (missing or malformed fields)
    #[error("{0}")]
    Validation(String),

    /// Registration with an email that already has an account
    #[error("Email already in use")]
    DuplicateEmail,

    /// Authentication failure; deliberately does not say which credential was wrong
    #[error("Invalid email or password")]
    AuthFailure,

    /// Reset token missing, expired, or already consumed; one message for all three
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Credential store errors
    #[error("Store error: {0}")]
    Store(String),

    /// Email delivery errors
    #[error("Email error: {0}")]
    Email(String),

    /// Session token errors
    #[error("Session error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Crypto errors
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Helper functions for creating specific errors
impl AppError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store(message.into())
    }

    pub fn email<S: Into<String>>(message: S) -> Self {
        Self::Email(message.into())
    }

    pub fn crypto<S: Into<String>>(message: S) -> Self {
        Self::Crypto(message.into())
    }
}

/// JSON error body, matching the `{"error": ...}` shape handlers return
#[derive(Debug, serde::Serialize)]
struct ErrorBody {
    error: String,
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status, message) = match self {
            AppError::Validation(_) | AppError::DuplicateEmail | AppError::InvalidToken => (
                actix_web::http::StatusCode::BAD_REQUEST,
                self.to_string(),
            ),
            AppError::AuthFailure => (
                actix_web::http::StatusCode::UNAUTHORIZED,
                self.to_string(),
            ),
            AppError::Email(_) => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to send reset email".to_string(),
            ),
            // Internal failures never leak detail to the caller
            _ => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        HttpResponse::build(status).json(ErrorBody { error: message })
    }
}
