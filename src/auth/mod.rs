pub mod jwt;
pub mod middleware;
pub mod password;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;
use thiserror::Error;
use tracing::error;

use crate::errors::error_body;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing or malformed Authorization header")]
    MissingToken,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("{0}")]
    Validation(String),
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("auth not configured: {0}")]
    Config(&'static str),
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken(_) | AuthError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::Hash(_) | AuthError::Database(_) | AuthError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let (kind, message) = match status {
            StatusCode::UNAUTHORIZED => ("unauthorized", self.to_string()),
            StatusCode::BAD_REQUEST => ("validation", self.to_string()),
            _ => {
                error!(error = %self, "auth failure");
                (
                    "storage_failure",
                    "Something went wrong, please try again".to_string(),
                )
            }
        };
        HttpResponse::build(status).json(error_body(kind, message))
    }
}
