use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use crate::models::portfolio::{Category, UnknownCategory};
use crate::storage::ImageStoreError;

const STORAGE_FAILURE_MESSAGE: &str = "Something went wrong, please try again";

/// Build the JSON error envelope shared by every endpoint.
pub fn error_body(kind: &str, message: impl Into<String>) -> serde_json::Value {
    serde_json::json!({
        "success": false,
        "error": message.into(),
        "kind": kind,
    })
}

/// Failures of the portfolio curation operations.
#[derive(Debug, Error)]
pub enum PortfolioError {
    /// Input rejected: unknown category, missing or unacceptable file, bad field.
    #[error("{0}")]
    Validation(String),
    #[error("Maximum {limit} images allowed per category ({category})")]
    CapacityExceeded { category: Category, limit: u64 },
    #[error("Image {0} not found")]
    NotFound(Uuid),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error(transparent)]
    ImageStore(#[from] ImageStoreError),
}

impl PortfolioError {
    pub fn kind(&self) -> &'static str {
        match self {
            PortfolioError::Validation(_) => "validation",
            PortfolioError::CapacityExceeded { .. } => "capacity_exceeded",
            PortfolioError::NotFound(_) => "not_found",
            PortfolioError::Database(_) | PortfolioError::ImageStore(_) => "storage_failure",
        }
    }

    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            PortfolioError::Database(_) | PortfolioError::ImageStore(_)
        )
    }
}

impl From<UnknownCategory> for PortfolioError {
    fn from(e: UnknownCategory) -> Self {
        PortfolioError::Validation(e.to_string())
    }
}

impl ResponseError for PortfolioError {
    fn status_code(&self) -> StatusCode {
        match self {
            PortfolioError::Validation(_) => StatusCode::BAD_REQUEST,
            PortfolioError::CapacityExceeded { .. } => StatusCode::CONFLICT,
            PortfolioError::NotFound(_) => StatusCode::NOT_FOUND,
            PortfolioError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PortfolioError::ImageStore(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Storage details stay in the logs.
        let message = if self.is_storage_failure() {
            error!(error = %self, "portfolio operation failed");
            STORAGE_FAILURE_MESSAGE.to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(self.status_code()).json(error_body(self.kind(), message))
    }
}
