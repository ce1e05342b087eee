//! API error types and their HTTP mapping.
//!
//! ## Status Mapping
//! ```text
//! CoreError::EmptyInvoice          → 400  no valid line items
//! CoreError::InvalidPaymentAmount  → 400
//! CoreError::Validation            → 400
//! DbError::Validation              → 400  bad catalog input
//! DbError::NotFound                → 404
//! DbError::ForeignKeyViolation     → 404  referenced record missing
//! DbError::UniqueViolation         → 409
//! DbError::ConcurrencyConflict     → 409  numbering retries exhausted
//! DbError::PoolExhausted           → 503
//! everything else                  → 500  message not leaked to client
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use billing_core::CoreError;
use billing_db::DbError;

/// Errors surfaced by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),

            ApiError::Core(core) => match core {
                CoreError::EmptyInvoice => (
                    StatusCode::BAD_REQUEST,
                    "invoice must contain at least one valid line item".to_string(),
                ),
                CoreError::InvalidPaymentAmount { .. } | CoreError::Validation(_) => {
                    (StatusCode::BAD_REQUEST, core.to_string())
                }
            },

            ApiError::Db(db) => match db {
                DbError::Validation(_) => (StatusCode::BAD_REQUEST, db.to_string()),
                DbError::NotFound { .. } => (StatusCode::NOT_FOUND, db.to_string()),
                // A dangling customer_id/product_id reference reads as "the
                // referenced record does not exist" to the client.
                DbError::ForeignKeyViolation { .. } => (
                    StatusCode::NOT_FOUND,
                    "referenced record not found".to_string(),
                ),
                DbError::UniqueViolation { .. } | DbError::ConcurrencyConflict { .. } => {
                    (StatusCode::CONFLICT, db.to_string())
                }
                DbError::PoolExhausted => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "service temporarily unavailable".to_string(),
                ),
                _ => {
                    error!(error = %db, "Internal database error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal server error".to_string(),
                    )
                }
            },
        };

        if status.is_client_error() {
            warn!(%status, %message, "Request rejected");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
