use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use bigdecimal::BigDecimal;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("Service temporarily unavailable")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Render integer cents as a dollar amount, e.g. `500` → `$5.00`.
/// Display only; never fed back into a calculation.
pub fn format_cents(cents: i64) -> String {
    format!("${}", BigDecimal::new(cents.into(), 2))
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidQuantity(_)
            | DomainError::EmptyOrder
            | DomainError::InvalidInput(_) => AppError::Unprocessable(e.to_string()),
            DomainError::InvalidStatus(_) => AppError::BadRequest("Invalid status".to_string()),
            DomainError::InvalidPaymentStatus(_) => {
                AppError::BadRequest("Invalid payment status".to_string())
            }
            DomainError::DishUnavailable(_)
            | DomainError::OrderNotFound
            | DomainError::PromotionNotFound => AppError::NotFound(e.to_string()),
            DomainError::MinimumOrderNotMet { required_cents } => AppError::BadRequest(format!(
                "Minimum order amount not met. Required: {}",
                format_cents(required_cents)
            )),
            DomainError::PromotionExpired
            | DomainError::PromotionLimitReached
            | DomainError::DuplicatePromotionCode(_) => AppError::BadRequest(e.to_string()),
            DomainError::StorageUnavailable(msg) => AppError::Unavailable(msg),
            DomainError::Storage(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Internal(detail) => {
                log::error!("Internal error: {}", detail);
                "Internal server error".to_string()
            }
            AppError::Unavailable(detail) => {
                log::error!("Storage unavailable: {}", detail);
                self.to_string()
            }
            _ => self.to_string(),
        };
        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": message }))
    }
}
