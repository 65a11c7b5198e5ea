use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        let message = e.to_string();
        match e {
            DomainError::InvalidUserId
            | DomainError::EmptyOrder
            | DomainError::InvalidItemQuantity
            | DomainError::InvalidItemPrice
            | DomainError::InvalidEmail
            | DomainError::InvalidName
            | DomainError::InvalidPassword => AppError::BadRequest(message),
            DomainError::OrderNotFound
            | DomainError::OrderItemNotFound
            | DomainError::UserNotFound => AppError::NotFound(message),
            DomainError::EmailExists
            | DomainError::OrderNotModifiable
            | DomainError::InvalidOrderStatusTransition
            | DomainError::CannotCancelDeliveredOrder => AppError::Conflict(message),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Internal(detail) => {
                log::error!("Request failed: {}", detail);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": message }))
    }
}
