use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use domain::models::generation::InputDataError;
use domain::services::{LlmError, RenderError};
use shared::pagination::PaginationError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Bad gateway: {0}")]
    BadGateway(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Gateway timeout: {0}")]
    GatewayTimeout(String),

    /// A provider status passed through unchanged.
    #[error("Upstream error ({status}): {message}")]
    Upstream { status: StatusCode, message: String },
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Upstream { status, .. } => *status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_code, message) = match self {
            ApiError::Unauthorized(msg) => ("unauthorized", msg),
            ApiError::Forbidden(msg) => ("forbidden", msg),
            ApiError::NotFound(msg) => ("not_found", msg),
            ApiError::Conflict(msg) => ("conflict", msg),
            ApiError::Validation(msg) => ("validation_error", msg),
            ApiError::RateLimited(msg) => ("rate_limited", msg),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("internal_error", "An internal error occurred".to_string())
            }
            ApiError::BadGateway(msg) => ("bad_gateway", msg),
            ApiError::ServiceUnavailable(msg) => ("service_unavailable", msg),
            ApiError::GatewayTimeout(msg) => ("gateway_timeout", msg),
            ApiError::Upstream { message, .. } => ("upstream_error", message),
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".into()),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some("23505") => ApiError::Conflict("Resource already exists".into()),
                Some("23503") => {
                    ApiError::Conflict("Resource is referenced by other records".into())
                }
                _ => ApiError::Internal(format!("Database error: {}", db_err)),
            },
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| match &e.message {
                    Some(m) => m.to_string(),
                    None => format!("Invalid value for {}", field),
                })
            })
            .collect();

        let message = if messages.len() == 1 {
            messages[0].clone()
        } else {
            format!("{} validation errors", messages.len())
        };

        ApiError::Validation(message)
    }
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        let message = err.to_string();
        match err {
            LlmError::MissingCredentials | LlmError::Auth(_) => ApiError::Unauthorized(message),
            LlmError::UnsupportedProvider(_) => ApiError::Validation(message),
            LlmError::RateLimited(_) => ApiError::RateLimited(message),
            LlmError::Timeout(_) => ApiError::GatewayTimeout(message),
            LlmError::Unavailable(_) => ApiError::ServiceUnavailable(message),
            LlmError::Api { status, .. } => match StatusCode::from_u16(status) {
                Ok(code) if code.is_client_error() || code.is_server_error() => {
                    ApiError::Upstream {
                        status: code,
                        message,
                    }
                }
                _ => ApiError::BadGateway(message),
            },
            LlmError::InvalidResponse(_) => ApiError::BadGateway(message),
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<InputDataError> for ApiError {
    fn from(err: InputDataError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<PaginationError> for ApiError {
    fn from(err: PaginationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}
