use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use linkstash_core::StoreError;
use serde::Serialize;

pub type Result<T> = std::result::Result<T, AppError>;

/// Request-level failures, mapped onto HTTP statuses.
#[derive(Debug)]
pub enum AppError {
    /// The shared secret was missing or wrong.
    Unauthorized,
    /// The client exhausted its request window.
    RateLimited { retry_after_secs: u32 },
    /// Unknown or unreadable proxy file.
    NotFound,
    Store(StoreError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthorized => error_response(
                StatusCode::FORBIDDEN,
                "invalid secret value, request aborted",
            ),
            AppError::RateLimited { retry_after_secs } => {
                let mut response = error_response(
                    StatusCode::TOO_MANY_REQUESTS,
                    "too many requests, please wait",
                );
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, header::HeaderValue::from(retry_after_secs));
                response
            }
            AppError::NotFound => error_response(StatusCode::NOT_FOUND, "file not found"),
            AppError::Store(err) => {
                let status = match &err {
                    StoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                    StoreError::Duplicate(_) => StatusCode::CONFLICT,
                    StoreError::Blacklisted(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    StoreError::LockUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                    StoreError::Persistence(_) | StoreError::Notification(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                error_response(status, &err.to_string())
            }
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}
