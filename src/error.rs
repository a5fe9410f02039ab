use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Failures surfaced by the stores, the auth gate and the HTTP handlers.
#[derive(Debug, Display, PartialEq)]
pub enum AppError {
    #[display(fmt = "{} not found", _0)]
    NotFound(String),

    /// Never says whether the username, the password or the account state was wrong.
    #[display(fmt = "Invalid credentials")]
    AuthFailure,

    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(fmt = "{}", _0)]
    Forbidden(String),

    #[display(fmt = "Storage failure: {}", _0)]
    Storage(String),
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Storage(format!("{err:#}"))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AuthFailure => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            // storage details stay in the log
            AppError::Storage(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

pub type AppResult<T> = Result<T, AppError>;
