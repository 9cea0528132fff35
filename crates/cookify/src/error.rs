use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use cookify_common::error::CommonError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("local store error: {0}")]
    LocalStore(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("recipe not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("email already registered: {0}")]
    EmailTaken(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("not signed in")]
    Unauthenticated,

    #[error("cloud backend unavailable")]
    CloudUnavailable,
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::LocalStore(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::EmailTaken(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::CloudUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Common(_)
            | AppError::Dataset(_)
            | AppError::LocalStore(_)
            | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = axum::Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (AppError::EmailTaken("x".into()), StatusCode::CONFLICT),
            (AppError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AppError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (AppError::CloudUnavailable, StatusCode::SERVICE_UNAVAILABLE),
            (
                AppError::Dataset("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::Common(CommonError::RedisUnavailable),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
