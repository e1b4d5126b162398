use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::forum::backend::BackendError;
use crate::forum::dialogs::ValidationError;

const INTERNAL: &str = "Внутренняя ошибка сервера";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("Требуется авторизация")]
    Unauthorized,

    #[error("Неверное имя пользователя или пароль")]
    InvalidCredentials,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized | AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, e.0.clone()),
            AppError::Backend(e) => match e {
                BackendError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
                BackendError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
                BackendError::Rejected(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                BackendError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
                BackendError::Pool(_) | BackendError::Sql(_) | BackendError::Io(_) => {
                    tracing::error!("Backend error: {}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string())
                }
            },
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string())
            }
            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    fn response_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn not_found_returns_404() {
        assert_eq!(
            response_status(AppError::not_found("Тема не найдена")),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn unauthorized_returns_401() {
        assert_eq!(
            response_status(AppError::Unauthorized),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn validation_returns_400() {
        assert_eq!(
            response_status(ValidationError::new("Введите заголовок темы").into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn backend_errors_map_by_kind() {
        assert_eq!(
            response_status(BackendError::forbidden("нет").into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            response_status(BackendError::not_found("нет").into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            response_status(BackendError::rejected("нет").into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            response_status(BackendError::Conflict("занято".into()).into()),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn internal_returns_500() {
        assert_eq!(
            response_status(AppError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn body_carries_message() {
        let response = AppError::Forbidden("Недостаточно прав".into()).into_response();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Недостаточно прав");
    }

    #[tokio::test]
    async fn storage_failures_are_hidden() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "/srv/secret");
        let response = AppError::from(BackendError::from(io)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], INTERNAL);
    }
}
