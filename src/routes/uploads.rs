use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::error::{AppError, AppResult};
use crate::forum::avatar::image_content_type;
use crate::forum::backend::BackendError;
use crate::state::AppState;

/// Serve a stored avatar from the upload directory. Only the image types
/// accepted on upload are served; anything else is reported missing.
pub async fn serve(State(state): State<AppState>, Path(path): Path<String>) -> AppResult<Response> {
    let Some(content_type) = image_content_type(&path) else {
        return Err(AppError::not_found("Файл не найден"));
    };
    let data = match state.store.read(&path) {
        Ok(Some(data)) => data,
        Ok(None) | Err(BackendError::Rejected(_)) => {
            return Err(AppError::not_found("Файл не найден"));
        }
        Err(e) => return Err(e.into()),
    };

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "public, max-age=86400"),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        data,
    )
        .into_response())
}
