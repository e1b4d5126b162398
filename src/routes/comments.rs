use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::db::models::Comment;
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, MaybeUser};
use crate::forum::backend::ForumBackend;
use crate::forum::dialogs::{CommentForm, CreateComment, DeleteComment, EditComment};
use crate::forum::permissions::PermissionGate;
use crate::routes::views::{CommentView, MutationResponse, Viewer};
use crate::routes::{submit_dialog, Submitted};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/topics/{id}/comments",
            get(list_comments).post(create_comment),
        )
        .route(
            "/api/comments/{id}",
            put(update_comment).delete(delete_comment),
        )
}

/// Comments of a topic as `viewer` may see them; premium threads stay
/// empty for viewers who cannot read the topic.
async fn thread(
    backend: &dyn ForumBackend,
    viewer: &Viewer,
    topic_id: &str,
) -> AppResult<Vec<CommentView>> {
    let topic = backend
        .fetch_topic(topic_id)
        .await?
        .ok_or_else(|| AppError::not_found("Тема не найдена"))?;
    if !viewer.can_read(&topic) {
        return Ok(Vec::new());
    }

    Ok(backend
        .list_comments(topic_id)
        .await?
        .into_iter()
        .map(|comment| CommentView::new(comment, viewer))
        .collect())
}

async fn list_comments(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(topic_id): Path<String>,
) -> AppResult<Json<Vec<CommentView>>> {
    let backend = state.backend.as_ref();
    let viewer = Viewer::resolve(backend, &user).await;
    Ok(Json(thread(backend, &viewer, &topic_id).await?))
}

async fn respond(
    state: &AppState,
    user: CurrentUser,
    topic_id: &str,
    done: Submitted<Option<Comment>>,
) -> AppResult<Json<MutationResponse<CommentView, CommentView>>> {
    let backend = state.backend.as_ref();
    let viewer = Viewer::resolve(backend, &MaybeUser(Some(user))).await;
    let list = if done.refreshed {
        thread(backend, &viewer, topic_id).await?
    } else {
        Vec::new()
    };
    Ok(Json(MutationResponse {
        toast: done.toast,
        closed: done.closed,
        refreshed: done.refreshed,
        item: done.output.map(|comment| CommentView::new(comment, &viewer)),
        list,
    }))
}

async fn create_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(topic_id): Path<String>,
    Json(form): Json<CommentForm>,
) -> AppResult<Json<MutationResponse<CommentView, CommentView>>> {
    let backend = state.backend.as_ref();
    let done = submit_dialog(backend, &user.id, CreateComment::new(&topic_id), form).await?;
    respond(&state, user, &topic_id, done.map(Some)).await
}

async fn update_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(form): Json<CommentForm>,
) -> AppResult<Json<MutationResponse<CommentView, CommentView>>> {
    let backend = state.backend.as_ref();
    let done = submit_dialog(backend, &user.id, EditComment::new(id), form).await?;
    let topic_id = done.output.topic_id.clone();
    respond(&state, user, &topic_id, done.map(Some)).await
}

async fn delete_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<MutationResponse<CommentView, CommentView>>> {
    let backend = state.backend.as_ref();
    // The thread to refresh is only known before the row is gone
    let comment = backend
        .fetch_comment(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Комментарий не найден"))?;
    if !PermissionGate::new(backend)
        .can_modify(&comment.user_id, Some(&user.id))
        .await
    {
        return Err(AppError::Forbidden(
            "Недостаточно прав для изменения этой записи".into(),
        ));
    }
    let topic_id = comment.topic_id;

    let done = submit_dialog(backend, &user.id, DeleteComment::new(id), ()).await?;
    respond(&state, user, &topic_id, done.map(|()| None)).await
}
