use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::db::models::JobListing;
use crate::error::AppResult;
use crate::extractors::{CurrentUser, MaybeUser};
use crate::forum::backend::ForumBackend;
use crate::forum::dialogs::{CreateJob, DeleteJob, EditJob, JobForm};
use crate::routes::views::{JobView, MutationResponse, Viewer};
use crate::routes::{submit_dialog, Submitted};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/jobs", get(list_jobs).post(create_job))
        .route("/api/jobs/{id}", put(update_job).delete(delete_job))
}

async fn board(backend: &dyn ForumBackend, viewer: &Viewer) -> AppResult<Vec<JobView>> {
    Ok(backend
        .list_jobs()
        .await?
        .into_iter()
        .map(|job| JobView::new(job, viewer))
        .collect())
}

async fn list_jobs(
    State(state): State<AppState>,
    user: MaybeUser,
) -> AppResult<Json<Vec<JobView>>> {
    let backend = state.backend.as_ref();
    let viewer = Viewer::resolve(backend, &user).await;
    Ok(Json(board(backend, &viewer).await?))
}

async fn respond(
    state: &AppState,
    user: CurrentUser,
    done: Submitted<Option<JobListing>>,
) -> AppResult<Json<MutationResponse<JobView, JobView>>> {
    let backend = state.backend.as_ref();
    let viewer = Viewer::resolve(backend, &MaybeUser(Some(user))).await;
    let list = if done.refreshed {
        board(backend, &viewer).await?
    } else {
        Vec::new()
    };
    Ok(Json(MutationResponse {
        toast: done.toast,
        closed: done.closed,
        refreshed: done.refreshed,
        item: done.output.map(|job| JobView::new(job, &viewer)),
        list,
    }))
}

async fn create_job(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(form): Json<JobForm>,
) -> AppResult<Json<MutationResponse<JobView, JobView>>> {
    let done = submit_dialog(state.backend.as_ref(), &user.id, CreateJob, form).await?;
    respond(&state, user, done.map(Some)).await
}

async fn update_job(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(form): Json<JobForm>,
) -> AppResult<Json<MutationResponse<JobView, JobView>>> {
    let done = submit_dialog(state.backend.as_ref(), &user.id, EditJob::new(id), form).await?;
    respond(&state, user, done.map(Some)).await
}

async fn delete_job(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<MutationResponse<JobView, JobView>>> {
    let done = submit_dialog(state.backend.as_ref(), &user.id, DeleteJob::new(id), ()).await?;
    respond(&state, user, done.map(|()| None)).await
}
