use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::models::{LikeState, Topic, TopicQuery};
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, MaybeUser};
use crate::forum::backend::ForumBackend;
use crate::forum::dialogs::{CreateTopic, DeleteTopic, EditTopic, TopicForm};
use crate::forum::domain::TopicCategory;
use crate::routes::{submit_dialog, Submitted};
use crate::routes::views::{CommentView, MutationResponse, TopicView, Viewer};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
    pub page: Option<usize>,
}

impl ListParams {
    fn query(&self, per_page: usize) -> AppResult<TopicQuery> {
        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(raw) => Some(raw.parse::<TopicCategory>().map_err(|_| {
                AppError::BadRequest(format!("Неизвестная категория: {}", raw))
            })?),
        };
        let page = self.page.unwrap_or(1).max(1);
        let offset = (page - 1)
            .checked_mul(per_page)
            .filter(|offset| i64::try_from(*offset).is_ok())
            .ok_or_else(|| AppError::BadRequest("Некорректный номер страницы".into()))?;
        Ok(TopicQuery {
            category,
            limit: per_page,
            offset,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct TopicPage {
    pub page: usize,
    pub per_page: usize,
    pub topics: Vec<TopicView>,
}

#[derive(Debug, Serialize)]
pub struct TopicDetail {
    pub topic: TopicView,
    pub comments: Vec<CommentView>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/topics", get(list_topics).post(create_topic))
        .route(
            "/api/topics/{id}",
            get(show_topic).put(update_topic).delete(delete_topic),
        )
        .route("/api/topics/{id}/like", post(toggle_like))
}

/// First page of all topics, as seen by `viewer`.
pub(crate) async fn front_page(
    backend: &dyn ForumBackend,
    viewer: &Viewer,
    per_page: usize,
) -> AppResult<Vec<TopicView>> {
    let query = TopicQuery {
        category: None,
        limit: per_page,
        offset: 0,
    };
    let topics = backend.list_topics(&query).await?;
    Ok(topics
        .into_iter()
        .map(|topic| TopicView::new(topic, viewer))
        .collect())
}

async fn list_topics(
    State(state): State<AppState>,
    user: MaybeUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<TopicPage>> {
    let per_page = state.config.forum.topics_per_page;
    let query = params.query(per_page)?;
    let viewer = Viewer::resolve(state.backend.as_ref(), &user).await;

    let topics = state.backend.list_topics(&query).await?;
    Ok(Json(TopicPage {
        page: query.offset / per_page + 1,
        per_page,
        topics: topics
            .into_iter()
            .map(|topic| TopicView::new(topic, &viewer))
            .collect(),
    }))
}

async fn create_topic(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(form): Json<TopicForm>,
) -> AppResult<Json<MutationResponse<TopicView, TopicView>>> {
    let backend = state.backend.as_ref();
    let done = submit_dialog(backend, &user.id, CreateTopic, form).await?;
    topic_response(&state, user, done).await
}

async fn update_topic(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(form): Json<TopicForm>,
) -> AppResult<Json<MutationResponse<TopicView, TopicView>>> {
    let backend = state.backend.as_ref();
    let done = submit_dialog(backend, &user.id, EditTopic::new(id), form).await?;
    topic_response(&state, user, done).await
}

async fn topic_response(
    state: &AppState,
    user: CurrentUser,
    done: Submitted<Topic>,
) -> AppResult<Json<MutationResponse<TopicView, TopicView>>> {
    let backend = state.backend.as_ref();
    let viewer = Viewer::resolve(backend, &MaybeUser(Some(user))).await;
    let list = if done.refreshed {
        front_page(backend, &viewer, state.config.forum.topics_per_page).await?
    } else {
        Vec::new()
    };
    Ok(Json(MutationResponse {
        toast: done.toast,
        closed: done.closed,
        refreshed: done.refreshed,
        item: Some(TopicView::new(done.output, &viewer)),
        list,
    }))
}

async fn delete_topic(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<MutationResponse<(), TopicView>>> {
    let backend = state.backend.as_ref();
    let done = submit_dialog(backend, &user.id, DeleteTopic::new(id), ()).await?;

    let viewer = Viewer::resolve(backend, &MaybeUser(Some(user))).await;
    let list = if done.refreshed {
        front_page(backend, &viewer, state.config.forum.topics_per_page).await?
    } else {
        Vec::new()
    };
    Ok(Json(MutationResponse {
        toast: done.toast,
        closed: done.closed,
        refreshed: done.refreshed,
        item: None,
        list,
    }))
}

async fn show_topic(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<String>,
) -> AppResult<Json<TopicDetail>> {
    let backend = state.backend.as_ref();
    let mut topic = backend
        .fetch_topic(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Тема не найдена"))?;

    backend.record_topic_view(&id).await?;
    topic.views += 1;

    let viewer = Viewer::resolve(backend, &user).await;
    let topic = TopicView::new(topic, &viewer);
    let comments = if topic.locked {
        Vec::new()
    } else {
        backend
            .list_comments(&id)
            .await?
            .into_iter()
            .map(|comment| CommentView::new(comment, &viewer))
            .collect()
    };

    Ok(Json(TopicDetail { topic, comments }))
}

async fn toggle_like(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<LikeState>> {
    let like = state.backend.toggle_topic_like(&user.id, &id).await?;
    Ok(Json(like))
}
