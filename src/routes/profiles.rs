use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::config::Config;
use crate::db::models::Profile;
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::forum::avatar::{AvatarFile, AvatarUpload};
use crate::forum::dialogs::{DialogOutcome, EditProfile, ProfileForm};
use crate::forum::domain::{Role, UserId};
use crate::forum::notify::Toast;
use crate::routes::submit_dialog;
use crate::routes::views::MutationResponse;
use crate::state::AppState;

/// Headroom over the object limit for multipart framing, so oversized files
/// reach validation instead of being cut off by the body limit.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct ProfileView {
    #[serde(flatten)]
    pub profile: Profile,
    pub roles: BTreeSet<Role>,
}

#[derive(Debug, Serialize)]
pub struct AvatarResponse {
    pub toast: Option<Toast>,
    pub profile: Profile,
}

pub fn router(config: &Config) -> Router<AppState> {
    let avatar_limit = config.storage.max_object_bytes + MULTIPART_OVERHEAD;
    Router::new()
        .route("/api/profiles/{id}", get(show_profile))
        .route("/api/profile", put(update_profile))
        .route(
            "/api/profile/avatar",
            post(upload_avatar).layer(DefaultBodyLimit::max(avatar_limit)),
        )
}

async fn show_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ProfileView>> {
    let id = UserId::new(id);
    let profile = state
        .backend
        .fetch_profile(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Пользователь не найден"))?;
    let roles = state.backend.fetch_roles(&id).await?;
    Ok(Json(ProfileView { profile, roles }))
}

async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(form): Json<ProfileForm>,
) -> AppResult<Json<MutationResponse<Profile, ()>>> {
    let done = submit_dialog(state.backend.as_ref(), &user.id, EditProfile, form).await?;
    Ok(Json(MutationResponse {
        toast: done.toast,
        closed: done.closed,
        refreshed: done.refreshed,
        item: Some(done.output),
        list: Vec::new(),
    }))
}

async fn upload_avatar(
    State(state): State<AppState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> AppResult<Json<AvatarResponse>> {
    let file = read_avatar_field(&mut multipart).await?;

    let mut upload = AvatarUpload::new();
    match upload.upload(state.backend.as_ref(), &user.id, file).await {
        DialogOutcome::Saved(profile) => Ok(Json(AvatarResponse {
            toast: upload.take_toasts().pop(),
            profile,
        })),
        DialogOutcome::Invalid(e) => Err(e.into()),
        DialogOutcome::Failed(e) => Err(e.into()),
    }
}

/// First file field of the form (preferably named `avatar`).
async fn read_avatar_field(multipart: &mut Multipart) -> AppResult<AvatarFile> {
    let bad_form = |e: axum::extract::multipart::MultipartError| {
        AppError::BadRequest(format!("Некорректная форма: {}", e.body_text()))
    };

    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        if field.name() != Some("avatar") && field.file_name().is_none() {
            continue;
        }

        let file_name = field.file_name().unwrap_or("avatar").to_string();
        let content_type = match field.content_type() {
            Some(content_type) => content_type.to_string(),
            None => mime_guess::from_path(&file_name)
                .first_or_octet_stream()
                .to_string(),
        };
        let data = field.bytes().await.map_err(bad_form)?;

        return Ok(AvatarFile {
            file_name,
            content_type,
            data,
        });
    }

    Err(AppError::BadRequest("Файл не выбран".into()))
}
