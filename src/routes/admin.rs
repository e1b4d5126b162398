use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::db::models::Profile;
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, MaybeUser};
use crate::forum::domain::{ModerationFlags, Role, SubscriptionTier, UserId};
use crate::forum::notify::Toast;
use crate::forum::roles::RoleSwitch;
use crate::routes::profiles::ProfileView;
use crate::routes::views::Viewer;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RoleChange {
    pub role: Role,
    /// Explicit target state; omitted means toggle
    pub enabled: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct RoleChangeResponse {
    pub toast: Toast,
    pub roles: BTreeSet<Role>,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionChange {
    pub subscription_type: SubscriptionTier,
}

#[derive(Debug, Serialize)]
pub struct ProfileChangeResponse {
    pub toast: Toast,
    pub profile: Profile,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/users/{id}/roles", post(change_role))
        .route("/api/admin/users/{id}/moderation", put(set_moderation))
        .route("/api/admin/users/{id}/subscription", put(set_subscription))
}

async fn list_users(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<ProfileView>>> {
    let backend = state.backend.as_ref();
    let viewer = Viewer::resolve(backend, &MaybeUser(Some(user))).await;
    if !viewer.roles.can_access_admin {
        return Err(AppError::Forbidden(
            "Нет доступа к панели администратора".into(),
        ));
    }

    let profiles = backend.list_profiles().await?;
    let mut users = Vec::with_capacity(profiles.len());
    for profile in profiles {
        let roles = backend.fetch_roles(&profile.id).await?;
        users.push(ProfileView { profile, roles });
    }
    Ok(Json(users))
}

async fn change_role(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(change): Json<RoleChange>,
) -> AppResult<Json<RoleChangeResponse>> {
    let backend = state.backend.as_ref();
    let target = UserId::new(id);
    if backend.fetch_profile(&target).await?.is_none() {
        return Err(AppError::not_found("Пользователь не найден"));
    }

    let current = backend.fetch_roles(&target).await?;
    let mut switch = RoleSwitch::new(target, current);
    match change.enabled {
        Some(enabled) => switch.set(backend, &user.id, change.role, enabled).await?,
        None => {
            switch.toggle(backend, &user.id, change.role).await?;
        }
    }

    Ok(Json(RoleChangeResponse {
        toast: Toast::success("Роли обновлены"),
        roles: switch.roles().clone(),
    }))
}

async fn set_moderation(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(flags): Json<ModerationFlags>,
) -> AppResult<Json<ProfileChangeResponse>> {
    let profile = state
        .backend
        .set_moderation(&user.id, &UserId::new(id), flags)
        .await?;
    Ok(Json(ProfileChangeResponse {
        toast: Toast::success("Статус пользователя обновлён"),
        profile,
    }))
}

async fn set_subscription(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(change): Json<SubscriptionChange>,
) -> AppResult<Json<ProfileChangeResponse>> {
    let profile = state
        .backend
        .set_subscription(&user.id, &UserId::new(id), change.subscription_type)
        .await?;
    Ok(Json(ProfileChangeResponse {
        toast: Toast::success("Тариф обновлён"),
        profile,
    }))
}
