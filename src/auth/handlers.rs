use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::session;
use crate::db::models::Profile;
use crate::error::{AppError, AppResult};
use crate::extractors::MaybeUser;
use crate::forum::backend::ForumBackend;
use crate::forum::dialogs::ValidationError;
use crate::forum::domain::{Role, UserId};
use crate::forum::notify::Toast;
use crate::forum::roles::{RoleResolver, RoleState};
use crate::state::AppState;

const MAX_PASSWORD_BYTES: usize = 72;

// -- Request/response types --

#[derive(Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub profile: Profile,
    pub roles: RoleState,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub profile: Option<Profile>,
    pub roles: RoleState,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub toast: Toast,
}

// -- Cookie helpers --

fn session_cookie(name: &str, token: &str, max_age_hours: u64) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        name,
        token,
        max_age_hours * 3600
    )
}

fn clear_session_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0", name)
}

// -- Validation --

fn validate_username(raw: &str) -> Result<String, ValidationError> {
    let username = raw.trim();
    let len = username.chars().count();
    let valid_chars = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !(3..=32).contains(&len) || !valid_chars {
        return Err(ValidationError::new(
            "Имя пользователя: от 3 до 32 символов, латинские буквы, цифры и _",
        ));
    }
    Ok(username.to_string())
}

fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < 8 {
        return Err(ValidationError::new(
            "Пароль должен быть не короче 8 символов",
        ));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::new("Пароль слишком длинный"));
    }
    Ok(())
}

async fn resolve_roles(backend: &dyn ForumBackend, user: &UserId) -> RoleState {
    let mut resolver = RoleResolver::new(backend);
    resolver.resolve(Some(user)).await;
    resolver.into_state()
}

async fn signed_in(
    state: &AppState,
    user_id: &UserId,
    token: String,
    status: StatusCode,
) -> AppResult<Response> {
    let backend = state.backend.as_ref();
    let profile = backend
        .fetch_profile(user_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("profile {} vanished", user_id)))?;
    let roles = resolve_roles(backend, user_id).await;

    let cookie = session_cookie(
        &state.config.auth.cookie_name,
        &token,
        state.config.auth.session_hours,
    );
    Ok((
        status,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            token,
            profile,
            roles,
        }),
    )
        .into_response())
}

// -- Handlers --

/// POST /api/auth/register: create a profile and sign in. The first
/// profile on a fresh forum becomes its creator.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<Credentials>,
) -> AppResult<Response> {
    let username = validate_username(&req.username)?;
    validate_password(&req.password)?;

    let cost = state.config.auth.bcrypt_cost;
    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("hashing task failed: {}", e)))??;

    let user_id = UserId::generate();
    let token = {
        let mut conn = state.db.get()?;
        let tx = conn.transaction()?;

        let taken: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM profiles WHERE username = ?1)",
            params![username],
            |r| r.get(0),
        )?;
        if taken {
            return Err(AppError::Conflict("Имя пользователя уже занято".into()));
        }
        let first: bool = tx.query_row("SELECT COUNT(*) = 0 FROM profiles", [], |r| r.get(0))?;

        tx.execute(
            "INSERT INTO profiles (id, username, password_hash) VALUES (?1, ?2, ?3)",
            params![user_id.as_str(), username, password_hash],
        )?;
        if first {
            tx.execute(
                "INSERT INTO user_roles (user_id, role) VALUES (?1, ?2)",
                params![user_id.as_str(), Role::Creator.as_str()],
            )?;
            tracing::info!("{} registered as forum creator", username);
        } else {
            tracing::info!("{} registered", username);
        }

        let token = session::create_session(&tx, &user_id, state.config.auth.session_hours)?;
        tx.commit()?;
        token
    };

    signed_in(&state, &user_id, token, StatusCode::CREATED).await
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<Credentials>,
) -> AppResult<Response> {
    let username = req.username.trim().to_string();
    let found: Option<(String, String, bool)> = {
        let conn = state.db.get()?;
        conn.query_row(
            "SELECT id, password_hash, is_banned FROM profiles WHERE username = ?1",
            params![username],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .optional()?
    };
    let Some((id, hash, is_banned)) = found else {
        return Err(AppError::InvalidCredentials);
    };

    let password = req.password;
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("hashing task failed: {}", e)))?;
    if !valid {
        tracing::debug!("Failed login for {}", username);
        return Err(AppError::InvalidCredentials);
    }
    if is_banned {
        return Err(AppError::Forbidden("Ваш аккаунт заблокирован".into()));
    }

    let user_id = UserId::new(id);
    let token = {
        let conn = state.db.get()?;
        session::create_session(&conn, &user_id, state.config.auth.session_hours)?
    };
    signed_in(&state, &user_id, token, StatusCode::OK).await
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>, user: MaybeUser) -> AppResult<Response> {
    if let Some(user) = user.0 {
        let conn = state.db.get()?;
        session::delete_session(&conn, &user.token)?;
    }

    Ok((
        StatusCode::OK,
        [(
            header::SET_COOKIE,
            clear_session_cookie(&state.config.auth.cookie_name),
        )],
        Json(LogoutResponse {
            toast: Toast::success("Вы вышли из аккаунта"),
        }),
    )
        .into_response())
}

/// GET /api/auth/session: current profile and derived access.
pub async fn current_session(
    State(state): State<AppState>,
    user: MaybeUser,
) -> AppResult<Json<SessionResponse>> {
    let Some(user) = user.0 else {
        return Ok(Json(SessionResponse {
            profile: None,
            roles: RoleState::default(),
        }));
    };

    let backend = state.backend.as_ref();
    let profile = backend.fetch_profile(&user.id).await?;
    let roles = resolve_roles(backend, &user.id).await;
    Ok(Json(SessionResponse { profile, roles }))
}
