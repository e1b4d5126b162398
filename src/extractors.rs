use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use rusqlite::params;

use crate::error::AppError;
use crate::forum::domain::UserId;
use crate::state::AppState;

/// Represents the currently authenticated user.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
    /// Session token the request was authenticated with
    pub token: String,
}

/// Extractor that requires authentication.
/// Returns 401 if no valid session found.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_session_token(parts, &state.config.auth.cookie_name)
            .ok_or(AppError::Unauthorized)?
            .to_string();

        let conn = state.db.get()?;
        let found = conn.query_row(
            "SELECT p.id, p.username FROM sessions s \
             JOIN profiles p ON p.id = s.user_id \
             WHERE s.token = ?1 AND s.expires_at > datetime('now')",
            params![token],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        );

        match found {
            Ok((id, username)) => Ok(CurrentUser {
                id: UserId::new(id),
                username,
                token,
            }),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(AppError::Unauthorized),
            Err(e) => Err(e.into()),
        }
    }
}

/// Optional user extractor: `None` instead of 401 when not authenticated.
pub struct MaybeUser(pub Option<CurrentUser>);

impl MaybeUser {
    pub fn id(&self) -> Option<&UserId> {
        self.0.as_ref().map(|user| &user.id)
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(MaybeUser(Some(user))),
            Err(AppError::Unauthorized) => Ok(MaybeUser(None)),
            Err(e) => Err(e),
        }
    }
}

/// Session token from `Authorization: Bearer` or the session cookie.
fn extract_session_token<'a>(parts: &'a Parts, cookie_name: &str) -> Option<&'a str> {
    let bearer = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let mut split = cookie.splitn(2, '=');
            let key = split.next()?.trim();
            let val = split.next()?.trim();
            if key == cookie_name && !val.is_empty() {
                Some(val)
            } else {
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(header::HeaderName, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn token_from_cookie() {
        let parts = parts(&[(header::COOKIE, "theme=dark; devtalk_session=abc123")]);
        assert_eq!(extract_session_token(&parts, "devtalk_session"), Some("abc123"));
    }

    #[test]
    fn bearer_wins_over_cookie() {
        let parts = parts(&[
            (header::AUTHORIZATION, "Bearer tok"),
            (header::COOKIE, "devtalk_session=abc123"),
        ]);
        assert_eq!(extract_session_token(&parts, "devtalk_session"), Some("tok"));
    }

    #[test]
    fn other_cookies_are_ignored() {
        let parts = parts(&[(header::COOKIE, "legacy_session=abc; devtalk_session=")]);
        assert_eq!(extract_session_token(&parts, "devtalk_session"), None);
    }
}
