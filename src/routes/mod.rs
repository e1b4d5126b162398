pub mod admin;
pub mod auth;
pub mod comments;
pub mod jobs;
pub mod profiles;
pub mod topics;
pub mod uploads;
pub mod views;

use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::AppResult;
use crate::forum::backend::ForumBackend;
use crate::forum::dialogs::{DialogAction, DialogOutcome, MutationDialog};
use crate::forum::domain::UserId;
use crate::forum::notify::Toast;
use crate::state::AppState;

/// The full HTTP application.
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .merge(auth::router())
        .merge(topics::router())
        .merge(comments::router())
        .merge(jobs::router())
        .merge(profiles::router(&state.config))
        .merge(admin::router())
        .route("/uploads/{*path}", get(uploads::serve));

    let router = match cors_layer(&state.config.server.cors_origins) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();
    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true),
    )
}

/// Result of a dialog-backed mutation.
pub(crate) struct Submitted<T> {
    pub output: T,
    pub toast: Option<Toast>,
    pub closed: bool,
    pub refreshed: bool,
}

impl<T> Submitted<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Submitted<U> {
        Submitted {
            output: f(self.output),
            toast: self.toast,
            closed: self.closed,
            refreshed: self.refreshed,
        }
    }
}

/// Run one dialog submit for a request. Validation and backend failures
/// become error responses carrying their message.
pub(crate) async fn submit_dialog<A: DialogAction>(
    backend: &dyn ForumBackend,
    actor: &UserId,
    action: A,
    form: A::Form,
) -> AppResult<Submitted<A::Output>> {
    let mut dialog = MutationDialog::new(action);
    dialog.open_with(form);

    let mut refreshed = false;
    match dialog.submit(backend, actor, || refreshed = true).await {
        DialogOutcome::Saved(output) => Ok(Submitted {
            output,
            toast: dialog.take_toasts().pop(),
            closed: !dialog.is_open(),
            refreshed,
        }),
        DialogOutcome::Invalid(e) => Err(e.into()),
        DialogOutcome::Failed(e) => Err(e.into()),
    }
}
