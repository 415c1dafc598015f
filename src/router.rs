use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use std::sync::Arc;
use tracing::warn;

use crate::config::Config;
use crate::db::UsersStorage;
use crate::handlers::{auth, chat, content, theme, users};
use crate::service::generator::TextGenerator;
use crate::service::identity::IdentityProvider;
use crate::service::view_actor::ViewStateHandle;

const BODY_LIMIT: usize = 1024 * 1024;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub users: UsersStorage,
    pub identity: Arc<dyn IdentityProvider>,
    pub generator: Arc<dyn TextGenerator>,
    pub views: ViewStateHandle,
    pub config: Arc<Config>,
    key: Key,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        users: UsersStorage,
        identity: Arc<dyn IdentityProvider>,
        generator: Arc<dyn TextGenerator>,
        views: ViewStateHandle,
    ) -> Self {
        let key = cookie_key(config.basic.cookie_secret.as_deref());
        Self {
            users,
            identity,
            generator,
            views,
            config,
            key,
        }
    }

    pub fn secure_cookies(&self) -> bool {
        !self.config.basic.insecure_cookie
    }
}

/// Derive the cookie key from a configured secret, or fall back to a random one.
fn cookie_key(secret: Option<&str>) -> Key {
    match secret {
        Some(secret) if secret.len() >= 32 => Key::derive_from(secret.as_bytes()),
        Some(_) => {
            warn!("cookie_secret shorter than 32 bytes; using a random key");
            Key::generate()
        }
        None => Key::generate(),
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(content::health))
        .route("/site", get(content::site))
        .route("/dashboard", get(content::dashboard))
        .route("/users", post(users::sync_user))
        .route("/auth/sign-in", post(auth::sign_in))
        .route("/auth/sign-up", post(auth::sign_up))
        .route("/auth/sign-up/verify", post(auth::verify_sign_up))
        .route("/auth/oauth/google", get(auth::oauth_google))
        .route("/auth/sign-out", post(auth::sign_out))
        .route("/theme", get(theme::get_theme).put(theme::set_theme))
        .route("/theme/toggle", post(theme::toggle_theme))
        .route(
            "/chat",
            get(chat::transcript)
                .post(chat::send_message)
                .delete(chat::clear),
        )
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}
