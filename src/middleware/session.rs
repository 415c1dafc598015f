use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use time::Duration;
use uuid::Uuid;

use crate::error::ProjectError;
use crate::router::AppState;
use crate::service::view_actor::{VIEW_IDLE_TTL, ViewId};

pub const SESSION_COOKIE: &str = "projectx_session";
pub const SIGN_UP_COOKIE: &str = "projectx_sign_up";
pub const VIEW_COOKIE: &str = "projectx_view";

/// The provider session this browser is signed in with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub client_token: Option<String>,
}

/// A sign-up waiting for its email code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSignUp {
    pub id: String,
    pub client_token: Option<String>,
}

/// Extracts the signed-in session or rejects with 401.
#[derive(Debug, Clone)]
pub struct RequireSession(pub Session);

impl<S> FromRequestParts<S> for RequireSession
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = ProjectError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::<Key>::from_request_parts(parts, state)
            .await
            .map_err(|_| ProjectError::MissingSession)?;
        read_json::<Session>(&jar, SESSION_COOKIE)
            .map(RequireSession)
            .ok_or(ProjectError::MissingSession)
    }
}

pub fn read_json<T: DeserializeOwned>(jar: &PrivateCookieJar, name: &str) -> Option<T> {
    jar.get(name)
        .and_then(|c| serde_json::from_str(c.value()).ok())
}

pub fn store_json<T: Serialize>(
    jar: PrivateCookieJar,
    state: &AppState,
    name: &str,
    value: &T,
    max_age: Duration,
) -> Result<PrivateCookieJar, ProjectError> {
    let value = serde_json::to_string(value)?;
    Ok(jar.add(build_cookie(name, value, state.secure_cookies(), max_age)))
}

/// Read this browser's view id, minting and storing a new one on first contact.
pub fn ensure_view(jar: PrivateCookieJar, state: &AppState) -> (ViewId, PrivateCookieJar) {
    if let Some(id) = jar
        .get(VIEW_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok())
    {
        return (id, jar);
    }
    let id = Uuid::new_v4();
    let jar = jar.add(build_cookie(
        VIEW_COOKIE,
        id.to_string(),
        state.secure_cookies(),
        Duration::seconds(VIEW_IDLE_TTL.as_secs() as i64),
    ));
    (id, jar)
}

pub fn clear_auth_cookies(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(clear_cookie(SESSION_COOKIE))
        .remove(clear_cookie(SIGN_UP_COOKIE))
}

fn build_cookie(name: &str, value: String, secure: bool, max_age: Duration) -> Cookie<'static> {
    Cookie::build(Cookie::new(name.to_string(), value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build()
}

fn clear_cookie(name: &str) -> Cookie<'static> {
    Cookie::build(Cookie::new(name.to_string(), ""))
        .path("/")
        .build()
}
