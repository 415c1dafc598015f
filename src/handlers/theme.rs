use axum::{Json, extract::State};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::{Deserialize, Serialize};

use crate::error::ProjectError;
use crate::middleware::session::ensure_view;
use crate::router::AppState;
use crate::types::view::Theme;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ThemeBody {
    pub theme: Theme,
}

pub async fn get_theme(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Json<ThemeBody>), ProjectError> {
    let (view, jar) = ensure_view(jar, &state);
    let theme = state.views.theme(view).await?;
    Ok((jar, Json(ThemeBody { theme })))
}

pub async fn toggle_theme(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Json<ThemeBody>), ProjectError> {
    let (view, jar) = ensure_view(jar, &state);
    let theme = state.views.toggle_theme(view).await?;
    Ok((jar, Json(ThemeBody { theme })))
}

pub async fn set_theme(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Json(body): Json<ThemeBody>,
) -> Result<(PrivateCookieJar, Json<ThemeBody>), ProjectError> {
    let (view, jar) = ensure_view(jar, &state);
    let theme = state.views.set_theme(view, body.theme).await?;
    Ok((jar, Json(ThemeBody { theme })))
}
