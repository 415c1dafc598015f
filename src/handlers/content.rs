use axum::{Json, extract::State};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::Serialize;

use crate::error::ProjectError;
use crate::middleware::session::{RequireSession, ensure_view};
use crate::router::AppState;
use crate::types::content::{DASHBOARD_ACTIONS, NavLink, SITE, SiteContent};
use crate::types::view::Theme;

#[derive(Serialize)]
pub struct SiteResponse {
    #[serde(flatten)]
    pub content: &'static SiteContent,
    pub theme: Theme,
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub title: &'static str,
    pub theme: Theme,
    pub actions: &'static [NavLink],
}

pub async fn health() -> &'static str {
    "ok"
}

/// GET /site -> landing page data for the caller's theme.
pub async fn site(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Json<SiteResponse>), ProjectError> {
    let (view, jar) = ensure_view(jar, &state);
    let theme = state.views.theme(view).await?;
    Ok((
        jar,
        Json(SiteResponse {
            content: &SITE,
            theme,
        }),
    ))
}

/// GET /dashboard -> shell for signed-in users.
pub async fn dashboard(
    State(state): State<AppState>,
    RequireSession(_session): RequireSession,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Json<DashboardResponse>), ProjectError> {
    let (view, jar) = ensure_view(jar, &state);
    let theme = state.views.theme(view).await?;
    Ok((
        jar,
        Json(DashboardResponse {
            title: "Dashboard",
            theme,
            actions: &DASHBOARD_ACTIONS,
        }),
    ))
}
