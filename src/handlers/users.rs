use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::middleware::sync_body::SyncUser;
use crate::router::AppState;

/// POST /users -> returns the local record for the provider user, creating it on first sight.
pub async fn sync_user(State(state): State<AppState>, SyncUser(new_user): SyncUser) -> Response {
    match state.users.find_or_create(new_user).await {
        Ok(record) => Json(record).into_response(),
        Err(e) => {
            error!("Error in POST /users: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}
