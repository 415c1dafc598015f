use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::debug;

use crate::db::NewUser;
use crate::router::AppState;

/// `{ user: { primaryEmailAddress: { emailAddress }, fullName } }`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    #[serde(default)]
    pub user: Option<ProviderUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderUser {
    #[serde(default)]
    pub primary_email_address: Option<EmailAddress>,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAddress {
    #[serde(default)]
    pub email_address: Option<String>,
}

impl SyncRequest {
    /// Validate the payload into the fields to store.
    pub fn into_new_user(self, require_name: bool) -> Result<NewUser, &'static str> {
        let user = self.user.ok_or("Email is required")?;
        let email = user
            .primary_email_address
            .and_then(|e| e.email_address)
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .ok_or("Email is required")?;
        let name = user
            .full_name
            .map(|n| n.trim().to_string())
            .unwrap_or_default();
        if require_name && name.is_empty() {
            return Err("Name is required");
        }
        Ok(NewUser { email, name })
    }
}

/// Parses and validates the user-sync body; rejects with a plain-text 400.
pub struct SyncUser(pub NewUser);

impl FromRequest<AppState> for SyncUser {
    type Rejection = Response;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let parsed: SyncRequest = match serde_json::from_slice(&bytes) {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, "unparseable user-sync body");
                return Err(bad_request("Email is required"));
            }
        };

        parsed
            .into_new_user(state.config.users.require_name)
            .map(SyncUser)
            .map_err(bad_request)
    }
}

fn bad_request(message: &'static str) -> Response {
    (StatusCode::BAD_REQUEST, message).into_response()
}
