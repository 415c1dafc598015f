use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::gemini_api::GeminiApi;
use crate::error::{ApiErrorResponse, ProjectError};
use crate::middleware::session::{RequireSession, ensure_view};
use crate::router::AppState;
use crate::types::view::{ChatMessage, Sender};

#[derive(Debug, Deserialize)]
pub struct SendMessage {
    pub prompt: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Exchange {
    pub user: ChatMessage,
    pub reply: ChatMessage,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptBody {
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// GET /chat
pub async fn transcript(
    State(state): State<AppState>,
    RequireSession(_session): RequireSession,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Json<TranscriptBody>), ProjectError> {
    let (view, jar) = ensure_view(jar, &state);
    let messages = state.views.messages(view).await?;
    Ok((
        jar,
        Json(TranscriptBody {
            messages,
            message: None,
        }),
    ))
}

/// POST /chat -> appends the prompt, asks the model, appends the reply on success.
pub async fn send_message(
    State(state): State<AppState>,
    RequireSession(_session): RequireSession,
    jar: PrivateCookieJar,
    Json(body): Json<SendMessage>,
) -> Response {
    let (view, jar) = ensure_view(jar, &state);

    if body.prompt.trim().is_empty() {
        let err = ProjectError::Validation("Message cannot be empty".to_string());
        return (jar, err).into_response();
    }

    let model = body
        .model
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(state.config.gemini.default_model.as_str());
    if !GeminiApi::is_model_id(model) {
        warn!(%view, "rejected malformed model id");
        let err = ProjectError::Validation("Unknown model".to_string());
        return (jar, err).into_response();
    }

    let user = match state.views.append(view, body.prompt.clone(), Sender::User).await {
        Ok(m) => m,
        Err(e) => return (jar, e).into_response(),
    };

    let text = match state.generator.generate(&body.prompt, model).await {
        Ok(text) => text,
        Err(e) => {
            warn!(%view, model, error = %e, "Error getting AI response");
            let body =
                ApiErrorResponse::new("CHAT_FAILED", "Failed to get response. Please try again.");
            return (jar, (StatusCode::BAD_GATEWAY, Json(body))).into_response();
        }
    };

    match state.views.append(view, text, Sender::Bot).await {
        Ok(reply) => (jar, Json(Exchange { user, reply })).into_response(),
        Err(e) => (jar, e).into_response(),
    }
}

/// DELETE /chat
pub async fn clear(
    State(state): State<AppState>,
    RequireSession(_session): RequireSession,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Json<TranscriptBody>), ProjectError> {
    let (view, jar) = ensure_view(jar, &state);
    let dropped = state.views.clear(view).await?;
    info!(%view, dropped, "chat cleared");
    Ok((
        jar,
        Json(TranscriptBody {
            messages: Vec::new(),
            message: Some("Chat cleared!".to_string()),
        }),
    ))
}
