use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::Error as SqlxError;
use std::collections::HashMap;
use thiserror::Error as ThisError;

/// Toast text shown when the provider reports a duplicate account.
pub const ALREADY_REGISTERED: &str = "This email is already registered. Please sign in instead.";

#[derive(Debug, ThisError)]
pub enum ProjectError {
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Ractor error: {0}")]
    RactorError(String),

    #[error("Upstream error with status: {0}")]
    UpstreamStatus(StatusCode),

    #[error("Gemini API error: {0:?}")]
    GeminiServerError(GeminiError),

    #[error("model returned no text: {0}")]
    EmptyCompletion(String),

    #[error("identity provider error ({status}): {message}")]
    Identity {
        status: StatusCode,
        code: String,
        message: String,
    },

    #[error("invalid publishable key: {0}")]
    InvalidPublishableKey(String),

    #[error("{0}")]
    Validation(String),

    #[error("not signed in")]
    MissingSession,

    #[error("sign in did not complete: status {0}")]
    SignInIncomplete(String),
}

impl ProjectError {
    /// True when the provider rejected a sign-up because the account exists.
    pub fn is_already_registered(&self) -> bool {
        matches!(self, ProjectError::Identity { message, .. } if message.contains("already exists"))
    }

    /// True when an upstream answered with a 4xx rather than failing.
    pub fn is_client_rejection(&self) -> bool {
        match self {
            ProjectError::Identity { status, .. } | ProjectError::UpstreamStatus(status) => {
                status.is_client_error()
            }
            _ => false,
        }
    }

    fn gemini_status(code: u32) -> StatusCode {
        u16::try_from(code)
            .ok()
            .and_then(|c| StatusCode::from_u16(c).ok())
            .filter(|s| s.is_client_error() || s.is_server_error())
            .unwrap_or(StatusCode::BAD_GATEWAY)
    }
}

impl IntoResponse for ProjectError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            ProjectError::GeminiServerError(gemini_err) => {
                let status = ProjectError::gemini_status(gemini_err.error.code);

                let body = ApiErrorBody {
                    code: gemini_err.error.status,
                    message: gemini_err.error.message,
                };
                (status, body)
            }
            ProjectError::DatabaseError(_) | ProjectError::RactorError(_) => {
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                let body = ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                };
                (status, body)
            }
            ref err @ ProjectError::Identity { .. } if err.is_already_registered() => (
                StatusCode::CONFLICT,
                ApiErrorBody {
                    code: "ALREADY_REGISTERED".to_string(),
                    message: ALREADY_REGISTERED.to_string(),
                },
            ),
            ProjectError::Identity {
                status,
                code,
                message,
            } => {
                let status = if status.is_client_error() {
                    status
                } else {
                    StatusCode::BAD_GATEWAY
                };
                (status, ApiErrorBody { code, message })
            }
            ProjectError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "BAD_REQUEST".to_string(),
                    message,
                },
            ),
            ProjectError::MissingSession => (
                StatusCode::UNAUTHORIZED,
                ApiErrorBody {
                    code: "UNAUTHORIZED".to_string(),
                    message: "Session expired. Please sign in again.".to_string(),
                },
            ),
            ProjectError::SignInIncomplete(_) => (
                StatusCode::UNAUTHORIZED,
                ApiErrorBody {
                    code: "SIGN_IN_INCOMPLETE".to_string(),
                    message: "Sign in failed. Please try again.".to_string(),
                },
            ),
            ProjectError::InvalidPublishableKey(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorBody {
                    code: "MISCONFIGURED".to_string(),
                    message: "Authentication is not configured.".to_string(),
                },
            ),
            ProjectError::Reqwest(_)
            | ProjectError::UrlParse(_)
            | ProjectError::Json(_)
            | ProjectError::EmptyCompletion(_) => {
                let status = StatusCode::BAD_GATEWAY;
                let body = ApiErrorBody {
                    code: "BAD_GATEWAY".to_string(),
                    message: "Upstream service is unavailable.".to_string(),
                };
                (status, body)
            }
            ProjectError::UpstreamStatus(code) => {
                let (err_code, msg) = match code {
                    StatusCode::TOO_MANY_REQUESTS => {
                        ("RATE_LIMIT", "Upstream rate limit exceeded.")
                    }
                    StatusCode::UNAUTHORIZED => ("UNAUTHORIZED", "Upstream authentication failed."),
                    StatusCode::FORBIDDEN => ("FORBIDDEN", "Upstream permission denied."),
                    StatusCode::NOT_FOUND => ("NOT_FOUND", "Upstream resource not found."),
                    _ => ("UPSTREAM_ERROR", "An upstream error occurred."),
                };

                (
                    StatusCode::BAD_GATEWAY,
                    ApiErrorBody {
                        code: err_code.to_string(),
                        message: msg.to_string(),
                    },
                )
            }
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize, Deserialize, Debug)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorBody {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

/// Gemini API error response structure
#[derive(Deserialize, Debug)]
pub struct GeminiError {
    pub error: GeminiErrorBody,
}

#[derive(Deserialize, Debug)]
pub struct GeminiErrorBody {
    pub code: u32,
    pub message: String,
    pub status: String,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: ProjectError) -> (StatusCode, ApiErrorResponse) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn duplicate_account_maps_to_conflict() {
        let (status, body) = body_of(ProjectError::Identity {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            code: "form_identifier_exists".to_string(),
            message: "That email address already exists.".to_string(),
        })
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.error.message, ALREADY_REGISTERED);
    }

    #[tokio::test]
    async fn identity_client_errors_keep_status_and_message() {
        let (status, body) = body_of(ProjectError::Identity {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            code: "form_password_incorrect".to_string(),
            message: "Password is incorrect. Try again.".to_string(),
        })
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.error.code, "form_password_incorrect");
    }

    #[tokio::test]
    async fn gemini_error_keeps_upstream_code() {
        let err: GeminiError = serde_json::from_str(
            r#"{"error":{"code":429,"message":"quota","status":"RESOURCE_EXHAUSTED"}}"#,
        )
        .unwrap();
        let (status, body) = body_of(ProjectError::GeminiServerError(err)).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body.error.code, "RESOURCE_EXHAUSTED");
    }

    #[tokio::test]
    async fn gemini_codes_outside_error_range_become_bad_gateway() {
        for code in [200, 101, 65_536 + 429, 0] {
            let err = GeminiError {
                error: GeminiErrorBody {
                    code,
                    message: "odd".to_string(),
                    status: "UNKNOWN".to_string(),
                    extra: HashMap::new(),
                },
            };
            let (status, _) = body_of(ProjectError::GeminiServerError(err)).await;
            assert_eq!(status, StatusCode::BAD_GATEWAY, "code {code}");
        }
    }

    #[test]
    fn only_4xx_counts_as_client_rejection() {
        let identity = |status| ProjectError::Identity {
            status,
            code: "resource_not_found".to_string(),
            message: "gone".to_string(),
        };
        assert!(identity(StatusCode::NOT_FOUND).is_client_rejection());
        assert!(ProjectError::UpstreamStatus(StatusCode::UNAUTHORIZED).is_client_rejection());
        assert!(!identity(StatusCode::BAD_GATEWAY).is_client_rejection());
        let unavailable = ProjectError::UpstreamStatus(StatusCode::SERVICE_UNAVAILABLE);
        assert!(!unavailable.is_client_rejection());
        assert!(!ProjectError::MissingSession.is_client_rejection());
    }

    #[tokio::test]
    async fn database_errors_are_generic() {
        let (status, body) = body_of(ProjectError::DatabaseError(SqlxError::RowNotFound)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, "INTERNAL_ERROR");
    }
}
