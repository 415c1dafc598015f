use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, PrivateCookieJar};
use serde::{Deserialize, Serialize};
use time::Duration;
use tracing::{info, warn};

use crate::error::{ALREADY_REGISTERED, ApiErrorResponse, ProjectError};
use crate::middleware::session::{
    PendingSignUp, SESSION_COOKIE, SIGN_UP_COOKIE, Session, clear_auth_cookies, read_json,
    store_json,
};
use crate::router::AppState;

const AFTER_SIGN_IN: &str = "/dashboard";

#[derive(Debug, Deserialize)]
pub struct SignInForm {
    #[serde(alias = "email", alias = "emailAddress")]
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyForm {
    pub code: String,
}

/// What the client should toast and where it should go next.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthOutcome {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    pub message: String,
}

impl AuthOutcome {
    fn new(status: &str, redirect: Option<&str>, message: &str) -> Self {
        Self {
            status: status.to_string(),
            redirect: redirect.map(str::to_string),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RedirectingError {
    #[serde(flatten)]
    body: ApiErrorResponse,
    redirect: &'static str,
}

fn session_max_age() -> Duration {
    Duration::days(7)
}

/// POST /auth/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Json(form): Json<SignInForm>,
) -> Result<(PrivateCookieJar, Json<AuthOutcome>), ProjectError> {
    if form.identifier.trim().is_empty() || form.password.is_empty() {
        return Err(ProjectError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let attempt = state
        .identity
        .sign_in_with_password(form.identifier.trim(), &form.password)
        .await
        .inspect_err(|e| warn!(error = %e, "sign in rejected"))?;

    if !attempt.is_complete() {
        warn!(status = %attempt.status, "sign in did not complete");
        return Err(ProjectError::SignInIncomplete(attempt.status));
    }

    let session = Session {
        session_id: attempt.session_id.unwrap_or_default(),
        client_token: attempt.client_token,
    };
    let jar = store_json(jar, &state, SESSION_COOKIE, &session, session_max_age())?;
    info!("user signed in");
    Ok((
        jar,
        Json(AuthOutcome::new(
            "complete",
            Some(AFTER_SIGN_IN),
            "Successfully signed in!",
        )),
    ))
}

/// POST /auth/sign-up -> creates the sign-up and mails the verification code.
pub async fn sign_up(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Json(form): Json<SignUpForm>,
) -> Response {
    match start_sign_up(&state, jar, form).await {
        Ok(ok) => ok.into_response(),
        Err(e) if e.is_already_registered() => {
            info!("sign up for an existing account");
            let body = RedirectingError {
                body: ApiErrorResponse::new("ALREADY_REGISTERED", ALREADY_REGISTERED),
                redirect: "/auth",
            };
            (StatusCode::CONFLICT, Json(body)).into_response()
        }
        Err(e) => {
            warn!(error = %e, "sign up failed");
            e.into_response()
        }
    }
}

async fn start_sign_up(
    state: &AppState,
    jar: PrivateCookieJar,
    form: SignUpForm,
) -> Result<(PrivateCookieJar, Json<AuthOutcome>), ProjectError> {
    if form.email.trim().is_empty() || form.password.is_empty() {
        return Err(ProjectError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let attempt = state
        .identity
        .sign_up(form.email.trim(), &form.password, form.name.trim())
        .await?;
    state
        .identity
        .prepare_email_verification(&attempt.id, attempt.client_token.as_deref())
        .await?;

    let pending = PendingSignUp {
        id: attempt.id,
        client_token: attempt.client_token,
    };
    let jar = store_json(jar, state, SIGN_UP_COOKIE, &pending, Duration::minutes(30))?;
    Ok((
        jar,
        Json(AuthOutcome::new(
            "pending_verification",
            None,
            "Verification email sent successfully!",
        )),
    ))
}

/// POST /auth/sign-up/verify -> completes the pending sign-up with the emailed code.
pub async fn verify_sign_up(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Json(form): Json<VerifyForm>,
) -> Result<(PrivateCookieJar, Json<AuthOutcome>), ProjectError> {
    let Some(pending) = read_json::<PendingSignUp>(&jar, SIGN_UP_COOKIE) else {
        return Err(ProjectError::Validation(
            "No sign up in progress".to_string(),
        ));
    };
    if form.code.trim().is_empty() {
        return Err(ProjectError::Validation(
            "Verification code is required".to_string(),
        ));
    }

    let attempt = state
        .identity
        .attempt_email_verification(
            &pending.id,
            form.code.trim(),
            pending.client_token.as_deref(),
        )
        .await
        .inspect_err(|e| warn!(error = %e, "verification failed"))?;

    if !attempt.is_complete() {
        return Ok((
            jar,
            Json(AuthOutcome::new(
                &attempt.status,
                None,
                "Verification is not complete yet",
            )),
        ));
    }

    let session = Session {
        session_id: attempt.session_id.unwrap_or_default(),
        client_token: attempt.client_token,
    };
    let jar = jar.remove(Cookie::build(SIGN_UP_COOKIE).path("/").build());
    let jar = store_json(jar, &state, SESSION_COOKIE, &session, session_max_age())?;
    info!("sign up verified");
    Ok((
        jar,
        Json(AuthOutcome::new(
            "complete",
            Some(AFTER_SIGN_IN),
            "Email verified successfully! Redirecting...",
        )),
    ))
}

/// GET /auth/oauth/google -> redirect to the provider's Google consent flow.
pub async fn oauth_google(State(state): State<AppState>) -> Result<Redirect, ProjectError> {
    let target = state
        .identity
        .oauth_redirect("oauth_google", AFTER_SIGN_IN)
        .await
        .inspect_err(|e| warn!(error = %e, "Google sign-in error"))?;
    info!("Dispatching OAuth redirect");
    Ok(Redirect::temporary(target.as_str()))
}

/// POST /auth/sign-out
///
/// A session the provider no longer knows (any 4xx) is still cleared locally;
/// transport failures and 5xx keep the cookies so the user can retry.
pub async fn sign_out(State(state): State<AppState>, jar: PrivateCookieJar) -> Response {
    if let Some(session) = read_json::<Session>(&jar, SESSION_COOKIE) {
        match state
            .identity
            .sign_out(&session.session_id, session.client_token.as_deref())
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_client_rejection() => {
                info!(error = %e, "session already gone at identity provider");
            }
            Err(e) => {
                warn!(error = %e, "Error signing out");
                let body = ApiErrorResponse::new(
                    "SIGN_OUT_FAILED",
                    "Error signing out. Please try again.",
                );
                return (jar, (StatusCode::BAD_GATEWAY, Json(body))).into_response();
            }
        }
    }

    let jar = clear_auth_cookies(jar);
    (jar, Json(AuthOutcome::new("signed_out", Some("/"), "Signed out"))).into_response()
}
