#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode, header},
};
use projectx::config::Config;
use projectx::db::UsersStorage;
use projectx::error::ProjectError;
use projectx::service::generator::TextGenerator;
use projectx::service::identity::{IdentityProvider, SignInAttempt, SignUpAttempt};
use projectx::service::view_actor;
use projectx::{AppState, app_router};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use url::Url;

pub const GOOD_PASSWORD: &str = "correct horse";
pub const MFA_PASSWORD: &str = "needs mfa";
pub const GOOD_CODE: &str = "424242";
pub const TAKEN_EMAIL: &str = "taken@x.dev";

fn identity_error(message: &str) -> ProjectError {
    ProjectError::Identity {
        status: StatusCode::UNPROCESSABLE_ENTITY,
        code: "form_error".to_string(),
        message: message.to_string(),
    }
}

/// Identity provider double with canned answers.
#[derive(Default)]
pub struct StubIdentity {
    pub signed_out: Mutex<Vec<String>>,
    pub fail_sign_out: bool,
    /// Answer sign-out as if the provider had already revoked the session.
    pub session_gone: bool,
}

#[async_trait]
impl IdentityProvider for StubIdentity {
    async fn sign_in_with_password(
        &self,
        _identifier: &str,
        password: &str,
    ) -> Result<SignInAttempt, ProjectError> {
        match password {
            GOOD_PASSWORD => Ok(SignInAttempt {
                status: "complete".to_string(),
                session_id: Some("sess_1".to_string()),
                client_token: Some("client_tok".to_string()),
            }),
            MFA_PASSWORD => Ok(SignInAttempt {
                status: "needs_second_factor".to_string(),
                session_id: None,
                client_token: None,
            }),
            _ => Err(identity_error("Password is incorrect. Try again.")),
        }
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        _name: &str,
    ) -> Result<SignUpAttempt, ProjectError> {
        if email == TAKEN_EMAIL {
            return Err(identity_error("That email address already exists."));
        }
        Ok(SignUpAttempt {
            id: "sua_1".to_string(),
            status: "missing_requirements".to_string(),
            session_id: None,
            client_token: Some("client_tok".to_string()),
        })
    }

    async fn prepare_email_verification(
        &self,
        _sign_up_id: &str,
        _client_token: Option<&str>,
    ) -> Result<(), ProjectError> {
        Ok(())
    }

    async fn attempt_email_verification(
        &self,
        sign_up_id: &str,
        code: &str,
        client_token: Option<&str>,
    ) -> Result<SignUpAttempt, ProjectError> {
        if code != GOOD_CODE {
            return Err(identity_error("Incorrect code"));
        }
        Ok(SignUpAttempt {
            id: sign_up_id.to_string(),
            status: "complete".to_string(),
            session_id: Some("sess_2".to_string()),
            client_token: client_token.map(str::to_string),
        })
    }

    async fn oauth_redirect(
        &self,
        strategy: &str,
        redirect_url: &str,
    ) -> Result<Url, ProjectError> {
        let mut url = Url::parse("https://accounts.example.com/o/oauth2/auth")?;
        url.query_pairs_mut()
            .append_pair("strategy", strategy)
            .append_pair("redirect", redirect_url);
        Ok(url)
    }

    async fn sign_out(
        &self,
        session_id: &str,
        _client_token: Option<&str>,
    ) -> Result<(), ProjectError> {
        if self.fail_sign_out {
            return Err(ProjectError::UpstreamStatus(StatusCode::SERVICE_UNAVAILABLE));
        }
        if self.session_gone {
            return Err(ProjectError::Identity {
                status: StatusCode::NOT_FOUND,
                code: "resource_not_found".to_string(),
                message: "Session not found".to_string(),
            });
        }
        self.signed_out.lock().unwrap().push(session_id.to_string());
        Ok(())
    }
}

/// Echoes prompts back; the prompt `fail` errors like an unavailable upstream.
#[derive(Default)]
pub struct StubGenerator {
    pub calls: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, ProjectError> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), model.to_string()));
        if prompt == "fail" {
            return Err(ProjectError::UpstreamStatus(StatusCode::SERVICE_UNAVAILABLE));
        }
        Ok(format!("echo: {prompt}"))
    }
}

pub struct TestApp {
    pub router: Router,
    pub users: UsersStorage,
    pub identity: Arc<StubIdentity>,
    pub generator: Arc<StubGenerator>,
}

pub async fn spawn_app(cfg: Config) -> TestApp {
    spawn_app_with(cfg, StubIdentity::default()).await
}

pub async fn spawn_app_with(mut cfg: Config, identity: StubIdentity) -> TestApp {
    cfg.basic.database_url = "sqlite::memory:".to_string();
    cfg.basic.insecure_cookie = true;
    let users = UsersStorage::connect(&cfg.basic.database_url)
        .await
        .expect("in-memory database");
    let identity = Arc::new(identity);
    let generator = Arc::new(StubGenerator::default());
    let views = view_actor::spawn().await.expect("view actor");
    let state = AppState::new(
        Arc::new(cfg),
        users.clone(),
        identity.clone(),
        generator.clone(),
        views,
    );
    TestApp {
        router: app_router(state),
        users,
        identity,
        generator,
    }
}

/// Minimal browser-like cookie jar for chaining requests.
#[derive(Debug, Default, Clone)]
pub struct Cookies(HashMap<String, String>);

impl Cookies {
    pub fn absorb<B>(&mut self, resp: &Response<B>) {
        for value in resp.headers().get_all(header::SET_COOKIE) {
            let Ok(raw) = value.to_str() else { continue };
            let removed = raw.contains("Max-Age=0");
            let pair = raw.split(';').next().unwrap_or_default();
            let Some((name, val)) = pair.split_once('=') else { continue };
            if removed || val.is_empty() {
                self.0.remove(name.trim());
            } else {
                self.0.insert(name.trim().to_string(), val.trim().to_string());
            }
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    fn header(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

pub async fn send(
    app: &TestApp,
    cookies: &mut Cookies,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Response<Body>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if !cookies.0.is_empty() {
        builder = builder.header(header::COOKIE, cookies.header());
    }
    let req = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("failed to build request");

    let resp = app.router.clone().oneshot(req).await.expect("request failed");
    cookies.absorb(&resp);
    (resp.status(), resp)
}

pub async fn body_json(resp: Response<Body>) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body was not json")
}

pub async fn body_text(resp: Response<Body>) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    String::from_utf8(bytes.to_vec()).expect("response body was not utf-8")
}

pub async fn signed_in(app: &TestApp) -> Cookies {
    let mut cookies = Cookies::default();
    let (status, _) = send(
        app,
        &mut cookies,
        "POST",
        "/auth/sign-in",
        Some(serde_json::json!({ "identifier": "ada@x.dev", "password": GOOD_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    cookies
}
