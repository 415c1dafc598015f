use crate::api::clerk_api::{
    ClerkFrontendApi, FapiSignIn, FapiSignUp, SIGN_INS_PATH, SIGN_UPS_PATH,
};
use crate::config::IdentityConfig;
use crate::error::ProjectError;
use crate::service::publishable_key::frontend_api_from_key;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::info;
use url::Url;

pub const STATUS_COMPLETE: &str = "complete";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInAttempt {
    pub status: String,
    pub session_id: Option<String>,
    pub client_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpAttempt {
    pub id: String,
    pub status: String,
    pub session_id: Option<String>,
    pub client_token: Option<String>,
}

impl SignInAttempt {
    pub fn is_complete(&self) -> bool {
        self.status == STATUS_COMPLETE && self.session_id.is_some()
    }
}

impl SignUpAttempt {
    pub fn is_complete(&self) -> bool {
        self.status == STATUS_COMPLETE && self.session_id.is_some()
    }
}

/// The identity-provider calls the auth routes branch on.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<SignInAttempt, ProjectError>;

    /// Create a sign-up carrying the display name as unsafe metadata.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<SignUpAttempt, ProjectError>;

    /// Send the email verification code.
    async fn prepare_email_verification(
        &self,
        sign_up_id: &str,
        client_token: Option<&str>,
    ) -> Result<(), ProjectError>;

    async fn attempt_email_verification(
        &self,
        sign_up_id: &str,
        code: &str,
        client_token: Option<&str>,
    ) -> Result<SignUpAttempt, ProjectError>;

    /// Start an OAuth sign-in and return where the browser must go next.
    async fn oauth_redirect(&self, strategy: &str, redirect_url: &str)
    -> Result<Url, ProjectError>;

    async fn sign_out(&self, session_id: &str, client_token: Option<&str>)
    -> Result<(), ProjectError>;
}

/// Frontend API implementation of [`IdentityProvider`].
#[derive(Clone)]
pub struct ClerkIdentity {
    client: reqwest::Client,
    frontend_api: Url,
}

impl ClerkIdentity {
    pub fn new(client: reqwest::Client, frontend_api: Url) -> Self {
        Self {
            client,
            frontend_api,
        }
    }

    /// Resolve the Frontend API origin from config and build the client.
    pub fn from_config(cfg: &IdentityConfig) -> Result<Self, ProjectError> {
        let frontend_api = match (&cfg.frontend_api, &cfg.publishable_key) {
            (Some(url), _) => url.clone(),
            (None, Some(key)) => frontend_api_from_key(key)?,
            (None, None) => {
                return Err(ProjectError::InvalidPublishableKey(
                    "no publishable key configured".to_string(),
                ));
            }
        };
        let client = reqwest::Client::builder()
            .user_agent(concat!("projectx/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;
        info!(frontend_api = %frontend_api, "identity provider configured");
        Ok(Self::new(client, frontend_api))
    }

    fn sign_up_attempt(reply: FapiSignUp, client_token: Option<String>) -> SignUpAttempt {
        SignUpAttempt {
            id: reply.id,
            status: reply.status,
            session_id: reply.created_session_id,
            client_token,
        }
    }
}

#[async_trait]
impl IdentityProvider for ClerkIdentity {
    async fn sign_in_with_password(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<SignInAttempt, ProjectError> {
        let reply = ClerkFrontendApi::post_form::<FapiSignIn>(
            &self.client,
            &self.frontend_api,
            SIGN_INS_PATH,
            None,
            &[
                ("identifier", identifier),
                ("password", password),
                ("strategy", "password"),
            ],
        )
        .await?;
        Ok(SignInAttempt {
            status: reply.response.status,
            session_id: reply.response.created_session_id,
            client_token: reply.client_token,
        })
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<SignUpAttempt, ProjectError> {
        let metadata = json!({ "name": name }).to_string();
        let reply = ClerkFrontendApi::post_form::<FapiSignUp>(
            &self.client,
            &self.frontend_api,
            SIGN_UPS_PATH,
            None,
            &[
                ("email_address", email),
                ("password", password),
                ("unsafe_metadata", metadata.as_str()),
            ],
        )
        .await?;
        Ok(Self::sign_up_attempt(reply.response, reply.client_token))
    }

    async fn prepare_email_verification(
        &self,
        sign_up_id: &str,
        client_token: Option<&str>,
    ) -> Result<(), ProjectError> {
        ClerkFrontendApi::post_form::<Value>(
            &self.client,
            &self.frontend_api,
            &ClerkFrontendApi::sign_up_path(sign_up_id, "prepare_verification"),
            client_token,
            &[("strategy", "email_code")],
        )
        .await?;
        Ok(())
    }

    async fn attempt_email_verification(
        &self,
        sign_up_id: &str,
        code: &str,
        client_token: Option<&str>,
    ) -> Result<SignUpAttempt, ProjectError> {
        let reply = ClerkFrontendApi::post_form::<FapiSignUp>(
            &self.client,
            &self.frontend_api,
            &ClerkFrontendApi::sign_up_path(sign_up_id, "attempt_verification"),
            client_token,
            &[("strategy", "email_code"), ("code", code)],
        )
        .await?;
        Ok(Self::sign_up_attempt(reply.response, reply.client_token))
    }

    async fn oauth_redirect(
        &self,
        strategy: &str,
        redirect_url: &str,
    ) -> Result<Url, ProjectError> {
        let reply = ClerkFrontendApi::post_form::<FapiSignIn>(
            &self.client,
            &self.frontend_api,
            SIGN_INS_PATH,
            None,
            &[
                ("strategy", strategy),
                ("redirect_url", redirect_url),
                ("action_complete_redirect_url", redirect_url),
            ],
        )
        .await?;
        let target = reply
            .response
            .first_factor_verification
            .and_then(|v| v.external_verification_redirect_url)
            .ok_or_else(|| ProjectError::Identity {
                status: reqwest::StatusCode::BAD_GATEWAY,
                code: "missing_redirect".to_string(),
                message: "Failed to sign in with Google".to_string(),
            })?;
        Ok(Url::parse(&target)?)
    }

    async fn sign_out(
        &self,
        session_id: &str,
        client_token: Option<&str>,
    ) -> Result<(), ProjectError> {
        ClerkFrontendApi::post_form::<Value>(
            &self.client,
            &self.frontend_api,
            &ClerkFrontendApi::remove_session_path(session_id),
            client_token,
            &[],
        )
        .await?;
        info!("session removed at identity provider");
        Ok(())
    }
}
