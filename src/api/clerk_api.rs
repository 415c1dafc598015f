use crate::error::ProjectError;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

pub const SIGN_INS_PATH: &str = "v1/client/sign_ins";
pub const SIGN_UPS_PATH: &str = "v1/client/sign_ups";

/// Stateless Frontend API calls in native-client mode.
pub struct ClerkFrontendApi;

/// A decoded `response` object plus the client token the provider handed back.
#[derive(Debug)]
pub struct FapiReply<T> {
    pub response: T,
    pub client_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    response: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FapiSignIn {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub created_session_id: Option<String>,
    #[serde(default)]
    pub first_factor_verification: Option<FapiVerification>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FapiVerification {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub external_verification_redirect_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FapiSignUp {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub created_session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FapiErrors {
    #[serde(default)]
    errors: Vec<FapiErrorItem>,
}

#[derive(Debug, Deserialize)]
struct FapiErrorItem {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

impl ClerkFrontendApi {
    pub fn sign_up_path(sign_up_id: &str, action: &str) -> String {
        format!("{SIGN_UPS_PATH}/{sign_up_id}/{action}")
    }

    pub fn remove_session_path(session_id: &str) -> String {
        format!("v1/client/sessions/{session_id}/remove")
    }

    /// POST a form to `path` and decode the `response` member.
    pub async fn post_form<T: DeserializeOwned>(
        client: &reqwest::Client,
        base: &Url,
        path: &str,
        client_token: Option<&str>,
        form: &[(&str, &str)],
    ) -> Result<FapiReply<T>, ProjectError> {
        let mut url = base.join(path)?;
        url.query_pairs_mut().append_pair("_is_native", "1");

        let mut req = client.post(url).form(form);
        if let Some(token) = client_token {
            req = req.header(AUTHORIZATION, token);
        }
        let resp = req.send().await?;

        let status = resp.status();
        let client_token = resp
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| client_token.map(str::to_string));
        let bytes = resp.bytes().await?;

        if !status.is_success() {
            return Err(Self::decode_error(status, &bytes));
        }

        let envelope: Envelope<T> = serde_json::from_slice(&bytes)?;
        debug!(path, %status, "identity provider call succeeded");
        Ok(FapiReply {
            response: envelope.response,
            client_token,
        })
    }

    fn decode_error(status: StatusCode, body: &[u8]) -> ProjectError {
        let first = serde_json::from_slice::<FapiErrors>(body)
            .ok()
            .and_then(|e| e.errors.into_iter().next());
        match first {
            Some(item) => ProjectError::Identity {
                status,
                code: item.code.unwrap_or_else(|| "identity_error".to_string()),
                message: item.message,
            },
            None => ProjectError::UpstreamStatus(status),
        }
    }
}
