use crate::error::ProjectError;
use crate::types::gemini::GenerateContentRequest;
use backon::{ExponentialBuilder, Retryable};
use tracing::error;
use url::Url;

pub struct GeminiApi;

impl GeminiApi {
    /// Model ids are a single path segment: ASCII letters, digits, `.`, `_` and `-`.
    pub fn is_model_id(model: &str) -> bool {
        !model.is_empty()
            && model
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
            && model != "."
            && model != ".."
    }

    /// `{base}/v1beta/models/{model}:generateContent`
    pub fn generate_url(base: &Url, model: &str) -> Result<Url, ProjectError> {
        if !Self::is_model_id(model) {
            return Err(ProjectError::Validation(format!("Unknown model: {model}")));
        }
        Ok(base.join(&format!("v1beta/models/{model}:generateContent"))?)
    }

    /// POST the request, retrying only on upstream 5xx and transport errors.
    pub async fn try_generate(
        client: reqwest::Client,
        url: Url,
        api_key: impl AsRef<str>,
        retry_policy: ExponentialBuilder,
        body: &GenerateContentRequest,
    ) -> Result<reqwest::Response, reqwest::Error> {
        (|| async {
            let resp = client
                .post(url.clone())
                .header("x-goog-api-key", api_key.as_ref())
                .json(body)
                .send()
                .await?;
            if resp.status().is_server_error() {
                let status = resp.status();
                let err = resp.error_for_status().unwrap_err();
                error!("Gemini server error (will retry): {}", status);
                return Err(err);
            }
            Ok(resp)
        })
        .retry(retry_policy)
        .await
    }
}
