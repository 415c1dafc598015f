use crate::api::gemini_api::GeminiApi;
use crate::config::GeminiConfig;
use crate::error::{GeminiError, ProjectError};
use crate::types::gemini::{GenerateContentRequest, GeminiResponse};
use async_trait::async_trait;
use backon::ExponentialBuilder;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Turns a prompt into the model's full text reply.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, ProjectError>;
}

/// Gemini `generateContent` over an API key.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    max_retries: usize,
}

impl GeminiClient {
    pub fn new(client: reqwest::Client, cfg: &GeminiConfig) -> Self {
        if cfg.api_key.is_none() {
            warn!("no Gemini API key configured; chat requests will be rejected upstream");
        }
        Self {
            client,
            base_url: cfg.base_url.clone(),
            api_key: cfg.api_key.clone().unwrap_or_default(),
            max_retries: cfg.max_retries,
        }
    }

    /// Build the HTTP client the way the Gemini calls expect it.
    pub fn http_client(cfg: &GeminiConfig) -> Result<reqwest::Client, ProjectError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("projectx/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(cfg.timeout())
            .build()?;
        Ok(client)
    }

    fn retry_policy(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(500))
            .with_max_delay(Duration::from_secs(3))
            .with_max_times(self.max_retries)
            .with_jitter()
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, ProjectError> {
        let url = GeminiApi::generate_url(&self.base_url, model)?;
        let body = GenerateContentRequest::from_prompt(prompt);

        let resp = GeminiApi::try_generate(
            self.client.clone(),
            url,
            &self.api_key,
            self.retry_policy(),
            &body,
        )
        .await
        .map_err(|e| match e.status() {
            Some(status) => ProjectError::UpstreamStatus(status),
            None => ProjectError::Reqwest(e),
        })?;

        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(match serde_json::from_slice::<GeminiError>(&bytes) {
                Ok(gemini_err) => ProjectError::GeminiServerError(gemini_err),
                Err(_) => ProjectError::UpstreamStatus(status),
            });
        }

        let parsed: GeminiResponse = serde_json::from_slice(&bytes)?;
        debug!(model, version = ?parsed.modelVersion, "Gemini reply received");
        parsed
            .text()
            .ok_or_else(|| ProjectError::EmptyCompletion(parsed.block_reason()))
    }
}
