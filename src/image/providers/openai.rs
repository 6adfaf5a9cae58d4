//! OpenAI image generation provider (gpt-image-1, dall-e-3).

use crate::config::{Secret, Settings};
use crate::error::{parse_retry_after, sanitize_error_message, ImageGenError, Result};
use crate::image::provider::ImageProvider;
use crate::image::types::{GenerationRequest, GenerationResponse};
use async_trait::async_trait;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Builder for OpenAiImageProvider.
#[derive(Debug, Clone, Default)]
pub struct OpenAiImageProviderBuilder {
    api_key: Option<Secret>,
    base_url: Option<String>,
}

impl OpenAiImageProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key.
    pub fn api_key(mut self, key: Secret) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Overrides the API base URL (default: `https://api.openai.com/v1`).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the provider.
    pub fn build(self) -> Result<OpenAiImageProvider> {
        let api_key = self
            .api_key
            .ok_or_else(|| ImageGenError::Configuration("no API key provided".into()))?;

        let base_url = self
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        Ok(OpenAiImageProvider {
            client: reqwest::Client::new(),
            api_key,
            generations_url: format!("{base_url}/images/generations"),
        })
    }
}

/// OpenAI image generation provider.
pub struct OpenAiImageProvider {
    client: reqwest::Client,
    api_key: Secret,
    generations_url: String,
}

impl OpenAiImageProvider {
    /// Creates a new `OpenAiImageProviderBuilder`.
    pub fn builder() -> OpenAiImageProviderBuilder {
        OpenAiImageProviderBuilder::new()
    }

    /// Builds a provider bound to the resolved settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut builder = Self::builder().api_key(settings.api_key.clone());
        if let Some(url) = &settings.base_url {
            builder = builder.base_url(url.clone());
        }
        builder.build()
    }

    fn parse_error(status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> ImageGenError {
        let text = sanitize_error_message(text);
        if status == 402 {
            return ImageGenError::Billing(text);
        }
        if status == 429 {
            // insufficient_quota is not a transient rate limit
            if text.contains("insufficient_quota") || text.contains("exceeded your current quota") {
                return ImageGenError::Billing(text);
            }
            let retry_after = parse_retry_after(headers).map(Duration::from_secs);
            return ImageGenError::RateLimited { retry_after };
        }
        if status == 401 || status == 403 {
            return ImageGenError::Auth(text);
        }
        let lower = text.to_lowercase();
        if lower.contains("safety") || lower.contains("content_policy") {
            return ImageGenError::ContentBlocked(text);
        }
        ImageGenError::Api {
            status,
            message: text,
        }
    }
}

impl std::fmt::Debug for OpenAiImageProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiImageProvider")
            .field("api_key", &self.api_key)
            .field("generations_url", &self.generations_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ImageProvider for OpenAiImageProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        let start = Instant::now();
        let body = OpenAiImageRequest::from_generation_request(request);

        tracing::debug!(
            model = %request.model,
            size = %request.size,
            url = %self.generations_url,
            "sending image generation request"
        );

        let response = self
            .client
            .post(&self.generations_url)
            .bearer_auth(self.api_key.expose())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(Self::parse_error(status.as_u16(), &text, &headers));
        }

        let bytes = response.bytes().await?;
        let parsed: GenerationResponse = serde_json::from_slice(&bytes)?;

        tracing::debug!(
            records = parsed.data.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "image generation complete"
        );

        Ok(parsed)
    }

    fn name(&self) -> &str {
        "OpenAI (gpt-image)"
    }
}

#[derive(Debug, Serialize)]
struct OpenAiImageRequest<'a> {
    #[serde(flatten)]
    request: &'a GenerationRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<&'static str>,
}

impl<'a> OpenAiImageRequest<'a> {
    fn from_generation_request(request: &'a GenerationRequest) -> Self {
        // gpt-image models always return b64_json and reject response_format
        let response_format = request.model.starts_with("dall-e").then_some("b64_json");
        Self {
            request,
            response_format,
        }
    }
}
