//! HTTP client for Gemini image generation.

use crate::gemini::{GenerateContentRequest, extract_declined_text, extract_inline_image};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use dripcam_core::ProviderSettings;
use dripcam_error::{GenerationError, GenerationErrorKind};
use dripcam_interface::ImageGenerator;
use reqwest::Client;
use tracing::{debug, error, instrument, warn};

/// Client for Gemini's image-capable `generateContent` models.
///
/// Makes exactly one request per [`generate`](ImageGenerator::generate)
/// call, bounded by the configured timeout.
#[derive(Clone)]
pub struct GeminiImageClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    mime_type: String,
    timeout_secs: u64,
}

impl std::fmt::Debug for GeminiImageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiImageClient")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("mime_type", &self.mime_type)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl GeminiImageClient {
    /// Build a client from provider settings.
    ///
    /// # Errors
    ///
    /// `MissingApiKey` if no key is configured, `ClientCreation` if the HTTP
    /// client cannot be built.
    #[instrument(skip(settings), fields(model = %settings.model))]
    pub fn new(settings: &ProviderSettings) -> Result<Self, GenerationError> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GenerationError::new(GenerationErrorKind::MissingApiKey))?;

        let client = Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| GenerationError::new(GenerationErrorKind::ClientCreation(e.to_string())))?;

        let endpoint = format!(
            "{}/{}:generateContent",
            settings.base_url.trim_end_matches('/'),
            settings.model
        );

        debug!(endpoint = %endpoint, timeout_secs = settings.timeout_secs, "Created Gemini image client");

        Ok(Self {
            client,
            api_key,
            model: settings.model.clone(),
            endpoint,
            mime_type: settings.mime_type.clone(),
            timeout_secs: settings.timeout_secs,
        })
    }

    /// Full URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Model name.
    pub fn model_name(&self) -> &str {
        &self.model
    }

    #[track_caller]
    fn transport_error(&self, err: reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::new(GenerationErrorKind::Timeout {
                seconds: self.timeout_secs,
            })
        } else {
            GenerationError::new(GenerationErrorKind::Unavailable(err.to_string()))
        }
    }
}

#[async_trait]
impl ImageGenerator for GeminiImageClient {
    #[instrument(skip(self, source_image, prompt), fields(model = %self.model, source_bytes = source_image.len()))]
    async fn generate(
        &self,
        source_image: &[u8],
        prompt: &str,
    ) -> Result<Vec<u8>, GenerationError> {
        let body =
            GenerateContentRequest::image_edit(prompt, &self.mime_type, STANDARD.encode(source_image));

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Gemini request failed");
                self.transport_error(e)
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read Gemini response body");
            self.transport_error(e)
        })?;

        if !status.is_success() {
            error!(status = %status, body = %text, "Gemini API error");
            return Err(GenerationError::new(GenerationErrorKind::HttpStatus {
                status_code: status.as_u16(),
                message: text,
            }));
        }

        match extract_inline_image(&text)? {
            Some(image) => {
                debug!(result_bytes = image.len(), "Received generated image");
                Ok(image)
            }
            None => {
                let explanation = extract_declined_text(&text);
                warn!(explanation = ?explanation, "Gemini returned no image data");
                Err(GenerationError::new(GenerationErrorKind::Declined(
                    explanation,
                )))
            }
        }
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }
}
