//! Live adapter for the Nano Banana image generation API.

use reqwest::Client;

use crate::error::{truncate_body, BananaError};
use crate::ports::image_fetcher::{FetchFuture, FetchedImage, ImageFetcher};
use crate::ports::image_generator::{
    GenerateFuture, GenerationRequest, GenerationResponse, ImageGenerator,
};

/// Default generation endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.o1key.com/v1/images/generations";

/// Live client that posts generation requests and downloads image URLs.
///
/// Holds no credentials; the bearer key travels with each request.
#[derive(Clone)]
pub struct BananaClient {
    client: Client,
    endpoint: String,
}

impl BananaClient {
    /// Create a client posting to the given endpoint.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { client: Client::new(), endpoint: endpoint.into() }
    }
}

impl ImageGenerator for BananaClient {
    fn generate(&self, request: &GenerationRequest) -> GenerateFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let mut call = self.client.post(&self.endpoint).json(&request);
            if !request.api_key.is_empty() {
                call = call.bearer_auth(&request.api_key);
            }

            let response = call.send().await?;
            let status = response.status();
            let response_text = response.text().await?;

            if !status.is_success() {
                return Err(BananaError::Api {
                    status: status.as_u16(),
                    message: truncate_body(&response_text),
                });
            }

            let body = serde_json::from_str(&response_text).map_err(|e| {
                BananaError::UnexpectedResponse(format!(
                    "Failed to parse response: {e}. Body: {}",
                    truncate_body(&response_text)
                ))
            })?;

            Ok(GenerationResponse { body })
        })
    }
}

impl ImageFetcher for BananaClient {
    fn fetch(&self, url: &str) -> FetchFuture<'_> {
        let url = url.to_string();
        Box::pin(async move {
            let response = self.client.get(&url).send().await?;
            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(BananaError::Api {
                    status: status.as_u16(),
                    message: format!("Failed to download {url}: {}", truncate_body(&text)),
                });
            }

            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let data = response.bytes().await?.to_vec();

            Ok(FetchedImage { data, content_type })
        })
    }
}
