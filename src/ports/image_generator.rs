//! Image generator port: one request in, one raw API response out.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::BananaError;
use crate::model::Model;
use crate::params::{AspectRatio, ImageSize};

/// A fully normalized generation request.
///
/// The serialized form is exactly the JSON body posted to the API. The
/// credential is carried alongside but never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The text prompt.
    pub prompt: String,
    /// The model SKU.
    pub model: Model,
    /// Requested aspect ratio.
    pub aspect_ratio: AspectRatio,
    /// Output size; only present for models that support it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_size: Option<ImageSize>,
    /// Fixed seed; absent means the server picks one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    /// Base64 PNG reference images, primary first.
    #[serde(rename = "image", default, skip_serializing_if = "Vec::is_empty")]
    pub reference_images: Vec<String>,
    /// Bearer credential for this call only.
    #[serde(skip)]
    pub api_key: String,
}

/// The raw JSON body of a successful API response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationResponse {
    /// Parsed response body, left uninterpreted.
    pub body: serde_json::Value,
}

/// Boxed future type returned by [`ImageGenerator::generate`].
pub type GenerateFuture<'a> =
    Pin<Box<dyn Future<Output = Result<GenerationResponse, BananaError>> + Send + 'a>>;

/// Submits generation requests to the remote API.
pub trait ImageGenerator: Send + Sync {
    /// Send the request and return the raw response body.
    fn generate(&self, request: &GenerationRequest) -> GenerateFuture<'_>;
}
