//! Image fetcher port for responses that return a URL instead of inline data.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::BananaError;

/// Bytes downloaded from an image URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedImage {
    /// Raw encoded image bytes.
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    /// `Content-Type` reported by the server, if any.
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Boxed future type returned by [`ImageFetcher::fetch`].
pub type FetchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<FetchedImage, BananaError>> + Send + 'a>>;

/// Downloads a generated image by URL.
pub trait ImageFetcher: Send + Sync {
    /// Fetch the image at `url`.
    fn fetch(&self, url: &str) -> FetchFuture<'_>;
}

/// Serde helper for serializing `Vec<u8>` as base64 strings in cassettes.
mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}
