//! Extraction of the generated image from an API response body.

use serde::Deserialize;

use crate::codec::decode_base64_payload;
use crate::error::{truncate_body, BananaError};
use crate::ports::{GenerationResponse, ImageFetcher};

/// Where the image bytes of a response live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePayload {
    /// The bytes were embedded in the response.
    Inline(Vec<u8>),
    /// The bytes must be downloaded from this URL.
    Url(String),
}

/// Work out which payload shape a response carries.
///
/// The first entry with inline data wins; otherwise the first URL is used.
/// A `data:` URL is decoded in place rather than fetched.
///
/// # Errors
///
/// Returns an API error if the body carries an `error` object, and an
/// unexpected-response error if it carries no image at all.
pub fn extract_payload(response: &GenerationResponse) -> Result<ImagePayload, BananaError> {
    let envelope: Envelope = serde_json::from_value(response.body.clone()).map_err(|e| {
        BananaError::UnexpectedResponse(format!(
            "Failed to parse response: {e}. Body: {}",
            preview(response)
        ))
    })?;

    if let Some(error) = envelope.error {
        return Err(BananaError::Api { status: 200, message: error.into_message() });
    }

    let data = envelope.data.unwrap_or_default();

    if let Some(b64) = data.iter().find_map(|d| d.b64_json.as_deref()) {
        return Ok(ImagePayload::Inline(decode_base64_payload(b64)?));
    }

    if let Some(url) = data.iter().find_map(|d| d.url.as_deref()) {
        if url.starts_with("data:") {
            return Ok(ImagePayload::Inline(decode_base64_payload(url)?));
        }
        return Ok(ImagePayload::Url(url.to_string()));
    }

    Err(BananaError::UnexpectedResponse(format!(
        "No image in response. Body: {}",
        preview(response)
    )))
}

/// Resolve a response to encoded image bytes, fetching once if it only
/// carries a URL.
///
/// # Errors
///
/// Returns any extraction or fetch failure.
pub async fn resolve_image_bytes(
    response: &GenerationResponse,
    fetcher: &dyn ImageFetcher,
) -> Result<Vec<u8>, BananaError> {
    match extract_payload(response)? {
        ImagePayload::Inline(bytes) => Ok(bytes),
        ImagePayload::Url(url) => {
            tracing::debug!(%url, "response carries an image URL; fetching");
            let fetched = fetcher.fetch(&url).await?;
            if fetched.data.is_empty() {
                return Err(BananaError::UnexpectedResponse(format!(
                    "Empty image downloaded from {url}"
                )));
            }
            Ok(fetched.data)
        }
    }
}

fn preview(response: &GenerationResponse) -> String {
    truncate_body(&response.body.to_string())
}

// --- API response envelope ---

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Vec<EnvelopeImage>>,
    #[serde(default)]
    error: Option<EnvelopeError>,
}

#[derive(Deserialize)]
struct EnvelopeImage {
    #[serde(default)]
    b64_json: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// `error` is either a bare string or an object carrying `message`.
#[derive(Deserialize)]
#[serde(untagged)]
enum EnvelopeError {
    Text(String),
    Detail { message: String },
    Other(serde_json::Value),
}

impl EnvelopeError {
    fn into_message(self) -> String {
        match self {
            EnvelopeError::Text(message) | EnvelopeError::Detail { message } => message,
            EnvelopeError::Other(value) => truncate_body(&value.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use crate::ports::image_fetcher::{FetchFuture, FetchedImage};

    struct CountingFetcher {
        calls: AtomicUsize,
    }

    impl ImageFetcher for CountingFetcher {
        fn fetch(&self, _url: &str) -> FetchFuture<'_> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Ok(FetchedImage { data: vec![9, 9], content_type: None }) })
        }
    }

    fn response(body: serde_json::Value) -> GenerationResponse {
        GenerationResponse { body }
    }

    #[test]
    fn inline_payload() {
        let payload = extract_payload(&response(json!({"data": [{"b64_json": "AQID"}]}))).unwrap();
        assert_eq!(payload, ImagePayload::Inline(vec![1, 2, 3]));
    }

    #[test]
    fn url_payload() {
        let payload =
            extract_payload(&response(json!({"data": [{"url": "https://cdn.test/a.png"}]})))
                .unwrap();
        assert_eq!(payload, ImagePayload::Url("https://cdn.test/a.png".into()));
    }

    #[test]
    fn inline_preferred_over_url() {
        let body = json!({"data": [{"url": "https://cdn.test/a.png"}, {"b64_json": "AQID"}]});
        assert_eq!(extract_payload(&response(body)).unwrap(), ImagePayload::Inline(vec![1, 2, 3]));
    }

    #[test]
    fn data_url_is_inline() {
        let body = json!({"data": [{"url": "data:image/png;base64,AQID"}]});
        assert_eq!(extract_payload(&response(body)).unwrap(), ImagePayload::Inline(vec![1, 2, 3]));
    }

    #[test]
    fn error_object_is_api_error() {
        let body = json!({"error": {"message": "quota exceeded"}});
        let err = extract_payload(&response(body)).unwrap_err();
        assert!(matches!(err, BananaError::Api { ref message, .. } if message == "quota exceeded"));
    }

    #[test]
    fn error_with_null_data_keeps_message() {
        let body = json!({"data": null, "error": {"message": "quota exceeded"}});
        let err = extract_payload(&response(body)).unwrap_err();
        assert_eq!(err.to_string(), "API error (200): quota exceeded");
    }

    #[test]
    fn string_error_keeps_message() {
        let err = extract_payload(&response(json!({"error": "invalid api key"}))).unwrap_err();
        assert_eq!(err.to_string(), "API error (200): invalid api key");
    }

    #[test]
    fn error_object_without_message_is_echoed() {
        let body = json!({"error": {"code": "rate_limited"}});
        let err = extract_payload(&response(body)).unwrap_err();
        let BananaError::Api { message, .. } = &err else {
            panic!("expected API error, got {err:?}");
        };
        assert!(message.contains("rate_limited"));
    }

    #[test]
    fn null_data_without_error_is_unexpected() {
        let err = extract_payload(&response(json!({"data": null}))).unwrap_err();
        assert!(err.to_string().contains("No image in response"));
    }

    #[test]
    fn empty_data_is_unexpected() {
        let err = extract_payload(&response(json!({"data": []}))).unwrap_err();
        assert!(err.to_string().contains("No image in response"));
    }

    #[test]
    fn non_object_body_is_unexpected() {
        let err = extract_payload(&response(json!("hello"))).unwrap_err();
        assert!(matches!(err, BananaError::UnexpectedResponse(_)));
    }

    #[tokio::test]
    async fn url_response_fetches_exactly_once() {
        let fetcher = CountingFetcher { calls: AtomicUsize::new(0) };
        let body = json!({"data": [{"url": "https://cdn.test/a.png"}]});
        let bytes = resolve_image_bytes(&response(body), &fetcher).await.unwrap();
        assert_eq!(bytes, vec![9, 9]);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn inline_response_never_fetches() {
        let fetcher = CountingFetcher { calls: AtomicUsize::new(0) };
        let body = json!({"data": [{"b64_json": "AQID"}]});
        resolve_image_bytes(&response(body), &fetcher).await.unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }
}
