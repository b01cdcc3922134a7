//! Unified error types for the Nano Banana nodes.

use thiserror::Error;

/// Maximum number of response body characters echoed back in error messages.
const BODY_PREVIEW_CHARS: usize = 500;

/// Errors that can occur while preparing, sending, or decoding a generation.
#[derive(Debug, Error)]
pub enum BananaError {
    /// The API returned a non-success status or an error payload.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message or body returned by the API.
        message: String,
    },

    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered successfully but the body had no usable image.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Image encoding, decoding, or tensor conversion error.
    #[error("Image conversion error: {0}")]
    ImageConversion(String),

    /// A recorded interaction could not be replayed, or replayed an error.
    #[error("Replay error: {0}")]
    Replay(String),

    /// No API key was supplied.
    #[error("No API key. Pass --api-key, set {env_var}, or add it to the config file.")]
    MissingApiKey {
        /// The environment variable name.
        env_var: String,
    },

    /// A node invocation failed.
    #[error(transparent)]
    Node(#[from] NodeError),
}

/// The single failure a node reports back to its host.
///
/// Every internal [`BananaError`] is flattened into this shape at the node
/// boundary, so the host only ever sees one message per failed invocation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{node} failed: {message}")]
pub struct NodeError {
    /// Display name of the failing node.
    pub node: &'static str,
    /// Human-readable description of the underlying failure.
    pub message: String,
}

impl NodeError {
    /// Wrap an internal error for the given node.
    #[must_use]
    pub fn new(node: &'static str, source: &BananaError) -> Self {
        Self { node, message: source.to_string() }
    }
}

/// Shorten a response body for inclusion in an error message.
pub(crate) fn truncate_body(body: &str) -> String {
    if body.chars().count() > BODY_PREVIEW_CHARS {
        let head: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_error_message_names_node() {
        let err = NodeError::new(
            "Nano Banana Text-to-Image",
            &BananaError::Api { status: 503, message: "busy".into() },
        );
        assert_eq!(err.to_string(), "Nano Banana Text-to-Image failed: API error (503): busy");
    }

    #[test]
    fn node_error_is_transparent_in_banana_error() {
        let err: BananaError = NodeError { node: "X", message: "boom".into() }.into();
        assert_eq!(err.to_string(), "X failed: boom");
    }

    #[test]
    fn truncate_short_body_unchanged() {
        assert_eq!(truncate_body("{}"), "{}");
    }

    #[test]
    fn truncate_long_body() {
        let body = "é".repeat(600);
        let out = truncate_body(&body);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), BODY_PREVIEW_CHARS + 3);
    }
}
