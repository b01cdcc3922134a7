//! Text-to-image node.

use super::{common_inputs, node_outcome, prompt_preview, run_pipeline, seed_input};
use super::{InputKind, InputSpec, NodeDescriptor, CATEGORY};
use crate::context::ServiceContext;
use crate::error::NodeError;
use crate::model::Model;
use crate::params::{normalize, AspectRatio, ImageSize, UiParams, RANDOM_SEED};
use crate::tensor::HostImage;

const DEFAULT_PROMPT: &str = "a beautiful sunset over mountains";

/// Form inputs of the text-to-image node.
#[derive(Debug, Clone)]
pub struct TextToImageInputs {
    /// Prompt text.
    pub prompt: String,
    /// Bearer credential.
    pub api_key: String,
    /// Model variant.
    pub model: Model,
    /// Output aspect ratio.
    pub aspect_ratio: AspectRatio,
    /// Output size; only used by the pro variant.
    pub image_size: ImageSize,
    /// Seed, `-1` for random.
    pub seed: i64,
}

impl Default for TextToImageInputs {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            api_key: String::new(),
            model: Model::default(),
            aspect_ratio: AspectRatio::default(),
            image_size: ImageSize::default(),
            seed: RANDOM_SEED,
        }
    }
}

/// Generates an image from a prompt alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextToImage;

impl TextToImage {
    /// Registration class name.
    pub const CLASS_NAME: &'static str = "NanoBananaTextToImage";
    /// Name shown to users and used in failure messages.
    pub const DISPLAY_NAME: &'static str = "Nano Banana Text-to-Image";

    /// Host-facing description of this node.
    #[must_use]
    pub fn descriptor() -> NodeDescriptor {
        let mut inputs = vec![InputSpec::required(
            "prompt",
            InputKind::String { multiline: true, default: DEFAULT_PROMPT },
        )];
        inputs.extend(common_inputs());
        inputs.push(seed_input());

        NodeDescriptor {
            class_name: Self::CLASS_NAME,
            display_name: Self::DISPLAY_NAME,
            category: CATEGORY,
            inputs,
            return_types: vec!["IMAGE"],
            return_names: vec!["image"],
        }
    }

    /// Run the node once.
    ///
    /// # Errors
    ///
    /// Any failure along the pipeline is returned as a single [`NodeError`].
    pub async fn generate_image(
        &self,
        ctx: &ServiceContext,
        inputs: TextToImageInputs,
    ) -> Result<HostImage, NodeError> {
        tracing::info!(
            prompt = %prompt_preview(&inputs.prompt),
            model = %inputs.model,
            aspect_ratio = %inputs.aspect_ratio,
            image_size = %inputs.image_size,
            "{}",
            Self::DISPLAY_NAME
        );

        let request = normalize(
            UiParams {
                prompt: inputs.prompt,
                api_key: inputs.api_key,
                model: inputs.model,
                aspect_ratio: inputs.aspect_ratio,
                image_size: inputs.image_size,
                seed: inputs.seed,
            },
            Vec::new(),
        );

        node_outcome(Self::DISPLAY_NAME, run_pipeline(ctx, &request).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::testing::{fake_context, solid, Reply};

    fn inputs(model: Model, image_size: ImageSize, seed: i64) -> TextToImageInputs {
        TextToImageInputs {
            prompt: "a lighthouse at dusk".into(),
            api_key: "sk-test".into(),
            model,
            aspect_ratio: AspectRatio::Landscape16x9,
            image_size,
            seed,
        }
    }

    #[test]
    fn defaults_match_form() {
        let defaults = TextToImageInputs::default();
        assert_eq!(defaults.prompt, DEFAULT_PROMPT);
        assert_eq!(defaults.model, Model::NanoBananaProSvip);
        assert_eq!(defaults.aspect_ratio, AspectRatio::Square);
        assert_eq!(defaults.image_size, ImageSize::TwoK);
        assert_eq!(defaults.seed, -1);
    }

    #[tokio::test]
    async fn pro_model_forwards_image_size() {
        let (ctx, calls) = fake_context(Reply::Inline(solid(8, 4, 0.5)));
        TextToImage
            .generate_image(&ctx, inputs(Model::NanoBananaProSvip, ImageSize::FourK, -1))
            .await
            .unwrap();

        let body = serde_json::to_value(calls.last_request()).unwrap();
        assert_eq!(body["image_size"], "4K");
        assert_eq!(body["model"], "nano-banana-pro-svip");
        assert_eq!(body["aspect_ratio"], "16:9");
        assert!(body.get("seed").is_none());
        assert!(body.get("image").is_none());
    }

    #[tokio::test]
    async fn standard_model_never_forwards_image_size() {
        for size in ImageSize::ALL {
            let (ctx, calls) = fake_context(Reply::Inline(solid(2, 2, 0.5)));
            TextToImage
                .generate_image(&ctx, inputs(Model::NanoBananaSvip, size, -1))
                .await
                .unwrap();
            let body = serde_json::to_value(calls.last_request()).unwrap();
            assert!(body.get("image_size").is_none());
        }
    }

    #[tokio::test]
    async fn explicit_seed_is_forwarded_exactly() {
        let (ctx, calls) = fake_context(Reply::Inline(solid(2, 2, 0.5)));
        TextToImage
            .generate_image(&ctx, inputs(Model::NanoBananaSvip, ImageSize::OneK, 987_654))
            .await
            .unwrap();
        let body = serde_json::to_value(calls.last_request()).unwrap();
        assert_eq!(body["seed"], 987_654);
    }

    #[tokio::test]
    async fn api_key_travels_with_request() {
        let (ctx, calls) = fake_context(Reply::Inline(solid(2, 2, 0.5)));
        TextToImage
            .generate_image(&ctx, inputs(Model::NanoBananaSvip, ImageSize::OneK, -1))
            .await
            .unwrap();
        assert_eq!(calls.last_request().api_key, "sk-test");
    }

    #[tokio::test]
    async fn inline_response_returns_image_with_its_dimensions() {
        let (ctx, calls) = fake_context(Reply::Inline(solid(12, 7, 0.25)));
        let image = TextToImage
            .generate_image(&ctx, inputs(Model::NanoBananaProSvip, ImageSize::TwoK, -1))
            .await
            .unwrap();
        assert_eq!((image.width(), image.height(), image.channels()), (12, 7, 3));
        assert_eq!(calls.fetch_count(), 0);
    }

    #[tokio::test]
    async fn url_response_fetches_once() {
        let (ctx, calls) = fake_context(Reply::Url(solid(5, 9, 1.0)));
        let image = TextToImage
            .generate_image(&ctx, inputs(Model::NanoBananaProSvip, ImageSize::TwoK, -1))
            .await
            .unwrap();
        assert_eq!((image.width(), image.height()), (5, 9));
        assert_eq!(calls.fetch_count(), 1);
    }

    #[tokio::test]
    async fn api_failure_is_single_node_error() {
        let (ctx, calls) = fake_context(Reply::Status(502));
        let err = TextToImage
            .generate_image(&ctx, inputs(Model::NanoBananaProSvip, ImageSize::TwoK, -1))
            .await
            .unwrap_err();
        assert_eq!(err.node, TextToImage::DISPLAY_NAME);
        assert_eq!(
            err.to_string(),
            "Nano Banana Text-to-Image failed: API error (502): upstream unavailable"
        );
        assert_eq!(calls.fetch_count(), 0);
    }
}
