//! Image-to-image node: a prompt conditioned on up to six reference images.

use super::{common_inputs, node_outcome, prompt_preview, run_pipeline, seed_input};
use super::{InputKind, InputSpec, NodeDescriptor, CATEGORY};
use crate::codec::encode_reference_images;
use crate::context::ServiceContext;
use crate::error::{BananaError, NodeError};
use crate::model::Model;
use crate::params::{normalize, AspectRatio, ImageSize, UiParams, RANDOM_SEED};
use crate::ports::GenerationRequest;
use crate::tensor::HostImage;

const DEFAULT_PROMPT: &str = "transform this into a watercolor painting";

/// Optional reference slots after the primary image (`image_2` ..= `image_6`).
pub const MAX_ADDITIONAL_IMAGES: usize = 5;

const SLOT_NAMES: [&str; MAX_ADDITIONAL_IMAGES] =
    ["image_2", "image_3", "image_4", "image_5", "image_6"];

/// Form inputs of the image-to-image node.
#[derive(Debug, Clone)]
pub struct ImageToImageInputs {
    /// Primary reference image.
    pub image: HostImage,
    /// Optional slots `image_2` through `image_6`; empty slots are skipped.
    pub additional: [Option<HostImage>; MAX_ADDITIONAL_IMAGES],
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

impl ImageToImageInputs {
    /// Inputs with the form defaults around a primary image.
    #[must_use]
    pub fn new(image: HostImage) -> Self {
        Self {
            image,
            additional: Default::default(),
            prompt: DEFAULT_PROMPT.to_string(),
            api_key: String::new(),
            model: Model::default(),
            aspect_ratio: AspectRatio::default(),
            image_size: ImageSize::default(),
            seed: RANDOM_SEED,
        }
    }

    /// Fill the optional slots in order from a list of extra images.
    ///
    /// # Errors
    ///
    /// Returns an error if more than [`MAX_ADDITIONAL_IMAGES`] are given.
    pub fn with_additional(mut self, images: Vec<HostImage>) -> Result<Self, BananaError> {
        if images.len() > MAX_ADDITIONAL_IMAGES {
            return Err(BananaError::InvalidArgument(format!(
                "At most {} reference images are supported, got {}",
                MAX_ADDITIONAL_IMAGES + 1,
                images.len() + 1
            )));
        }
        for (slot, image) in self.additional.iter_mut().zip(images) {
            *slot = Some(image);
        }
        Ok(self)
    }

    /// Primary image first, then filled slots in ascending order.
    #[must_use]
    pub fn reference_images(&self) -> Vec<&HostImage> {
        std::iter::once(&self.image).chain(self.additional.iter().flatten()).collect()
    }
}

/// Generates an image from a prompt and reference images.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageToImage;

impl ImageToImage {
    /// Registration class name.
    pub const CLASS_NAME: &'static str = "NanoBananaImageToImage";
    /// Name shown to users and used in failure messages.
    pub const DISPLAY_NAME: &'static str = "Nano Banana Image-to-Image";

    /// Host-facing description of this node.
    #[must_use]
    pub fn descriptor() -> NodeDescriptor {
        let mut inputs = vec![
            InputSpec::required("image", InputKind::Image),
            InputSpec::required(
                "prompt",
                InputKind::String { multiline: true, default: DEFAULT_PROMPT },
            ),
        ];
        inputs.extend(common_inputs());
        inputs.extend(
            SLOT_NAMES.into_iter().map(|name| InputSpec::optional(name, InputKind::Image)),
        );
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
    /// Any failure along the pipeline, including reference encoding, is
    /// returned as a single [`NodeError`].
    pub async fn generate_image(
        &self,
        ctx: &ServiceContext,
        inputs: ImageToImageInputs,
    ) -> Result<HostImage, NodeError> {
        let references = inputs.reference_images();
        tracing::info!(
            prompt = %prompt_preview(&inputs.prompt),
            model = %inputs.model,
            aspect_ratio = %inputs.aspect_ratio,
            image_size = %inputs.image_size,
            references = references.len(),
            "{}",
            Self::DISPLAY_NAME
        );
        for (idx, image) in references.iter().enumerate() {
            tracing::info!("  reference {}: {}x{}", idx + 1, image.width(), image.height());
        }

        let result = async {
            let request = build_request(inputs)?;
            run_pipeline(ctx, &request).await
        }
        .await;

        node_outcome(Self::DISPLAY_NAME, result)
    }
}

/// Encode the references and normalize the form into a request.
fn build_request(inputs: ImageToImageInputs) -> Result<GenerationRequest, BananaError> {
    let encoded = encode_reference_images(inputs.reference_images())?;
    Ok(normalize(
        UiParams {
            prompt: inputs.prompt,
            api_key: inputs.api_key,
            model: inputs.model,
            aspect_ratio: inputs.aspect_ratio,
            image_size: inputs.image_size,
            seed: inputs.seed,
        },
        encoded,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_base64_payload, decode_host_image};
    use crate::nodes::testing::{fake_context, solid, Reply};

    fn widths(encoded: &[String]) -> Vec<u32> {
        encoded
            .iter()
            .map(|e| decode_host_image(&decode_base64_payload(e).unwrap()).unwrap().width())
            .collect()
    }

    #[test]
    fn build_request_encodes_primary_then_slots() {
        let extra = vec![solid(4, 1, 0.0), solid(5, 1, 0.0)];
        let mut inputs =
            ImageToImageInputs::new(solid(2, 1, 0.0)).with_additional(extra).unwrap();
        inputs.model = Model::NanoBananaSvip;
        let request = build_request(inputs).unwrap();
        assert_eq!(widths(&request.reference_images), vec![2, 4, 5]);
        assert_eq!(request.image_size, None);
        assert_eq!(request.seed, None);
    }

    #[test]
    fn primary_only_reference_list() {
        let inputs = ImageToImageInputs::new(solid(1, 1, 0.0));
        assert_eq!(inputs.reference_images().len(), 1);
    }

    #[test]
    fn empty_slots_are_skipped_in_order() {
        let mut inputs = ImageToImageInputs::new(solid(1, 1, 0.0));
        inputs.additional[1] = Some(solid(3, 1, 0.0));
        inputs.additional[4] = Some(solid(6, 1, 0.0));
        let widths: Vec<u32> = inputs.reference_images().iter().map(|i| i.width()).collect();
        assert_eq!(widths, vec![1, 3, 6]);
    }

    #[test]
    fn with_additional_rejects_too_many() {
        let extra = vec![solid(1, 1, 0.0); MAX_ADDITIONAL_IMAGES + 1];
        let err = ImageToImageInputs::new(solid(1, 1, 0.0)).with_additional(extra).unwrap_err();
        assert!(err.to_string().contains("At most 6 reference images"));
    }

    #[test]
    fn descriptor_lists_optional_slots() {
        let descriptor = ImageToImage::descriptor();
        let optional: Vec<&str> =
            descriptor.inputs.iter().filter(|i| !i.required).map(|i| i.name).collect();
        assert_eq!(optional, vec!["image_2", "image_3", "image_4", "image_5", "image_6", "seed"]);
        assert_eq!(descriptor.inputs[0].kind, InputKind::Image);
    }

    #[tokio::test]
    async fn every_slot_count_sends_k_plus_one_images_in_order() {
        for k in 0..=MAX_ADDITIONAL_IMAGES {
            let extra: Vec<HostImage> = (0..k).map(|i| solid(i as u32 + 2, 1, 0.5)).collect();
            let inputs = ImageToImageInputs::new(solid(1, 1, 0.5)).with_additional(extra).unwrap();
            let (ctx, calls) = fake_context(Reply::Inline(solid(4, 4, 0.5)));

            ImageToImage.generate_image(&ctx, inputs).await.unwrap();

            let request = calls.last_request();
            assert_eq!(request.reference_images.len(), k + 1);
            let expected: Vec<u32> = (1..=k as u32 + 1).collect();
            assert_eq!(widths(&request.reference_images), expected);
        }
    }

    #[tokio::test]
    async fn normalization_applies_to_image_to_image() {
        let mut inputs = ImageToImageInputs::new(solid(2, 2, 0.5));
        inputs.model = Model::NanoBananaSvip;
        inputs.image_size = ImageSize::FourK;
        inputs.seed = 5;
        let (ctx, calls) = fake_context(Reply::Inline(solid(4, 4, 0.5)));

        ImageToImage.generate_image(&ctx, inputs).await.unwrap();

        let body = serde_json::to_value(calls.last_request()).unwrap();
        assert!(body.get("image_size").is_none());
        assert_eq!(body["seed"], 5);
        assert_eq!(body["image"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn round_trip_preserves_dimensions() {
        let primary = solid(16, 9, 0.75);
        let (ctx, _calls) = fake_context(Reply::Inline(primary.clone()));
        let out =
            ImageToImage.generate_image(&ctx, ImageToImageInputs::new(primary)).await.unwrap();
        assert_eq!((out.width(), out.height()), (16, 9));
    }

    #[tokio::test]
    async fn url_response_fetches_once() {
        let (ctx, calls) = fake_context(Reply::Url(solid(3, 3, 0.0)));
        ImageToImage
            .generate_image(&ctx, ImageToImageInputs::new(solid(2, 2, 0.5)))
            .await
            .unwrap();
        assert_eq!(calls.fetch_count(), 1);
    }

    #[tokio::test]
    async fn failure_returns_no_image() {
        let (ctx, _calls) = fake_context(Reply::Status(500));
        let err = ImageToImage
            .generate_image(&ctx, ImageToImageInputs::new(solid(2, 2, 0.5)))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Nano Banana Image-to-Image failed: API error (500)"));
    }
}
