//! The two generation nodes and their host-facing descriptors.
//!
//! A node takes its form inputs, runs the generation pipeline once, and
//! returns exactly one [`HostImage`] or one [`NodeError`].

pub mod image_to_image;
pub mod text_to_image;

use serde::Serialize;

pub use image_to_image::{ImageToImage, ImageToImageInputs, MAX_ADDITIONAL_IMAGES};
pub use text_to_image::{TextToImage, TextToImageInputs};

use crate::codec::decode_host_image;
use crate::context::ServiceContext;
use crate::error::{BananaError, NodeError};
use crate::model::Model;
use crate::params::{AspectRatio, ImageSize, MAX_SEED, RANDOM_SEED};
use crate::ports::GenerationRequest;
use crate::response::resolve_image_bytes;
use crate::tensor::HostImage;

/// Category both nodes are listed under.
pub const CATEGORY: &str = "o1key";

/// Kind and constraints of one node input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputKind {
    /// A host image tensor.
    Image,
    /// Free text.
    String {
        /// Whether the host should render a multi-line editor.
        multiline: bool,
        /// Initial value.
        default: &'static str,
    },
    /// One of a fixed list of strings.
    Choice {
        /// Allowed values, in display order.
        options: Vec<&'static str>,
        /// Initial value.
        default: &'static str,
    },
    /// A bounded integer.
    Int {
        /// Initial value.
        default: i64,
        /// Smallest accepted value.
        min: i64,
        /// Largest accepted value.
        max: i64,
    },
}

/// One named input of a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputSpec {
    /// Field name.
    pub name: &'static str,
    /// Whether the host must supply it.
    pub required: bool,
    /// Field kind and constraints.
    #[serde(flatten)]
    pub kind: InputKind,
}

impl InputSpec {
    fn required(name: &'static str, kind: InputKind) -> Self {
        Self { name, required: true, kind }
    }

    fn optional(name: &'static str, kind: InputKind) -> Self {
        Self { name, required: false, kind }
    }
}

/// Everything a host needs to list and wire a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDescriptor {
    /// Stable class name used for registration.
    pub class_name: &'static str,
    /// Name shown in the host UI.
    pub display_name: &'static str,
    /// Menu category.
    pub category: &'static str,
    /// Inputs in declaration order.
    pub inputs: Vec<InputSpec>,
    /// Output types.
    pub return_types: Vec<&'static str>,
    /// Output names.
    pub return_names: Vec<&'static str>,
}

/// Descriptors for every node this crate provides.
#[must_use]
pub fn registry() -> Vec<NodeDescriptor> {
    vec![TextToImage::descriptor(), ImageToImage::descriptor()]
}

/// Inputs shared by both nodes, after the prompt.
fn common_inputs() -> Vec<InputSpec> {
    vec![
        InputSpec::required("api_key", InputKind::String { multiline: false, default: "" }),
        InputSpec::required(
            "model",
            InputKind::Choice {
                options: Model::ALL.iter().map(|m| m.as_str()).collect(),
                default: Model::default().as_str(),
            },
        ),
        InputSpec::required(
            "aspect_ratio",
            InputKind::Choice {
                options: AspectRatio::ALL.iter().map(|r| r.as_str()).collect(),
                default: AspectRatio::default().as_str(),
            },
        ),
        InputSpec::required(
            "image_size",
            InputKind::Choice {
                options: ImageSize::ALL.iter().map(|s| s.as_str()).collect(),
                default: ImageSize::default().as_str(),
            },
        ),
    ]
}

fn seed_input() -> InputSpec {
    InputSpec::optional(
        "seed",
        InputKind::Int { default: RANDOM_SEED, min: RANDOM_SEED, max: MAX_SEED },
    )
}

/// Run one request through the API and decode the result.
async fn run_pipeline(
    ctx: &ServiceContext,
    request: &GenerationRequest,
) -> Result<HostImage, BananaError> {
    tracing::debug!(
        model = %request.model,
        aspect_ratio = %request.aspect_ratio,
        image_size = ?request.image_size,
        seed = ?request.seed,
        references = request.reference_images.len(),
        "sending generation request"
    );
    let response = ctx.generator.generate(request).await?;
    let bytes = resolve_image_bytes(&response, ctx.fetcher.as_ref()).await?;
    let image = decode_host_image(&bytes)?;
    tracing::debug!(width = image.width(), height = image.height(), "decoded generated image");
    Ok(image)
}

/// Log the outcome of a node run and flatten any failure into a [`NodeError`].
fn node_outcome(
    node: &'static str,
    result: Result<HostImage, BananaError>,
) -> Result<HostImage, NodeError> {
    match result {
        Ok(image) => {
            tracing::info!(width = image.width(), height = image.height(), "image generated");
            Ok(image)
        }
        Err(e) => {
            let err = NodeError::new(node, &e);
            tracing::error!("{err}");
            Err(err)
        }
    }
}

/// First 80 characters of a prompt, with an ellipsis if cut.
fn prompt_preview(prompt: &str) -> String {
    if prompt.chars().count() > 80 {
        let head: String = prompt.chars().take(80).collect();
        format!("{head}...")
    } else {
        prompt.to_string()
    }
}
