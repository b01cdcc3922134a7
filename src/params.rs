//! UI-level parameters and their normalization into API requests.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Model;
use crate::ports::GenerationRequest;

/// Output aspect ratios offered by both nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 1:1
    #[default]
    #[serde(rename = "1:1")]
    Square,
    /// 4:3
    #[serde(rename = "4:3")]
    Landscape4x3,
    /// 3:4
    #[serde(rename = "3:4")]
    Portrait3x4,
    /// 16:9
    #[serde(rename = "16:9")]
    Landscape16x9,
    /// 9:16
    #[serde(rename = "9:16")]
    Portrait9x16,
    /// 2:3
    #[serde(rename = "2:3")]
    Portrait2x3,
    /// 3:2
    #[serde(rename = "3:2")]
    Landscape3x2,
    /// 4:5
    #[serde(rename = "4:5")]
    Portrait4x5,
    /// 5:4
    #[serde(rename = "5:4")]
    Landscape5x4,
    /// 21:9
    #[serde(rename = "21:9")]
    Ultrawide21x9,
}

impl AspectRatio {
    /// All ratios, in the order the nodes list them.
    pub const ALL: [AspectRatio; 10] = [
        AspectRatio::Square,
        AspectRatio::Landscape4x3,
        AspectRatio::Portrait3x4,
        AspectRatio::Landscape16x9,
        AspectRatio::Portrait9x16,
        AspectRatio::Portrait2x3,
        AspectRatio::Landscape3x2,
        AspectRatio::Portrait4x5,
        AspectRatio::Landscape5x4,
        AspectRatio::Ultrawide21x9,
    ];

    /// The ratio string sent on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Landscape4x3 => "4:3",
            AspectRatio::Portrait3x4 => "3:4",
            AspectRatio::Landscape16x9 => "16:9",
            AspectRatio::Portrait9x16 => "9:16",
            AspectRatio::Portrait2x3 => "2:3",
            AspectRatio::Landscape3x2 => "3:2",
            AspectRatio::Portrait4x5 => "4:5",
            AspectRatio::Landscape5x4 => "5:4",
            AspectRatio::Ultrawide21x9 => "21:9",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output resolution tier. Only forwarded for the pro model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSize {
    /// 1K
    #[serde(rename = "1K")]
    OneK,
    /// 2K
    #[default]
    #[serde(rename = "2K")]
    TwoK,
    /// 4K
    #[serde(rename = "4K")]
    FourK,
}

impl ImageSize {
    /// All sizes, smallest first.
    pub const ALL: [ImageSize; 3] = [ImageSize::OneK, ImageSize::TwoK, ImageSize::FourK];

    /// The size string sent on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ImageSize::OneK => "1K",
            ImageSize::TwoK => "2K",
            ImageSize::FourK => "4K",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentinel seed value meaning "let the server choose".
pub const RANDOM_SEED: i64 = -1;

/// Largest seed the nodes accept.
pub const MAX_SEED: i64 = 2_147_483_647;

/// Parse an aspect ratio string.
///
/// # Errors
///
/// Returns an error if the ratio is not one of the ten supported values.
pub fn validate_aspect_ratio(ratio: &str) -> Result<AspectRatio, String> {
    AspectRatio::ALL.into_iter().find(|r| r.as_str() == ratio).ok_or_else(|| {
        let valid: Vec<&str> = AspectRatio::ALL.iter().map(|r| r.as_str()).collect();
        format!("Unsupported aspect ratio '{ratio}'. Valid: {valid:?}")
    })
}

/// Parse an image size string.
///
/// # Errors
///
/// Returns an error if the size is not recognized.
pub fn validate_image_size(size: &str) -> Result<ImageSize, String> {
    ImageSize::ALL
        .into_iter()
        .find(|s| s.as_str() == size)
        .ok_or_else(|| format!("Unsupported image size '{size}'. Valid: 1K, 2K, 4K"))
}

/// Field values as a node receives them from its host form.
#[derive(Debug, Clone)]
pub struct UiParams {
    /// Prompt text.
    pub prompt: String,
    /// Bearer credential for the API.
    pub api_key: String,
    /// Selected model.
    pub model: Model,
    /// Selected aspect ratio.
    pub aspect_ratio: AspectRatio,
    /// Selected size; ignored unless the model supports it.
    pub image_size: ImageSize,
    /// Seed, or [`RANDOM_SEED`] (any negative value) for server-chosen.
    pub seed: i64,
}

/// `image_size` as forwarded to the API for the given model.
#[must_use]
pub fn normalize_image_size(model: Model, size: ImageSize) -> Option<ImageSize> {
    model.supports_image_size().then_some(size)
}

/// `seed` as forwarded to the API; negative values are dropped.
#[must_use]
pub fn normalize_seed(seed: i64) -> Option<i64> {
    (seed >= 0).then_some(seed)
}

/// Turn UI field values and already-encoded reference images into a request.
#[must_use]
pub fn normalize(ui: UiParams, reference_images: Vec<String>) -> GenerationRequest {
    GenerationRequest {
        image_size: normalize_image_size(ui.model, ui.image_size),
        seed: normalize_seed(ui.seed),
        prompt: ui.prompt,
        model: ui.model,
        aspect_ratio: ui.aspect_ratio,
        reference_images,
        api_key: ui.api_key,
    }
}
