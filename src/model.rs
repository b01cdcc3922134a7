//! Model SKUs and alias resolution.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The Nano Banana model variants offered by the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Model {
    /// Pro variant; the only one that accepts an explicit output size.
    #[default]
    #[serde(rename = "nano-banana-pro-svip")]
    NanoBananaProSvip,
    /// Standard variant.
    #[serde(rename = "nano-banana-svip")]
    NanoBananaSvip,
}

impl Model {
    /// All variants, in the order the nodes offer them.
    pub const ALL: [Model; 2] = [Model::NanoBananaProSvip, Model::NanoBananaSvip];

    /// The SKU string sent on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Model::NanoBananaProSvip => "nano-banana-pro-svip",
            Model::NanoBananaSvip => "nano-banana-svip",
        }
    }

    /// Whether the API honours `image_size` for this variant.
    #[must_use]
    pub fn supports_image_size(self) -> bool {
        matches!(self, Model::NanoBananaProSvip)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short name aliases accepted by the CLI and config file.
const ALIASES: &[(&str, &str)] = &[
    ("pro", "nano-banana-pro-svip"),
    ("nano-banana-pro", "nano-banana-pro-svip"),
    ("standard", "nano-banana-svip"),
    ("nano-banana", "nano-banana-svip"),
];

/// Resolve a model name (alias or exact) to the full SKU string.
#[must_use]
pub fn resolve_model(name: &str) -> String {
    for &(alias, full) in ALIASES {
        if name == alias {
            return full.to_string();
        }
    }
    name.to_string()
}

/// Parse a model name or alias into a [`Model`].
///
/// # Errors
///
/// Returns an error if the name doesn't match a known SKU or alias.
pub fn parse_model(name: &str) -> Result<Model, String> {
    let resolved = resolve_model(name);
    Model::ALL.into_iter().find(|m| m.as_str() == resolved).ok_or_else(|| {
        let valid: Vec<&str> = Model::ALL.iter().map(|m| m.as_str()).collect();
        format!("Unknown model '{name}'. Valid: {valid:?}")
    })
}
