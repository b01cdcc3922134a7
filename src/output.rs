//! File naming plus loading and saving host images for the CLI host.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use image::ImageFormat;

use crate::codec::decode_host_image;
use crate::error::BananaError;
use crate::tensor::HostImage;

/// Generate an output filename from a prompt.
///
/// Sanitizes the first 50 characters of the prompt to kebab-case and
/// appends a unix timestamp and `.png`.
#[must_use]
pub fn auto_filename(prompt: &str) -> String {
    let sanitized = sanitize_for_filename(prompt, 50);
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
    format!("{sanitized}-{timestamp}.png")
}

/// Sanitize a string for use in a filename.
///
/// Converts to lowercase, replaces non-alphanumeric chars with hyphens,
/// collapses consecutive hyphens, and trims to max length.
#[must_use]
pub fn sanitize_for_filename(input: &str, max_len: usize) -> String {
    let mut result = String::with_capacity(max_len);
    let mut last_was_hyphen = true;

    for ch in input.chars() {
        if result.len() >= max_len {
            break;
        }
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            result.push('-');
            last_was_hyphen = true;
        }
    }

    while result.ends_with('-') {
        result.pop();
    }

    if result.is_empty() {
        "image".to_string()
    } else {
        result
    }
}

/// Resolve the output path: use explicit path or auto-generate.
#[must_use]
pub fn resolve_output_path(explicit: Option<&str>, prompt: &str) -> PathBuf {
    match explicit {
        Some(p) => PathBuf::from(p),
        None => PathBuf::from(auto_filename(prompt)),
    }
}

/// Output format implied by a path's extension; PNG when absent or unknown.
#[must_use]
pub fn format_for_path(path: &Path) -> ImageFormat {
    match ImageFormat::from_path(path) {
        Ok(format @ (ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::WebP)) => format,
        _ => ImageFormat::Png,
    }
}

/// Encode a host image and write it to `path`.
///
/// # Errors
///
/// Returns an error if the image cannot be encoded or the file written.
pub fn save_image(image: &HostImage, path: &Path) -> Result<(), BananaError> {
    let format = format_for_path(path);
    let mut dynamic = image.to_dynamic()?;
    if format == ImageFormat::Jpeg && dynamic.color().has_alpha() {
        dynamic = dynamic.to_rgb8().into();
    }
    dynamic.save_with_format(path, format).map_err(|e| {
        BananaError::ImageConversion(format!("Failed to save {}: {e}", path.display()))
    })
}

/// Read an image file into a host image.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded.
pub fn load_image(path: &Path) -> Result<HostImage, BananaError> {
    let bytes = std::fs::read(path).map_err(|e| {
        BananaError::Io(std::io::Error::new(e.kind(), format!("{}: {e}", path.display())))
    })?;
    decode_host_image(&bytes)
}
