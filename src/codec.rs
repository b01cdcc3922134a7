//! Conversion between host tensors and the encoded bytes the API exchanges.

use std::io::Cursor;

use base64::Engine;
use image::ImageFormat;

use crate::error::BananaError;
use crate::tensor::HostImage;

/// Encode one host image as base64 PNG.
///
/// # Errors
///
/// Returns an error if the tensor cannot be converted or PNG encoding fails.
pub fn encode_host_image(image: &HostImage) -> Result<String, BananaError> {
    let dynamic = image.to_dynamic()?;
    let mut buf = Cursor::new(Vec::new());
    dynamic
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| BananaError::ImageConversion(format!("Failed to encode PNG: {e}")))?;
    Ok(base64::engine::general_purpose::STANDARD.encode(buf.into_inner()))
}

/// Encode reference images independently, preserving their order.
///
/// # Errors
///
/// Returns the first encoding failure.
pub fn encode_reference_images<'a, I>(images: I) -> Result<Vec<String>, BananaError>
where
    I: IntoIterator<Item = &'a HostImage>,
{
    images.into_iter().map(encode_host_image).collect()
}

/// Decode PNG/JPEG/WebP bytes into an RGB host image.
///
/// # Errors
///
/// Returns an error if the bytes are not a recognizable image.
pub fn decode_host_image(bytes: &[u8]) -> Result<HostImage, BananaError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| BananaError::ImageConversion(format!("Failed to decode image: {e}")))?;
    Ok(HostImage::from_dynamic(&img))
}

/// Decode a base64 payload, tolerating a `data:<mime>;base64,` prefix and
/// line-wrapped input.
///
/// # Errors
///
/// Returns an error if the payload is not valid base64.
pub fn decode_base64_payload(payload: &str) -> Result<Vec<u8>, BananaError> {
    let trimmed = payload.trim();
    let data = match trimmed.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map_or(rest, |(_, data)| data),
        None => trimmed,
    };
    let data: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| BananaError::UnexpectedResponse(format!("Failed to decode base64: {e}")))
}
