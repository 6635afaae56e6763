// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Image intake and compression.
//!
//! Cheap checks (extension, MIME, size) run before any pixel work, so
//! an oversized or mistyped file is refused without decoding it.
//! Compression is best-effort: a decode or encode failure falls back
//! to the original bytes with a flag, never blocking the flow.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::imageops::FilterType;
use image::{GenericImageView, ImageFormat};
use std::io::Cursor;

use crate::client::errors::ClientError;

/// Largest accepted input file.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
/// Longest side after compression.
pub const MAX_DIMENSION: u32 = 1920;
/// JPEG re-encode quality.
pub const JPEG_QUALITY: u8 = 80;

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];
pub const ALLOWED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

const UNSUPPORTED_TYPE_MESSAGE: &str = "Unsupported file type. Use JPG, PNG or WebP";
const TOO_LARGE_MESSAGE: &str = "Image is too large (max 5MB)";

/// An accepted image, compressed when possible, ready for preview and
/// upload.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pub bytes: Vec<u8>,
    pub mime: String,
    pub file_name: String,
    pub original_size: usize,
    pub compressed_size: usize,
    /// True when the original bytes are used because compression
    /// failed or produced a larger file.
    pub compression_fallback: bool,
}

impl CapturedImage {
    /// Data URI for previews and for the analysis request body.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64.encode(&self.bytes))
    }

    /// Upload extension matching the MIME type.
    pub fn extension(&self) -> &'static str {
        ext_from_mime(&self.mime)
    }
}

fn ext_from_mime(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/webp" => "webp",
        _ => "jpg",
    }
}

/// Validate and compress a selected file.
pub async fn prepare_image(
    file_name: &str,
    mime: &str,
    bytes: Vec<u8>,
) -> Result<CapturedImage, ClientError> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    let extension_ok = extension
        .as_deref()
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext));
    if !extension_ok || !ALLOWED_MIME_TYPES.contains(&mime) {
        return Err(ClientError::Image(UNSUPPORTED_TYPE_MESSAGE.to_string()));
    }

    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(ClientError::Image(TOO_LARGE_MESSAGE.to_string()));
    }

    let original_size = bytes.len();
    let original = bytes.clone();
    let mime_owned = mime.to_string();

    // Pixel work off the async thread.
    let compressed =
        tokio::task::spawn_blocking(move || compress_image(&mime_owned, &bytes)).await;

    let (data, compression_fallback) = match compressed {
        Ok(Ok(data)) if data.len() <= original_size => (data, false),
        Ok(Ok(data)) => {
            tracing::debug!(
                original = original_size,
                compressed = data.len(),
                "compression grew the file, keeping original"
            );
            (original, true)
        }
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "image compression failed, keeping original");
            (original, true)
        }
        Err(err) => {
            tracing::warn!(error = %err, "compression task failed, keeping original");
            (original, true)
        }
    };

    Ok(CapturedImage {
        compressed_size: data.len(),
        bytes: data,
        mime: mime.to_string(),
        file_name: file_name.to_string(),
        original_size,
        compression_fallback,
    })
}

/// Decode, resize to the dimension cap, and re-encode in the source
/// format.
fn compress_image(mime: &str, bytes: &[u8]) -> image::ImageResult<Vec<u8>> {
    let img = image::load_from_memory(bytes)?;

    let (width, height) = img.dimensions();
    let img = if width.max(height) > MAX_DIMENSION {
        img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Triangle)
    } else {
        img
    };

    let mut out = Vec::new();
    match mime {
        "image/jpeg" => {
            let mut encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
            encoder.encode_image(&img.to_rgb8())?;
        }
        "image/webp" => {
            img.write_to(&mut Cursor::new(&mut out), ImageFormat::WebP)?;
        }
        _ => {
            img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
        }
    }
    Ok(out)
}
