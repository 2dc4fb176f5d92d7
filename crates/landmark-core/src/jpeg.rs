//! Image preparation for classification uploads.
//!
//! The classification service expects a JPEG byte stream. Whatever the user
//! supplies (JPEG, PNG, WebP, a camera frame) is decoded, checked against the
//! configured limits and re-encoded from its pixel buffer as JPEG.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::ImageError;

/// A JPEG ready to send to the classifier.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// JPEG bytes
    pub bytes: Vec<u8>,
    /// Format detected in the original input, if any
    pub source_format: Option<ImageFormat>,
    pub width: u32,
    pub height: u32,
}

/// Decodes arbitrary image input and re-encodes it as JPEG.
pub struct UploadEncoder {
    limits: LimitsConfig,
}

impl UploadEncoder {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode `bytes` and re-encode as JPEG, off the async runtime and under
    /// the decode timeout.
    pub async fn encode_jpeg(&self, bytes: Vec<u8>) -> Result<EncodedImage, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }

        let max_bytes = self.limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if bytes.len() as u64 > max_bytes {
            return Err(ImageError::FileTooLarge {
                size_mb: bytes.len() as u64 / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        let limits = self.limits.clone();
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let result = timeout(timeout_duration, async {
            tokio::task::spawn_blocking(move || Self::encode_sync(bytes, &limits)).await
        })
        .await;

        match result {
            Ok(Ok(encoded)) => encoded,
            Ok(Err(e)) => Err(ImageError::Decode(format!("Task join error: {e}"))),
            Err(_) => Err(ImageError::Timeout {
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }

    /// Synchronous decode + encode (runs in spawn_blocking).
    fn encode_sync(bytes: Vec<u8>, limits: &LimitsConfig) -> Result<EncodedImage, ImageError> {
        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ImageError::Decode(format!("Cannot detect image format: {e}")))?;
        let source_format = reader.format();
        if source_format.is_none() {
            return Err(ImageError::Decode("Unrecognized image format".to_string()));
        }

        let image = reader
            .decode()
            .map_err(|e| ImageError::Decode(e.to_string()))?;

        let (width, height) = image.dimensions();
        if width > limits.max_image_dimension || height > limits.max_image_dimension {
            return Err(ImageError::DimensionsTooLarge {
                width,
                height,
                max_dim: limits.max_image_dimension,
            });
        }

        let bytes = to_jpeg(&image, limits.jpeg_quality)?;
        tracing::debug!(
            "Re-encoded {:?} {}x{} image as JPEG ({} bytes)",
            source_format,
            width,
            height,
            bytes.len()
        );

        Ok(EncodedImage {
            bytes,
            source_format,
            width,
            height,
        })
    }
}

/// Encode a decoded image's pixel buffer as JPEG.
///
/// JPEG has no alpha channel, so the buffer is flattened to RGB8 first.
pub fn to_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, ImageError> {
    let rgb = image.to_rgb8();
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    Ok(buffer.into_inner())
}
