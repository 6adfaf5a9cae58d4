//! Core types for image generation.

use crate::error::{ImageGenError, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Model used when none is given.
pub const DEFAULT_MODEL: &str = "gpt-image-1";

/// Output size used when none is given.
pub const DEFAULT_SIZE: &str = "1024x1024";

/// Prompt used when none is given.
pub const DEFAULT_PROMPT: &str = "A children's book drawing of a veterinarian using a \
     stethoscope to listen to the heartbeat of a baby otter.";

/// File written when no output path is given.
pub const DEFAULT_OUTPUT: &str = "otter.png";

/// Image formats recognised in decoded payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format.
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// A request to generate images. Serialized as the request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    /// Model identifier, e.g. `gpt-image-1`.
    pub model: String,
    /// The text prompt describing the desired image.
    pub prompt: String,
    /// Number of images requested. Always 1 for this tool.
    pub n: u32,
    /// Output size as `WIDTHxHEIGHT`.
    pub size: String,
}

impl GenerationRequest {
    /// Creates a single-image request with the default model and size.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            prompt: prompt.into(),
            n: 1,
            size: DEFAULT_SIZE.to_string(),
        }
    }

    /// Sets the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the output size (`WIDTHxHEIGHT`).
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = size.into();
        self
    }
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPT)
    }
}

/// A response from the generation endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationResponse {
    /// Returned image records, in order.
    #[serde(default)]
    pub data: Vec<EncodedImage>,
}

impl GenerationResponse {
    /// Creates a response holding the given base64 payloads.
    pub fn from_b64<I, S>(payloads: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            data: payloads
                .into_iter()
                .map(|b64| EncodedImage {
                    b64_json: Some(b64.into()),
                    ..Default::default()
                })
                .collect(),
        }
    }

    /// Takes the first record, failing if there is none.
    pub fn into_first(self) -> Result<EncodedImage> {
        self.data
            .into_iter()
            .next()
            .ok_or_else(|| ImageGenError::ResponseFormat("no images in response".into()))
    }
}

/// One image record as returned by the service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EncodedImage {
    /// Base64-encoded image bytes.
    #[serde(default)]
    pub b64_json: Option<String>,
    /// Hosted image URL, returned instead of `b64_json` by some models.
    #[serde(default)]
    pub url: Option<String>,
    /// Prompt as rewritten by the service.
    #[serde(default)]
    pub revised_prompt: Option<String>,
}

impl EncodedImage {
    /// Decodes the base64 payload into raw bytes.
    pub fn decode(&self) -> Result<DecodedImage> {
        let b64 = self.b64_json.as_deref().ok_or_else(|| {
            ImageGenError::ResponseFormat("image record contained no base64 data".into())
        })?;

        // Payloads may arrive line-wrapped
        let compact: String = b64.split_ascii_whitespace().collect();
        let data = base64::engine::general_purpose::STANDARD
            .decode(compact)
            .map_err(|e| ImageGenError::Decode(e.to_string()))?;

        Ok(DecodedImage { data })
    }
}

/// Raw image bytes obtained from an [`EncodedImage`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "decoded image should be saved"]
pub struct DecodedImage {
    /// Raw image bytes.
    pub data: Vec<u8>,
}

impl DecodedImage {
    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Returns the format detected from magic bytes.
    pub fn detected_format(&self) -> Option<ImageFormat> {
        ImageFormat::from_magic_bytes(&self.data)
    }

    /// Writes the bytes to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, &self.data).map_err(|source| ImageGenError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
