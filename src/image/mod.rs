//! Image generation module.

mod provider;
pub mod providers;
mod types;

pub use provider::ImageProvider;
pub use types::{
    DecodedImage, EncodedImage, GenerationRequest, GenerationResponse, ImageFormat,
    DEFAULT_MODEL, DEFAULT_OUTPUT, DEFAULT_PROMPT, DEFAULT_SIZE,
};
