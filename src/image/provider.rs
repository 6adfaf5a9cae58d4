//! Image provider trait.

use crate::error::Result;
use crate::image::types::{GenerationRequest, GenerationResponse};
use async_trait::async_trait;

/// A remote image generation service.
///
/// Implementations send exactly one request per call and never retry;
/// decoding and persistence are left to the caller.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Sends the request and returns the service's encoded records.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse>;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str;
}
