#![warn(missing_docs)]
//! imagegen - generate one image through the OpenAI Images API and save it.
//!
//! The API key is resolved from the environment, a single request is sent,
//! the first returned record is base64-decoded and written to disk. There are
//! no retries; every error ends the run.
//!
//! # Quick Start
//!
//! ```no_run
//! use imagegen::{GenerationRequest, ImageRequestRunner, OpenAiImageProvider, Settings};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> imagegen::Result<()> {
//!     let settings = Settings::from_env()?;
//!     let provider = OpenAiImageProvider::from_settings(&settings)?;
//!     let request = GenerationRequest::new("A baby otter wearing a tiny scarf");
//!     let report = ImageRequestRunner::new(provider)
//!         .run(&request, Path::new("otter.png"))
//!         .await?;
//!     println!("{}", report.confirmation());
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `cli` (default): the `imagegen` binary

pub mod config;
mod error;
pub mod image;
pub mod runner;

// Re-export error types at crate root
pub use error::{ImageGenError, Result};

pub use config::{Secret, Settings};
pub use image::providers::{OpenAiImageProvider, OpenAiImageProviderBuilder};
pub use image::{
    DecodedImage, EncodedImage, GenerationRequest, GenerationResponse, ImageFormat, ImageProvider,
};
pub use runner::{run_from_lookup, ImageRequestRunner, RunReport};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{ImageGenError, Result};
    pub use crate::image::providers::OpenAiImageProvider;
    pub use crate::image::{GenerationRequest, ImageProvider};
    pub use crate::runner::ImageRequestRunner;
}
