//! Single-shot generate, decode and save.

use crate::config::Settings;
use crate::error::Result;
use crate::image::{GenerationRequest, ImageFormat, ImageProvider};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Path the image was written to.
    pub output: PathBuf,
    /// Number of bytes written.
    pub size_bytes: usize,
    /// Format detected from the written bytes.
    pub format: Option<ImageFormat>,
    /// Model that was requested.
    pub model: String,
    /// Display name of the provider.
    pub provider: String,
    /// Wall time from request to saved file.
    pub duration_ms: u64,
    /// Prompt as rewritten by the service, if it reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
}

impl RunReport {
    /// Human readable confirmation line.
    pub fn confirmation(&self) -> String {
        format!("Image '{}' saved successfully.", self.output.display())
    }
}

/// Sends one request through a provider and stores the first image.
///
/// Nothing is written unless a record was returned and decoded cleanly.
/// The output file is truncated and replaced on every run.
#[derive(Debug)]
pub struct ImageRequestRunner<P> {
    provider: P,
}

impl<P: ImageProvider> ImageRequestRunner<P> {
    /// Creates a runner around an already-authenticated provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Returns the wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Generates one image for `request` and writes it to `output`.
    pub async fn run(&self, request: &GenerationRequest, output: &Path) -> Result<RunReport> {
        let start = Instant::now();

        let response = self.provider.generate(request).await?;
        let record = response.into_first()?;
        let image = record.decode()?;
        image.save(output)?;

        let report = RunReport {
            output: output.to_path_buf(),
            size_bytes: image.size(),
            format: image.detected_format(),
            model: request.model.clone(),
            provider: self.provider.name().to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
            revised_prompt: record.revised_prompt,
        };

        tracing::info!(
            output = %report.output.display(),
            size_bytes = report.size_bytes,
            duration_ms = report.duration_ms,
            "image saved"
        );

        Ok(report)
    }
}

/// Resolves settings through `lookup`, connects, then runs once.
///
/// `connect` is only called once a non-empty API key is available, so a
/// missing key never reaches the network.
pub async fn run_from_lookup<L, F, P>(
    lookup: L,
    connect: F,
    request: &GenerationRequest,
    output: &Path,
) -> Result<RunReport>
where
    L: Fn(&str) -> Option<String>,
    F: FnOnce(&Settings) -> Result<P>,
    P: ImageProvider,
{
    let settings = Settings::from_lookup(lookup)?;
    let provider = connect(&settings)?;
    ImageRequestRunner::new(provider).run(request, output).await
}
