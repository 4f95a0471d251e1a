//! Per-request critique pipeline
//!
//! Orchestrates decode → extract → format → prompt → feedback for one
//! uploaded recording. Each stage fully completes before the next starts and
//! no state is shared between invocations.

use crate::decode;
use crate::error::PipelineError;
use crate::features::{self, FeatureConfig, FeatureVector};
use crate::feedback::FeedbackService;
use crate::prompt::{build_prompt, ContextBundle};
use crate::report::format_analysis;
use std::path::Path;
use tempfile::NamedTempFile;

/// Analysis summary plus the critique grounded in it
#[derive(Debug, Clone)]
pub struct Critique {
    pub analysis: String,
    pub feedback: String,
}

/// Decode a local file and render its analysis summary.
///
/// Extraction only; the feedback service is not contacted. The file at
/// `path` is read and never written or removed.
pub fn analyze_file(
    path: &Path,
    config: &FeatureConfig,
) -> Result<(FeatureVector, String), PipelineError> {
    let waveform = decode::load_waveform(path)?;
    let vector = features::extract(&waveform, config)?;
    let analysis = format_analysis(&vector);
    Ok((vector, analysis))
}

/// Critique pipeline, generic over the feedback oracle
pub struct CritiquePipeline<S: FeedbackService> {
    config: FeatureConfig,
    service: S,
}

impl<S: FeedbackService> CritiquePipeline<S> {
    pub fn new(config: FeatureConfig, service: S) -> Self {
        Self { config, service }
    }

    /// Run the full critique of an uploaded recording.
    ///
    /// Takes ownership of the temporary upload; the file is deleted when the
    /// extraction task finishes, on success and on every failure path alike.
    /// Extraction runs on a blocking worker so concurrent requests never
    /// stall the async executor.
    pub async fn critique(
        &self,
        upload: NamedTempFile,
        context: ContextBundle,
    ) -> Result<Critique, PipelineError> {
        let config = self.config.clone();

        let analysis = tokio::task::spawn_blocking(move || {
            // `upload` lives exactly as long as this closure; dropping it
            // removes the temp file on any exit path, including unwind
            let waveform = decode::load_waveform(upload.path())?;
            let vector = features::extract(&waveform, &config)?;
            Ok::<String, PipelineError>(format_analysis(&vector))
        })
        .await
        .map_err(|e| PipelineError::TaskJoin(e.to_string()))??;

        let prompt = build_prompt(&analysis, &context);
        let feedback = self.service.generate(&prompt).await?;

        Ok(Critique { analysis, feedback })
    }
}
