//! Deterministic rendering of a feature vector
//!
//! Field order and per-field decimal precision are a reproducibility
//! contract: the prompt tests compare this output against literal strings.

use crate::features::FeatureVector;

/// Render the analysis summary line for one feature vector
pub fn format_analysis(vector: &FeatureVector) -> String {
    format!(
        "Duration: {:.2}s, Tempo: {:.1} BPM, RMS: {:.5}, ZCR: {:.5}, \
         Spectral Centroid: {:.2}, Dynamic Range: {:.2}, MFCC: {:.2}",
        vector.duration,
        vector.tempo,
        vector.rms,
        vector.zcr,
        vector.spectral_centroid,
        vector.dynamic_range,
        vector.mfcc_mean,
    )
}
