//! Error types for the critique pipeline
//!
//! Each stage has its own error enum; `PipelineError` is the union the
//! request handler maps to a structured `{error}` response. Malformed or
//! degenerate audio must never take down the serving process.

use thiserror::Error;

/// Audio decoding failures
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to open audio file: {0}")]
    Open(#[source] std::io::Error),

    #[error("unsupported or unrecognized audio format: {0}")]
    UnsupportedFormat(String),

    #[error("no audio track found in file")]
    NoAudioTrack,

    #[error("audio track is missing a sample rate")]
    MissingSampleRate,

    #[error("failed to create audio decoder: {0}")]
    Codec(String),

    #[error("decoded audio stream is empty")]
    EmptyStream,
}

/// Feature extraction failures
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid feature configuration: {0}")]
    InvalidConfig(String),

    /// A computed metric came out NaN or infinite. Surfaced as a structured
    /// error instead of silently substituting a value.
    #[error("degenerate signal: {0}")]
    DegenerateSignal(String),
}

/// Feedback service failures
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("feedback service request timed out")]
    Timeout,

    #[error("failed to reach feedback service: {0}")]
    Connection(String),

    #[error("feedback service returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid feedback service response: {0}")]
    InvalidResponse(String),
}

/// Union of all stage errors for one critique request
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("analysis task failed: {0}")]
    TaskJoin(String),
}
