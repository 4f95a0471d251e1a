//! Audio decoding layer
//!
//! Decodes an uploaded audio file into a mono sample buffer at its native
//! sample rate. Decoding is powered by symphonia.

mod waveform;

pub use waveform::{load_waveform, Waveform};
