//! Shared framing scheme for framewise analysis
//!
//! Every framewise metric (RMS, ZCR, spectral centroid, MFCC) is computed
//! over the same frame and hop lengths so the frames stay aligned across
//! metrics.

/// Collect the aligned analysis frames of a signal.
///
/// Only full frames are used. A signal shorter than one frame length yields a
/// single frame covering the whole signal, so degenerate inputs still produce
/// one framewise observation.
pub fn frames(samples: &[f32], frame_size: usize, hop_size: usize) -> Vec<&[f32]> {
    if samples.len() < frame_size {
        return vec![samples];
    }

    let num_frames = (samples.len() - frame_size) / hop_size + 1;
    let mut out = Vec::with_capacity(num_frames);
    let mut pos = 0;
    while pos + frame_size <= samples.len() {
        out.push(&samples[pos..pos + frame_size]);
        pos += hop_size;
    }
    out
}

/// RMS of a single frame: sqrt(mean(x^2))
pub fn frame_rms(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = frame.iter().map(|&x| x * x).sum();
    (sum_sq / frame.len() as f32).sqrt()
}

/// Zero-crossing fraction of a single frame: sign changes between adjacent
/// samples, over the frame length
pub fn frame_zcr(frame: &[f32]) -> f32 {
    if frame.len() < 2 {
        return 0.0;
    }
    let mut crossings = 0u32;
    for i in 1..frame.len() {
        if (frame[i] >= 0.0) != (frame[i - 1] >= 0.0) {
            crossings += 1;
        }
    }
    crossings as f32 / frame.len() as f32
}
