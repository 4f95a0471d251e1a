//! Spectral analysis over the shared framing
//!
//! Hann-windowed magnitude spectra per frame, and the amplitude-weighted
//! mean frequency (spectral centroid) derived from them.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Magnitude spectra for every analysis frame.
///
/// Each inner vector holds `frame_size / 2 + 1` magnitudes covering DC to
/// Nyquist. Frames shorter than `frame_size` are zero-padded.
pub fn magnitude_spectra(frames: &[&[f32]], frame_size: usize) -> Vec<Vec<f32>> {
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(frame_size);
    let window = hann_window(frame_size);
    let num_bins = frame_size / 2 + 1;

    let mut spectra = Vec::with_capacity(frames.len());
    for frame in frames {
        let mut buf = vec![Complex::new(0.0f32, 0.0); frame_size];
        for (i, &x) in frame.iter().take(frame_size).enumerate() {
            buf[i] = Complex::new(x * window[i], 0.0);
        }
        fft.process(&mut buf);
        spectra.push(buf[..num_bins].iter().map(|c| c.norm()).collect());
    }
    spectra
}

/// Mean spectral centroid in Hz across frames.
///
/// Frames with zero total magnitude (digital silence) contribute 0.0 rather
/// than dividing by zero.
pub fn mean_spectral_centroid(spectra: &[Vec<f32>], sample_rate: u32, frame_size: usize) -> f32 {
    if spectra.is_empty() {
        return 0.0;
    }

    let bin_hz = sample_rate as f32 / frame_size as f32;
    let mut sum = 0.0f32;
    for spectrum in spectra {
        let mut weighted = 0.0f32;
        let mut total = 0.0f32;
        for (bin, &mag) in spectrum.iter().enumerate() {
            weighted += bin as f32 * bin_hz * mag;
            total += mag;
        }
        if total > 0.0 {
            sum += weighted / total;
        }
    }
    sum / spectra.len() as f32
}

fn hann_window(size: usize) -> Vec<f32> {
    if size == 1 {
        return vec![1.0];
    }
    (0..size)
        .map(|n| {
            let x = 2.0 * std::f32::consts::PI * n as f32 / (size - 1) as f32;
            0.5 * (1.0 - x.cos())
        })
        .collect()
}
