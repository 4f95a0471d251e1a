//! Tempo estimation
//!
//! Onset strength from framewise energy flux, then dominant periodicity via
//! FFT-accelerated autocorrelation of the binary onset signal
//! (`ACF = IFFT(|FFT(signal)|^2)`). Returns a single global BPM estimate,
//! not a time-varying curve.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

const EPSILON: f32 = 1e-10;

/// Detect onset positions (in samples) from framewise energy flux.
///
/// `E_flux[n] = max(0, E[n] - E[n-1])`, thresholded relative to the maximum
/// flux and peak-picked at local maxima. Silence or steady-state signals
/// legitimately produce no onsets.
pub fn detect_onsets(frame_energies: &[f32], hop_size: usize, threshold_db: f32) -> Vec<usize> {
    if frame_energies.len() < 2 || hop_size == 0 {
        return Vec::new();
    }

    let flux: Vec<f32> = frame_energies
        .windows(2)
        .map(|w| (w[1] - w[0]).max(0.0))
        .collect();

    let max_flux = flux.iter().copied().fold(0.0f32, f32::max);
    if max_flux <= EPSILON {
        return Vec::new();
    }

    let threshold = max_flux * 10.0f32.powf(threshold_db / 20.0);

    let mut onsets = Vec::new();
    for i in 0..flux.len() {
        let prev = if i > 0 { flux[i - 1] } else { 0.0 };
        let next = if i + 1 < flux.len() { flux[i + 1] } else { 0.0 };
        // flux[i] is the rise into frame i+1, so that frame starts the onset
        if flux[i] > threshold && flux[i] > prev && flux[i] >= next {
            onsets.push((i + 1) * hop_size);
        }
    }
    onsets
}

/// Estimate a global tempo from onset positions.
///
/// Fewer than two onsets yields 0.0: silence or a steady tone has no
/// measurable beat, which is not an error.
pub fn estimate_bpm(
    onsets: &[usize],
    sample_rate: u32,
    hop_size: usize,
    min_bpm: f32,
    max_bpm: f32,
) -> f32 {
    if onsets.len() < 2 || sample_rate == 0 || hop_size == 0 {
        return 0.0;
    }

    // Binary beat signal on the frame grid
    let max_frame = onsets.iter().max().copied().unwrap_or(0) / hop_size;
    let len = max_frame + 1;
    if len < 2 {
        return 0.0;
    }
    let mut beat_signal = vec![0.0f32; len];
    for &onset in onsets {
        let idx = onset / hop_size;
        if idx < len {
            beat_signal[idx] = 1.0;
        }
    }

    let acf = autocorrelation(&beat_signal);

    // BPM = (60 * sample_rate) / (lag * hop_size)
    let lag_min = ((60.0 * sample_rate as f32) / (max_bpm * hop_size as f32)).ceil() as usize;
    let lag_max = ((60.0 * sample_rate as f32) / (min_bpm * hop_size as f32)).floor() as usize;
    let lag_max = lag_max.min(acf.len().saturating_sub(1));
    if lag_min == 0 || lag_min > lag_max {
        return 0.0;
    }

    // Strongest periodicity in range
    let mut best_lag = 0usize;
    let mut best_value = 0.0f32;
    for lag in lag_min..=lag_max {
        if acf[lag] > best_value {
            best_value = acf[lag];
            best_lag = lag;
        }
    }
    if best_lag == 0 || best_value <= EPSILON {
        return 0.0;
    }

    (60.0 * sample_rate as f32) / (best_lag as f32 * hop_size as f32)
}

/// ACF = IFFT(|FFT(signal)|^2), zero-padded to avoid circular wrap
fn autocorrelation(signal: &[f32]) -> Vec<f32> {
    let n = signal.len();
    let fft_size = (2 * n).next_power_of_two();

    let mut buf: Vec<Complex<f32>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    buf.resize(fft_size, Complex::new(0.0, 0.0));

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_size);
    fft.process(&mut buf);

    for x in &mut buf {
        *x = *x * x.conj();
    }

    let ifft = planner.plan_fft_inverse(fft_size);
    ifft.process(&mut buf);

    let scale = 1.0 / fft_size as f32;
    buf[..n].iter().map(|x| (x.re * scale).max(0.0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::framing::{frame_rms, frames};

    /// 4-on-floor kick pattern: exponential-decay kicks at each beat
    fn generate_kick_pattern(
        duration_seconds: f32,
        bpm: f32,
        sample_rate: f32,
        kick_duration_ms: f32,
    ) -> Vec<f32> {
        let num_samples = (duration_seconds * sample_rate) as usize;
        let mut samples = vec![0.0f32; num_samples];

        let beat_interval = (60.0 / bpm * sample_rate) as usize;
        let kick_samples = (kick_duration_ms / 1000.0 * sample_rate) as usize;

        let mut pos = 0;
        while pos < num_samples {
            let end = (pos + kick_samples).min(num_samples);
            for i in pos..end {
                let t = (i - pos) as f32 / kick_samples as f32;
                samples[i] = (-t * 5.0).exp() * 0.8;
            }
            pos += beat_interval;
        }

        samples
    }

    fn frame_energies(samples: &[f32], frame_size: usize, hop_size: usize) -> Vec<f32> {
        frames(samples, frame_size, hop_size)
            .iter()
            .map(|f| frame_rms(f))
            .collect()
    }

    #[test]
    fn test_estimate_bpm_from_regular_onsets_120() {
        // 120 BPM at 44.1kHz, 512 hop: one beat every ~43 frames
        let sample_rate = 44100;
        let hop_size = 512;
        let period_frames =
            ((60.0 * sample_rate as f32) / (120.0 * hop_size as f32)).round() as usize;

        let onsets: Vec<usize> = (0..8).map(|beat| beat * period_frames * hop_size).collect();

        let bpm = estimate_bpm(&onsets, sample_rate, hop_size, 60.0, 180.0);
        assert!((bpm - 120.0).abs() < 5.0, "expected ~120 BPM, got {:.2}", bpm);
    }

    #[test]
    fn test_detect_onsets_kick_pattern() {
        let samples = generate_kick_pattern(4.0, 120.0, 44100.0, 150.0);
        let energies = frame_energies(&samples, 2048, 512);
        let onsets = detect_onsets(&energies, 512, -20.0);

        // 8 beats in 4 seconds at 120 BPM; allow boundary misses
        assert!(
            onsets.len() >= 4 && onsets.len() <= 12,
            "expected 4-12 onsets, got {}",
            onsets.len()
        );
    }

    #[test]
    fn test_kick_pattern_end_to_end_tempo() {
        let samples = generate_kick_pattern(4.0, 120.0, 44100.0, 150.0);
        let energies = frame_energies(&samples, 2048, 512);
        let onsets = detect_onsets(&energies, 512, -20.0);
        let bpm = estimate_bpm(&onsets, 44100, 512, 60.0, 180.0);

        assert!((bpm - 120.0).abs() < 8.0, "expected ~120 BPM, got {:.2}", bpm);
    }

    #[test]
    fn test_silence_yields_no_onsets_and_zero_bpm() {
        let energies = vec![0.0f32; 200];
        let onsets = detect_onsets(&energies, 512, -20.0);
        assert!(onsets.is_empty());
        assert_eq!(estimate_bpm(&onsets, 44100, 512, 60.0, 180.0), 0.0);
    }

    #[test]
    fn test_single_onset_zero_bpm() {
        let onsets = vec![1000];
        assert_eq!(estimate_bpm(&onsets, 44100, 512, 60.0, 180.0), 0.0);
    }

    #[test]
    fn test_autocorrelation_periodic_signal() {
        // Period-2 impulse train
        let signal = vec![1.0, 0.0, 1.0, 0.0, 1.0, 0.0];
        let acf = autocorrelation(&signal);
        assert_eq!(acf.len(), signal.len());
        // Self-correlation dominates, period-2 lag is next strongest
        assert!(acf[0] > acf[2]);
        assert!(acf[2] > acf[1]);
    }
}
