//! Mel-frequency cepstral coefficients
//!
//! Triangular mel filterbank over the shared magnitude spectra, log filter
//! energies, DCT-II. The per-coefficient detail is collapsed to a single
//! scalar mean across all frames and coefficients; downstream formatting
//! expects one timbral summary value.

/// Floor added to filter energies before the log
const LOG_FLOOR: f32 = 1e-10;

/// Triangular mel filterbank mapping FFT bins to mel bands
pub struct MelFilterBank {
    // Sparse (bin, weight) taps per band
    filters: Vec<Vec<(usize, f32)>>,
}

fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0f32.powf(mel / 2595.0) - 1.0)
}

impl MelFilterBank {
    /// Build `num_bands` triangular filters spanning 0 Hz to Nyquist,
    /// equally spaced on the mel scale
    pub fn new(num_bands: usize, sample_rate: u32, frame_size: usize) -> Self {
        let num_bins = frame_size / 2 + 1;
        let nyquist = sample_rate as f32 / 2.0;
        let mel_max = hz_to_mel(nyquist);
        let bin_hz = sample_rate as f32 / frame_size as f32;

        // num_bands + 2 edge points: each filter rises from edge i to i+1
        // and falls back to zero at i+2
        let edges: Vec<f32> = (0..num_bands + 2)
            .map(|i| mel_to_hz(mel_max * i as f32 / (num_bands + 1) as f32))
            .collect();

        let mut filters = Vec::with_capacity(num_bands);
        for band in 0..num_bands {
            let (lo, center, hi) = (edges[band], edges[band + 1], edges[band + 2]);
            let mut taps = Vec::new();
            for bin in 0..num_bins {
                let freq = bin as f32 * bin_hz;
                let weight = if freq > lo && freq < center {
                    (freq - lo) / (center - lo)
                } else if freq >= center && freq < hi {
                    (hi - freq) / (hi - center)
                } else {
                    0.0
                };
                if weight > 0.0 {
                    taps.push((bin, weight));
                }
            }
            filters.push(taps);
        }

        Self { filters }
    }

    /// Apply the filterbank to one magnitude spectrum
    pub fn apply(&self, spectrum: &[f32]) -> Vec<f32> {
        self.filters
            .iter()
            .map(|taps| taps.iter().map(|&(bin, w)| spectrum[bin] * w).sum())
            .collect()
    }
}

/// Mean MFCC across all frames and coefficients.
///
/// Computes `num_coefficients` cepstral coefficients per frame and collapses
/// them to one scalar. The collapse discards per-coefficient detail on
/// purpose.
pub fn mfcc_mean(
    spectra: &[Vec<f32>],
    sample_rate: u32,
    frame_size: usize,
    num_bands: usize,
    num_coefficients: usize,
) -> f32 {
    if spectra.is_empty() || num_bands == 0 || num_coefficients == 0 {
        return 0.0;
    }

    let bank = MelFilterBank::new(num_bands, sample_rate, frame_size);

    // Pre-compute the DCT-II basis
    let mut dct_basis = vec![vec![0.0f32; num_bands]; num_coefficients];
    for (k, basis) in dct_basis.iter_mut().enumerate() {
        for (n, b) in basis.iter_mut().enumerate() {
            *b = (std::f32::consts::PI * k as f32 * (n as f32 + 0.5) / num_bands as f32).cos();
        }
    }

    let mut sum = 0.0f32;
    let mut count = 0usize;
    for spectrum in spectra {
        let log_energies: Vec<f32> = bank
            .apply(spectrum)
            .iter()
            .map(|&e| (e + LOG_FLOOR).ln())
            .collect();

        for basis in &dct_basis {
            let coeff: f32 = log_energies
                .iter()
                .zip(basis.iter())
                .map(|(&e, &b)| e * b)
                .sum();
            sum += coeff;
            count += 1;
        }
    }

    sum / count as f32
}
