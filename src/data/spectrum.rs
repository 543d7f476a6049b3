// Amplitude spectral density of one record: Hann window, single FFT, one-sided.
use std::f64::consts::PI;

use rustfft::{num_complex::Complex, FftPlanner};
use thiserror::Error;

/// Empirical Hann amplitude correction; fixed, not derived from the window.
pub const HANN_CORRECTION: f64 = 1.63;

#[derive(Debug, Error, PartialEq)]
pub enum SpectrumError {
    #[error("cannot compute a spectrum of an empty series")]
    Empty,
    #[error("sample spacing must be finite and positive, got {0}")]
    InvalidSpacing(f64),
}

/// One-sided spectrum, frequencies ascending from 0.
#[derive(Debug, Clone, Default)]
pub struct Spectrum {
    pub frequencies: Vec<f64>,
    /// Amplitude in units/√Hz, same length as `frequencies`.
    pub amplitudes: Vec<f64>,
}

impl Spectrum {
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = [f64; 2]> + '_ {
        self.frequencies
            .iter()
            .zip(&self.amplitudes)
            .map(|(&f, &a)| [f, a])
    }
}

/// Frequency of DFT bin `k` for `n` samples at `spacing` seconds.
///
/// Bins `0..ceil(n/2)` are non-negative, the rest mirror to negative
/// frequencies (the usual `fftfreq` layout).
pub fn bin_frequency(k: usize, n: usize, spacing: f64) -> f64 {
    let positive = n.div_ceil(2);
    let signed = if k < positive {
        k as f64
    } else {
        k as f64 - n as f64
    };
    signed / (n as f64 * spacing)
}

/// Hann weight `0.5 * (1 - cos(2πk/N))`.
pub fn hann(k: usize, n: usize) -> f64 {
    0.5 * (1.0 - (2.0 * PI * k as f64 / n as f64).cos())
}

/// Estimate the amplitude spectral density of `values` sampled every `spacing` seconds.
pub fn amplitude_spectral_density(values: &[f64], spacing: f64) -> Result<Spectrum, SpectrumError> {
    let n = values.len();
    if n == 0 {
        return Err(SpectrumError::Empty);
    }
    if !spacing.is_finite() || spacing <= 0.0 {
        return Err(SpectrumError::InvalidSpacing(spacing));
    }

    let fs = 1.0 / spacing;
    let df = fs / n as f64;

    let mut buffer: Vec<Complex<f64>> = values
        .iter()
        .enumerate()
        .map(|(k, &x)| Complex::new(x * hann(k, n), 0.0))
        .collect();
    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_forward(n).process(&mut buffer);

    let scale = HANN_CORRECTION / (n as f64 * df.sqrt());
    let (frequencies, amplitudes) = buffer
        .iter()
        .enumerate()
        .map(|(k, c)| (bin_frequency(k, n, spacing), c.norm() * scale))
        .filter(|(f, _)| *f >= 0.0)
        .unzip();

    Ok(Spectrum {
        frequencies,
        amplitudes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alternating_signal_spectrum() {
        let x = [1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0];
        let s = amplitude_spectral_density(&x, 1.0).unwrap();
        assert_eq!(s.frequencies, [0.0, 0.125, 0.25, 0.375]);

        // x = 0.5 + 0.5 * (-1)^k: energy sits at DC and at Nyquist (0.5, dropped
        // as a negative bin). Hann leaks half of each into the neighbours, so
        // |X| = [2, 1, 0, 1] and 0.25 is a null.
        let scale = HANN_CORRECTION / (8.0 * 0.125f64.sqrt());
        let expected = [2.0 * scale, scale, 0.0, scale];
        for (k, (&got, &want)) in s.amplitudes.iter().zip(&expected).enumerate() {
            assert!((got - want).abs() < 1e-12, "bin {k}: {got} != {want}");
        }
    }

    #[test]
    fn output_length_is_non_negative_half() {
        for n in 1usize..=17 {
            let x: Vec<f64> = (0..n).map(|i| (i as f64 * 0.3).sin()).collect();
            let s = amplitude_spectral_density(&x, 0.01).unwrap();
            assert_eq!(s.len(), n.div_ceil(2), "n = {n}");
            assert_eq!(s.amplitudes.len(), s.len());
            assert!(s.frequencies.iter().all(|&f| f >= 0.0));
            assert!(s.frequencies.windows(2).all(|w| w[1] > w[0]));
        }
    }

    #[test]
    fn bin_layout_matches_fftfreq() {
        let odd: Vec<f64> = (0..5).map(|k| bin_frequency(k, 5, 0.5)).collect();
        assert_eq!(odd, [0.0, 0.4, 0.8, -0.8, -0.4]);
        let even: Vec<f64> = (0..4).map(|k| bin_frequency(k, 4, 1.0)).collect();
        assert_eq!(even, [0.0, 0.25, -0.5, -0.25]);
    }

    #[test]
    fn sine_peak_lands_on_its_bin() {
        let n = 1000;
        let dt = 1e-3;
        let x: Vec<f64> = (0..n)
            .map(|i| (2.0 * PI * 50.0 * i as f64 * dt).sin())
            .collect();
        let s = amplitude_spectral_density(&x, dt).unwrap();
        let (peak_bin, _) = s
            .amplitudes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap();
        assert!((s.frequencies[peak_bin] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_empty_and_bad_spacing() {
        assert_eq!(amplitude_spectral_density(&[], 1.0).err(), Some(SpectrumError::Empty));
        assert_eq!(
            amplitude_spectral_density(&[1.0], 0.0).err(),
            Some(SpectrumError::InvalidSpacing(0.0))
        );
    }
}
