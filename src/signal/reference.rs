//! Sine/cosine reference sets for SSVEP stimulus frequencies
//!
//! For a stimulus frequency `f` and `H` harmonics, the reference set is a
//! (samples x 2H) matrix with columns
//! `[sin(2π·1·f·t), cos(2π·1·f·t), sin(2π·2·f·t), cos(2π·2·f·t), ...]`
//! sampled at `t = k / fs`. References depend only on the time axis and the
//! frequency, so one bank serves every trial of the same length.

use std::f64::consts::PI;
use ndarray::Array2;
use tracing::debug;
use crate::error::SsvepResult;
use crate::utils::validation::{validate_frequencies, validate_positive, validate_range};
use crate::config::constants::reference::MAX_HARMONICS;
use super::matrix::SignalMatrix;

/// Reference sets for an ordered list of stimulus frequencies
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceBank {
    sampling_rate_hz: f64,
    num_samples: usize,
    num_harmonics: usize,
    entries: Vec<(f64, SignalMatrix)>,
}

impl ReferenceBank {
    pub fn sampling_rate_hz(&self) -> f64 {
        self.sampling_rate_hz
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    pub fn num_harmonics(&self) -> usize {
        self.num_harmonics
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stimulus frequencies in bank order
    pub fn frequencies(&self) -> Vec<f64> {
        self.entries.iter().map(|(f, _)| *f).collect()
    }

    /// Reference matrices in bank order
    pub fn matrices(&self) -> impl Iterator<Item = &SignalMatrix> {
        self.entries.iter().map(|(_, m)| m)
    }

    /// Reference set for the frequency at `index`
    pub fn get(&self, index: usize) -> Option<&SignalMatrix> {
        self.entries.get(index).map(|(_, m)| m)
    }

    /// (frequency, reference set) pairs in bank order
    pub fn iter(&self) -> impl Iterator<Item = (f64, &SignalMatrix)> {
        self.entries.iter().map(|(f, m)| (*f, m))
    }
}

/// Build one reference set per stimulus frequency
pub fn build_reference_bank(
    sampling_rate_hz: f64,
    num_samples: usize,
    frequencies: &[f64],
    num_harmonics: usize,
) -> SsvepResult<ReferenceBank> {
    validate_frequencies(frequencies, "frequencies")?;

    let entries = frequencies
        .iter()
        .map(|&freq| {
            reference_signal(sampling_rate_hz, num_samples, freq, num_harmonics).map(|m| (freq, m))
        })
        .collect::<SsvepResult<Vec<_>>>()?;

    debug!(
        frequencies = frequencies.len(),
        num_samples,
        num_harmonics,
        sampling_rate_hz,
        "built reference bank"
    );

    Ok(ReferenceBank {
        sampling_rate_hz,
        num_samples,
        num_harmonics,
        entries,
    })
}

/// Reference set for a single stimulus frequency
pub fn reference_signal(
    sampling_rate_hz: f64,
    num_samples: usize,
    frequency_hz: f64,
    num_harmonics: usize,
) -> SsvepResult<SignalMatrix> {
    validate_positive(sampling_rate_hz, "sampling_rate_hz")?;
    validate_positive(frequency_hz, "frequency_hz")?;
    validate_range(num_samples, 1, usize::MAX, "num_samples")?;
    validate_range(num_harmonics, 1, MAX_HARMONICS, "num_harmonics")?;

    let nyquist = sampling_rate_hz / 2.0;
    if frequency_hz * num_harmonics as f64 >= nyquist {
        debug!(
            frequency_hz,
            num_harmonics,
            nyquist,
            "highest harmonic at or above Nyquist, reference will alias"
        );
    }

    let data = Array2::from_shape_fn((num_samples, 2 * num_harmonics), |(k, col)| {
        let harmonic = (col / 2 + 1) as f64;
        let t = k as f64 / sampling_rate_hz;
        let angle = 2.0 * PI * harmonic * frequency_hz * t;
        if col % 2 == 0 { angle.sin() } else { angle.cos() }
    });

    SignalMatrix::from_samples(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_shapes() {
        let bank = build_reference_bank(256.0, 512, &[8.0, 10.0, 12.0], 2).unwrap();

        assert_eq!(bank.len(), 3);
        assert_eq!(bank.frequencies(), vec![8.0, 10.0, 12.0]);
        for m in bank.matrices() {
            assert_eq!(m.dim(), (512, 4));
        }
    }

    #[test]
    fn test_column_interleaving() {
        let reference = reference_signal(250.0, 250, 10.0, 2).unwrap();
        let v = reference.view();

        // t = 0
        assert!(v[[0, 0]].abs() < 1e-12);
        assert!((v[[0, 1]] - 1.0).abs() < 1e-12);
        assert!(v[[0, 2]].abs() < 1e-12);
        assert!((v[[0, 3]] - 1.0).abs() < 1e-12);

        // sample 25 is one full 10 Hz period
        assert!(v[[25, 0]].abs() < 1e-9);

        let t = 3.0 / 250.0;
        assert!((v[[3, 2]] - (2.0 * PI * 20.0 * t).sin()).abs() < 1e-12);
        assert!((v[[3, 3]] - (2.0 * PI * 20.0 * t).cos()).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(build_reference_bank(0.0, 512, &[10.0], 2).is_err());
        assert!(build_reference_bank(256.0, 0, &[10.0], 2).is_err());
        assert!(build_reference_bank(256.0, 512, &[], 2).is_err());
        assert!(build_reference_bank(256.0, 512, &[10.0, 10.0], 2).is_err());
        assert!(build_reference_bank(256.0, 512, &[10.0], 0).is_err());
    }

    #[test]
    fn test_deterministic() {
        let a = build_reference_bank(256.0, 128, &[8.0, 15.0], 3).unwrap();
        let b = build_reference_bank(256.0, 128, &[8.0, 15.0], 3).unwrap();
        assert_eq!(a, b);
    }
}
