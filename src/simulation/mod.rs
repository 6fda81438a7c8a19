// src/simulation/mod.rs
//! Synthetic SSVEP trials for tests, benchmarks and demos

pub mod generator;

pub use generator::SsvepSimulator;

use serde::{Deserialize, Serialize};
use crate::config::constants::{filters, signal};
use crate::utils::validation::{
    validate_below_nyquist, validate_positive, validate_range, ValidationError, ValidationResult,
};

/// Simulator configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SimulatorConfig {
    pub sampling_rate_hz: f64,
    pub num_samples: usize,
    pub num_channels: usize,
    /// Amplitude of the stimulus fundamental
    pub signal_amplitude: f64,
    /// Each further harmonic is scaled by this factor relative to the previous one
    pub harmonic_decay: f64,
    pub num_harmonics: usize,
    /// Standard deviation of the additive white Gaussian noise
    pub noise_std: f64,
    pub powerline_frequency_hz: f64,
    pub powerline_amplitude: f64,
    /// Phase lag between neighbouring channels, in radians
    pub channel_phase_step: f64,
    pub seed: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            sampling_rate_hz: signal::DEFAULT_SAMPLING_RATE_HZ,
            num_samples: 512,
            num_channels: 4,
            signal_amplitude: 1.0,
            harmonic_decay: 0.5,
            num_harmonics: 2,
            noise_std: 0.5,
            powerline_frequency_hz: filters::POWERLINE_FREQ_50HZ,
            powerline_amplitude: 0.0,
            channel_phase_step: 0.35,
            seed: 42,
        }
    }
}

impl SimulatorConfig {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_positive(self.sampling_rate_hz, "sampling_rate_hz")?;
        validate_range(self.num_samples, signal::MIN_SAMPLES_PER_TRIAL, usize::MAX, "num_samples")?;
        validate_range(self.num_channels, 1, usize::MAX, "num_channels")?;
        validate_range(self.num_harmonics, 1, usize::MAX, "num_harmonics")?;

        for (value, field) in [
            (self.signal_amplitude, "signal_amplitude"),
            (self.harmonic_decay, "harmonic_decay"),
            (self.noise_std, "noise_std"),
            (self.powerline_amplitude, "powerline_amplitude"),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::NotFinite { field: field.to_string() });
            }
            validate_range(value, 0.0, f64::MAX, field)?;
        }
        if self.powerline_amplitude > 0.0 {
            validate_below_nyquist(self.powerline_frequency_hz, self.sampling_rate_hz, "powerline_frequency_hz")?;
        }

        Ok(())
    }
}
