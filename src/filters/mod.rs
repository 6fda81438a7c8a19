// src/filters/mod.rs
//! Zero-phase Butterworth and notch filtering for EEG trials

pub mod iir;
pub mod notch;

pub use iir::{Biquad, IirFilter};
pub use notch::NotchFilter;

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use crate::config::constants::filters::{MAX_FILTER_ORDER, MIN_FILTER_ORDER};
use crate::config::defaults;
use crate::error::SsvepResult;
use crate::signal::SignalMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandType {
    /// Passes below the upper edge
    Lowpass,
    /// Passes above the lower edge
    Highpass,
    Bandpass,
    Bandstop,
}

/// Filter design and application errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Processing error: {0}")]
    ProcessingError(String),
}

/// Band and notch filter settings applied before correlation analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSettings {
    #[serde(default = "defaults::filter_enabled")]
    pub enabled: bool,

    #[serde(default = "defaults::notch_enabled")]
    pub notch_enabled: bool,

    #[serde(default = "defaults::filter_order")]
    pub order: usize,

    #[serde(default = "default_band_type")]
    pub band_type: BandType,

    #[serde(default = "defaults::low_cutoff_hz")]
    pub low_cutoff_hz: f64,

    #[serde(default = "defaults::high_cutoff_hz")]
    pub high_cutoff_hz: f64,

    #[serde(default = "defaults::notch_frequency_hz")]
    pub notch_frequency_hz: f64,

    #[serde(default = "defaults::quality_factor")]
    pub quality_factor: f64,
}

fn default_band_type() -> BandType {
    BandType::Bandpass
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            enabled: defaults::filter_enabled(),
            notch_enabled: defaults::notch_enabled(),
            order: defaults::filter_order(),
            band_type: default_band_type(),
            low_cutoff_hz: defaults::low_cutoff_hz(),
            high_cutoff_hz: defaults::high_cutoff_hz(),
            notch_frequency_hz: defaults::notch_frequency_hz(),
            quality_factor: defaults::quality_factor(),
        }
    }
}

impl FilterSettings {
    /// Settings that leave signals untouched
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            notch_enabled: false,
            ..Self::default()
        }
    }

    /// Consistency problems for the given sampling rate, empty when valid
    pub fn consistency_errors(&self, sampling_rate_hz: f64) -> Vec<String> {
        let mut errors = Vec::new();
        let nyquist = sampling_rate_hz / 2.0;

        if self.enabled {
            if self.order < MIN_FILTER_ORDER || self.order > MAX_FILTER_ORDER {
                errors.push(format!(
                    "Filter order must be {}-{}, got {}",
                    MIN_FILTER_ORDER, MAX_FILTER_ORDER, self.order
                ));
            }
            let (low, high) = (self.low_cutoff_hz, self.high_cutoff_hz);
            let edges_ok = match self.band_type {
                BandType::Lowpass => high > 0.0 && high < nyquist,
                BandType::Highpass => low > 0.0 && low < nyquist,
                BandType::Bandpass | BandType::Bandstop => low > 0.0 && low < high && high < nyquist,
            };
            if !edges_ok {
                errors.push(format!(
                    "{:?} cutoffs [{}, {}] Hz are invalid for Nyquist frequency {} Hz",
                    self.band_type, low, high, nyquist
                ));
            }
        }

        if self.notch_enabled {
            if self.notch_frequency_hz <= 0.0 || self.notch_frequency_hz >= nyquist {
                errors.push(format!(
                    "Notch filter frequency ({} Hz) must be less than Nyquist frequency ({} Hz)",
                    self.notch_frequency_hz, nyquist
                ));
            }
            if !(self.quality_factor > 0.0) {
                errors.push(format!("Quality factor must be positive, got {}", self.quality_factor));
            }
        }

        errors
    }

    /// Design the filter chain (notch first) using the configured cutoffs
    pub fn design(&self, sampling_rate_hz: f64) -> Result<Vec<IirFilter>, FilterError> {
        self.design_band(sampling_rate_hz, self.low_cutoff_hz, self.high_cutoff_hz)
    }

    /// Design the filter chain with the band edges replaced by `low_hz`/`high_hz`
    pub fn design_band(
        &self,
        sampling_rate_hz: f64,
        low_hz: f64,
        high_hz: f64,
    ) -> Result<Vec<IirFilter>, FilterError> {
        let mut chain = Vec::with_capacity(2);

        if self.notch_enabled {
            chain.push(NotchFilter::new(self.notch_frequency_hz, self.quality_factor, sampling_rate_hz)?.into_iir());
        }
        if self.enabled {
            chain.push(IirFilter::butterworth(self.order, self.band_type, low_hz, high_hz, sampling_rate_hz)?);
        }

        debug!(
            stages = chain.len(),
            band_type = ?self.band_type,
            low_hz,
            high_hz,
            "designed filter chain"
        );
        Ok(chain)
    }

    /// Zero-phase filter every channel of `signal`
    pub fn apply(&self, signal: &SignalMatrix, sampling_rate_hz: f64) -> SsvepResult<SignalMatrix> {
        let chain = self.design(sampling_rate_hz)?;
        apply_zero_phase(signal, &chain)
    }

    /// Zero-phase filter every channel of `signal` with the given band edges
    pub fn apply_band(
        &self,
        signal: &SignalMatrix,
        sampling_rate_hz: f64,
        low_hz: f64,
        high_hz: f64,
    ) -> SsvepResult<SignalMatrix> {
        let chain = self.design_band(sampling_rate_hz, low_hz, high_hz)?;
        apply_zero_phase(signal, &chain)
    }
}

/// Run each filter forward and backward over every channel, in chain order
pub fn apply_zero_phase(signal: &SignalMatrix, chain: &[IirFilter]) -> SsvepResult<SignalMatrix> {
    if chain.is_empty() {
        return Ok(signal.clone());
    }

    let mut data = Array2::<f64>::zeros(signal.dim());
    for (idx, mut column) in data.axis_iter_mut(Axis(1)).enumerate() {
        let mut channel: Vec<f64> = signal.view().column(idx).to_vec();
        for filter in chain {
            channel = filter.filtfilt(&channel);
        }
        column.assign(&ndarray::ArrayView1::from(&channel[..]));
    }

    SignalMatrix::from_samples(data)
}
