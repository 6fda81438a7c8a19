//! Filter-bank CCA
//!
//! The trial is band-filtered once per sub-band; each sub-band contributes the
//! square of its largest canonical correlation, weighted by `sb^(-a) + b`
//! where `sb` is the 1-based sub-band index.

use tracing::debug;
use crate::cca::{canonical_correlation, CcaOptions};
use crate::config::SsvepConfig;
use crate::error::SsvepResult;
use crate::filters::FilterSettings;
use crate::signal::{ReferenceBank, SignalMatrix};
use super::{weighted_scores, FrequencyDetector};

#[derive(Debug, Clone, PartialEq)]
pub struct FbccaDetector {
    options: CcaOptions,
    filter: FilterSettings,
    sub_bands_hz: Vec<[f64; 2]>,
    sampling_rate_hz: f64,
    weight_a: f64,
    weight_b: f64,
}

impl FbccaDetector {
    pub fn new(
        options: CcaOptions,
        filter: FilterSettings,
        sub_bands_hz: Vec<[f64; 2]>,
        sampling_rate_hz: f64,
        weight_a: f64,
        weight_b: f64,
    ) -> Self {
        Self {
            options,
            filter,
            sub_bands_hz,
            sampling_rate_hz,
            weight_a,
            weight_b,
        }
    }

    pub fn from_config(config: &SsvepConfig) -> Self {
        Self::new(
            config.cca_options(),
            config.filtering.clone(),
            config.filter_bank.sub_bands_hz.clone(),
            config.analysis.sampling_rate_hz,
            config.filter_bank.weight_a,
            config.filter_bank.weight_b,
        )
    }

    /// Same detector with different sub-band weights
    pub fn with_weights(self, weight_a: f64, weight_b: f64) -> Self {
        Self {
            weight_a,
            weight_b,
            ..self
        }
    }

    pub fn sub_bands_hz(&self) -> &[[f64; 2]] {
        &self.sub_bands_hz
    }

    /// Squared largest canonical correlation per bank frequency and sub-band,
    /// indexed `[frequency][sub_band]`
    pub fn sub_band_components(&self, trial: &SignalMatrix, bank: &ReferenceBank) -> SsvepResult<Vec<Vec<f64>>> {
        let mut components = vec![Vec::with_capacity(self.sub_bands_hz.len()); bank.len()];

        for &[low_hz, high_hz] in &self.sub_bands_hz {
            let filtered = self.filter.apply_band(trial, self.sampling_rate_hz, low_hz, high_hz)?;
            for (freq_idx, reference) in bank.matrices().enumerate() {
                let rho = canonical_correlation(&filtered, reference, &self.options)?;
                components[freq_idx].push(rho.squared().first().copied().unwrap_or(0.0));
            }
        }

        debug!(sub_bands = self.sub_bands_hz.len(), frequencies = bank.len(), "scored filter bank");
        Ok(components)
    }
}

impl FrequencyDetector for FbccaDetector {
    fn score_trial(&self, trial: &SignalMatrix, bank: &ReferenceBank) -> SsvepResult<Vec<f64>> {
        let components = self.sub_band_components(trial, bank)?;
        Ok(weighted_scores(&components, self.weight_a, self.weight_b))
    }

    fn name(&self) -> &str {
        "fbcca"
    }
}
