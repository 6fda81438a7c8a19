//! Fusion CCA: every canonical correlation contributes, weighted by rank
//!
//! For coefficients `ρ_1 >= ρ_2 >= ... >= ρ_n` the score of a frequency is
//! `Σ_k (k^(-a) + b) · ρ_k²`.

use crate::cca::{canonical_correlation, CcaOptions};
use crate::config::SsvepConfig;
use crate::error::SsvepResult;
use crate::signal::{ReferenceBank, SignalMatrix};
use super::{weighted_scores, FrequencyDetector};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoccaDetector {
    options: CcaOptions,
    weight_a: f64,
    weight_b: f64,
}

impl FoccaDetector {
    pub fn new(options: CcaOptions, weight_a: f64, weight_b: f64) -> Self {
        Self {
            options,
            weight_a,
            weight_b,
        }
    }

    pub fn from_config(config: &SsvepConfig) -> Self {
        Self::new(config.cca_options(), config.fusion.weight_a, config.fusion.weight_b)
    }

    /// Same detector with different fusion weights
    pub fn with_weights(self, weight_a: f64, weight_b: f64) -> Self {
        Self {
            weight_a,
            weight_b,
            ..self
        }
    }

    /// Squared canonical correlations per bank frequency, strongest first
    pub fn fusion_components(&self, trial: &SignalMatrix, bank: &ReferenceBank) -> SsvepResult<Vec<Vec<f64>>> {
        bank.matrices()
            .map(|reference| canonical_correlation(trial, reference, &self.options).map(|rho| rho.squared()))
            .collect()
    }
}

impl FrequencyDetector for FoccaDetector {
    fn score_trial(&self, trial: &SignalMatrix, bank: &ReferenceBank) -> SsvepResult<Vec<f64>> {
        let components = self.fusion_components(trial, bank)?;
        Ok(weighted_scores(&components, self.weight_a, self.weight_b))
    }

    fn name(&self) -> &str {
        "focca"
    }
}
