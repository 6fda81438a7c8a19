//! Multivariate synchronization index (MSI)
//!
//! Both views are whitened with `C^(-1/2)`, giving the joint correlation
//! matrix `R = [[I, Rxy], [Ryx, I]]`. With `λ'` the eigenvalues of `R`
//! normalized to sum to one and `P` the total column count,
//! `S = 1 + Σ λ' ln λ' / ln P` lies in [0, 1] and grows with synchronization.

use ndarray::{concatenate, s, Array2, Axis};
use crate::config::constants::numerics::DEFAULT_REGULARIZATION;
use crate::error::{SsvepError, SsvepResult};
use crate::error_context;
use crate::linalg::{covariance, inverse_sqrt_symmetric, symmetric_eigenvalues, CovarianceBlocks};
use crate::signal::{ReferenceBank, SignalMatrix};
use super::FrequencyDetector;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MsiDetector {
    regularization: f64,
}

impl MsiDetector {
    pub fn new(regularization: f64) -> Self {
        Self { regularization }
    }
}

impl Default for MsiDetector {
    fn default() -> Self {
        Self::new(DEFAULT_REGULARIZATION)
    }
}

impl FrequencyDetector for MsiDetector {
    fn score_trial(&self, trial: &SignalMatrix, bank: &ReferenceBank) -> SsvepResult<Vec<f64>> {
        bank.matrices()
            .map(|reference| synchronization_index(trial, reference, self.regularization))
            .collect()
    }

    fn name(&self) -> &str {
        "msi"
    }
}

/// Synchronization index between a trial and one reference set
pub fn synchronization_index(
    signal: &SignalMatrix,
    reference: &SignalMatrix,
    regularization: f64,
) -> SsvepResult<f64> {
    if signal.samples() != reference.samples() {
        return Err(SsvepError::shape(
            error_context!("msi", "synchronization_index"),
            format!("{} reference samples (matching the signal)", signal.samples()),
            format!("{} reference samples", reference.samples()),
        ));
    }
    if !(regularization > 0.0) || !regularization.is_finite() {
        return Err(SsvepError::parameter(
            error_context!("msi", "synchronization_index"),
            "regularization",
            format!("must be finite and positive, got {}", regularization),
        ));
    }

    let channels = signal.channels();
    let total = channels + reference.channels();

    let joint = concatenate(Axis(1), &[signal.view(), reference.view()]).map_err(|e| {
        SsvepError::shape(
            error_context!("msi", "concatenate"),
            "views with equal sample counts",
            e.to_string(),
        )
    })?;
    let blocks = CovarianceBlocks::partition(&covariance(joint.view())?, channels);

    let whiten_x = inverse_sqrt_symmetric(&blocks.cx, regularization)?;
    let whiten_y = inverse_sqrt_symmetric(&blocks.cy, regularization)?;
    let r_xy = whiten_x.dot(&blocks.cxy).dot(&whiten_y);

    let mut r = Array2::<f64>::eye(total);
    r.slice_mut(s![..channels, channels..]).assign(&r_xy);
    r.slice_mut(s![channels.., ..channels]).assign(&r_xy.t());

    let eigenvalues: Vec<f64> = symmetric_eigenvalues(&r)?
        .into_iter()
        .map(|lambda| lambda.max(regularization))
        .collect();
    let sum: f64 = eigenvalues.iter().sum();

    let entropy: f64 = eigenvalues
        .iter()
        .map(|lambda| lambda / sum)
        .map(|p| p * p.ln())
        .sum();

    Ok((1.0 + entropy / (total as f64).ln()).clamp(0.0, 1.0))
}
