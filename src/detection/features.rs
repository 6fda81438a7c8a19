//! Canonical correlation feature vectors for downstream classifiers

use ndarray::Array2;
use tracing::debug;
use crate::cca::{canonical_correlation, CcaOptions};
use crate::error::{SsvepError, SsvepResult};
use crate::error_context;
use crate::signal::{ReferenceBank, TrialSet};
use super::check_bank;

/// One row per trial holding the full coefficient vector of every bank
/// frequency, concatenated in bank order: `trials x (frequencies · n)` with
/// `n = min(channels, 2 · harmonics)`
pub fn extract_features(
    trials: &TrialSet,
    channels: &[usize],
    bank: &ReferenceBank,
    options: &CcaOptions,
) -> SsvepResult<Array2<f64>> {
    check_bank(trials, bank)?;

    let mut rows = Vec::with_capacity(trials.num_trials());
    for idx in 0..trials.num_trials() {
        let trial = trials.trial_channels(idx, channels)?;
        let mut row = Vec::new();
        for reference in bank.matrices() {
            row.extend(canonical_correlation(&trial, reference, options)?.into_values());
        }
        rows.push(row);
    }

    let width = rows.first().map_or(0, Vec::len);
    debug!(trials = rows.len(), features = width, "extracted canonical correlation features");

    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((trials.num_trials(), width), flat).map_err(|e| {
        SsvepError::shape(
            error_context!("features", "extract_features"),
            format!("{} features per trial", width),
            e.to_string(),
        )
    })
}
