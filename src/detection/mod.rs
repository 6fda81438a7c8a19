// src/detection/mod.rs
//! Stimulus frequency detection over trials
//!
//! Every detector scores each frequency of a [`ReferenceBank`] for one trial
//! and picks the highest score. Labels are indices into the bank's frequency
//! list.
//!
//! - [`CcaDetector`]: largest canonical correlation
//! - [`FoccaDetector`]: weighted fusion of all canonical correlations
//! - [`FbccaDetector`]: weighted fusion over filter-bank sub-bands
//! - [`MsiDetector`]: multivariate synchronization index

pub mod cca;
pub mod fbcca;
pub mod features;
pub mod focca;
pub mod metrics;
pub mod msi;
pub mod sweep;

pub use cca::CcaDetector;
pub use fbcca::FbccaDetector;
pub use features::extract_features;
pub use focca::FoccaDetector;
pub use metrics::accuracy_percent;
pub use msi::{synchronization_index, MsiDetector};
pub use sweep::{best_point, SweepMethod, SweepPoint, WeightSweep};

use crate::config::SsvepConfig;
use crate::error::{ProcessingStage, SsvepError, SsvepErrorBuilder, SsvepResult};
use crate::error_context;
use crate::signal::{common_average_reference, ReferenceBank, SignalMatrix, TrialSet};

/// A per-trial stimulus frequency classifier
pub trait FrequencyDetector {
    /// One score per bank frequency, in bank order
    fn score_trial(&self, trial: &SignalMatrix, bank: &ReferenceBank) -> SsvepResult<Vec<f64>>;

    fn name(&self) -> &str;

    /// Index of the best-scoring bank frequency
    fn predict_trial(&self, trial: &SignalMatrix, bank: &ReferenceBank) -> SsvepResult<usize> {
        let scores = self.score_trial(trial, bank)?;
        argmax(&scores).ok_or_else(|| {
            SsvepErrorBuilder::new(self.name(), "predict_trial")
                .processing(ProcessingStage::Classification, "no frequency scores to classify")
        })
    }

    /// Predicted labels for every trial, using the selected channels
    fn predict(&self, trials: &TrialSet, channels: &[usize], bank: &ReferenceBank) -> SsvepResult<Vec<usize>> {
        check_bank(trials, bank)?;
        (0..trials.num_trials())
            .map(|idx| {
                let trial = trials.trial_channels(idx, channels)?;
                self.predict_trial(&trial, bank)
            })
            .collect()
    }
}

/// Fusion weights `k^(-a) + b` for `k = 1..=count`
pub fn fusion_weights(count: usize, a: f64, b: f64) -> Vec<f64> {
    (1..=count).map(|k| (k as f64).powf(-a) + b).collect()
}

/// Weighted sum of per-frequency components: `Σ_k weights[k] · components[k]`
pub(crate) fn weighted_scores(components: &[Vec<f64>], a: f64, b: f64) -> Vec<f64> {
    components
        .iter()
        .map(|terms| {
            fusion_weights(terms.len(), a, b)
                .iter()
                .zip(terms)
                .map(|(w, t)| w * t)
                .sum()
        })
        .collect()
}

/// First index of the largest value
pub fn argmax(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (idx, &value)| match best {
            Some((_, top)) if value <= top => best,
            _ => Some((idx, value)),
        })
        .map(|(idx, _)| idx)
}

/// Re-reference and filter every trial as configured
pub fn preprocess(trials: &TrialSet, config: &SsvepConfig) -> SsvepResult<TrialSet> {
    let analysis = &config.analysis;
    let filtering = &config.filtering;

    trials.map_trials(|trial| {
        let trial = if analysis.common_average_reference {
            common_average_reference(trial, analysis.car_reference_channel)?
        } else {
            trial.clone()
        };
        if filtering.enabled || filtering.notch_enabled {
            filtering.apply(&trial, analysis.sampling_rate_hz)
        } else {
            Ok(trial)
        }
    })
}

pub(crate) fn check_bank(trials: &TrialSet, bank: &ReferenceBank) -> SsvepResult<()> {
    if trials.num_samples() != bank.num_samples() {
        return Err(SsvepError::shape(
            error_context!("detection", "check_bank"),
            format!("{} samples per trial (reference bank length)", bank.num_samples()),
            format!("{} samples per trial", trials.num_samples()),
        ));
    }
    Ok(())
}
