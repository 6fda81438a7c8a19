//! Grid search over the fusion weights `k^(-a) + b`
//!
//! Component scores (squared correlations per rank or per sub-band) do not
//! depend on the weights, so they are computed once per trial and only the
//! weighted sums are redone for each (a, b) pair.

use serde::Serialize;
use tracing::info;
use crate::cca::CcaOptions;
use crate::config::SsvepConfig;
use crate::error::{SsvepError, SsvepResult};
use crate::error_context;
use crate::filters::FilterSettings;
use crate::signal::{ReferenceBank, TrialSet};
use super::{argmax, check_bank, weighted_scores, FbccaDetector, FoccaDetector};
use super::metrics::accuracy_percent;

/// Which weighted detector is tuned
#[derive(Debug, Clone, PartialEq)]
pub enum SweepMethod {
    /// FoCCA: weights over canonical correlation ranks
    Fusion,
    /// FBCCA: weights over filter-bank sub-bands
    FilterBank {
        filter: FilterSettings,
        sub_bands_hz: Vec<[f64; 2]>,
        sampling_rate_hz: f64,
    },
}

/// Accuracy at one grid point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepPoint {
    pub a: f64,
    pub b: f64,
    pub accuracy_percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightSweep {
    method: SweepMethod,
    options: CcaOptions,
    a_values: Vec<f64>,
    b_values: Vec<f64>,
}

impl WeightSweep {
    pub fn new(method: SweepMethod, options: CcaOptions, a_values: Vec<f64>, b_values: Vec<f64>) -> Self {
        Self {
            method,
            options,
            a_values,
            b_values,
        }
    }

    /// Fusion sweep over the configured grids
    pub fn fusion(config: &SsvepConfig) -> Self {
        Self::new(
            SweepMethod::Fusion,
            config.cca_options(),
            config.fusion.a_values.clone(),
            config.fusion.b_values.clone(),
        )
    }

    /// Filter-bank sweep over the configured grids and sub-bands
    pub fn filter_bank(config: &SsvepConfig) -> Self {
        Self::new(
            SweepMethod::FilterBank {
                filter: config.filtering.clone(),
                sub_bands_hz: config.filter_bank.sub_bands_hz.clone(),
                sampling_rate_hz: config.analysis.sampling_rate_hz,
            },
            config.cca_options(),
            config.fusion.a_values.clone(),
            config.fusion.b_values.clone(),
        )
    }

    /// Accuracy for every (a, b) pair, `a` varying slowest
    pub fn run(
        &self,
        trials: &TrialSet,
        labels: &[usize],
        channels: &[usize],
        bank: &ReferenceBank,
    ) -> SsvepResult<Vec<SweepPoint>> {
        check_bank(trials, bank)?;
        if labels.len() != trials.num_trials() {
            return Err(SsvepError::shape(
                error_context!("weight_sweep", "run"),
                format!("{} labels", trials.num_trials()),
                format!("{} labels", labels.len()),
            ));
        }
        if self.a_values.is_empty() || self.b_values.is_empty() {
            return Err(SsvepError::parameter(
                error_context!("weight_sweep", "run"),
                "a_values",
                "sweep grids must not be empty",
            ));
        }

        let components = (0..trials.num_trials())
            .map(|idx| {
                let trial = trials.trial_channels(idx, channels)?;
                match &self.method {
                    SweepMethod::Fusion => {
                        FoccaDetector::new(self.options, 0.0, 0.0).fusion_components(&trial, bank)
                    }
                    SweepMethod::FilterBank { filter, sub_bands_hz, sampling_rate_hz } => FbccaDetector::new(
                        self.options,
                        filter.clone(),
                        sub_bands_hz.clone(),
                        *sampling_rate_hz,
                        0.0,
                        0.0,
                    )
                    .sub_band_components(&trial, bank),
                }
            })
            .collect::<SsvepResult<Vec<_>>>()?;

        let mut points = Vec::with_capacity(self.a_values.len() * self.b_values.len());
        for &a in &self.a_values {
            for &b in &self.b_values {
                let predictions: Vec<usize> = components
                    .iter()
                    .map(|trial_components| argmax(&weighted_scores(trial_components, a, b)).unwrap_or(0))
                    .collect();
                let accuracy = accuracy_percent(labels, &predictions)?;

                info!(a, b, accuracy_percent = accuracy, "weight sweep point");
                points.push(SweepPoint {
                    a,
                    b,
                    accuracy_percent: accuracy,
                });
            }
        }

        Ok(points)
    }
}

/// Grid point with the highest accuracy (earliest on ties)
pub fn best_point(points: &[SweepPoint]) -> Option<SweepPoint> {
    let accuracies: Vec<f64> = points.iter().map(|p| p.accuracy_percent).collect();
    argmax(&accuracies).map(|idx| points[idx])
}
