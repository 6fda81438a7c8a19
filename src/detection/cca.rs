//! Standard CCA detector: the frequency whose reference set correlates best wins

use tracing::warn;
use crate::cca::{canonical_correlation, CcaOptions};
use crate::error::SsvepResult;
use crate::signal::{ReferenceBank, SignalMatrix};
use super::FrequencyDetector;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CcaDetector {
    options: CcaOptions,
}

impl CcaDetector {
    pub fn new(options: CcaOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CcaOptions {
        &self.options
    }
}

impl FrequencyDetector for CcaDetector {
    fn score_trial(&self, trial: &SignalMatrix, bank: &ReferenceBank) -> SsvepResult<Vec<f64>> {
        bank.iter()
            .map(|(frequency_hz, reference)| {
                let result = canonical_correlation(trial, reference, &self.options)?;
                if !result.warnings().is_empty() {
                    warn!(frequency_hz, warnings = result.warnings().len(), "scoring with degraded coefficients");
                }
                Ok(result.max())
            })
            .collect()
    }

    fn name(&self) -> &str {
        "cca"
    }
}
