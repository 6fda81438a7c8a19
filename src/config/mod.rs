// src/config/mod.rs
//! Analysis configuration
//!
//! [`SsvepConfig`] gathers everything a detection run needs: acquisition
//! parameters, the stimulus set, filter settings, filter-bank sub-bands and
//! the fusion weights. Every field has a default backed by [`constants`], so
//! a partial TOML file is enough.

pub mod constants;
pub mod loader;

pub use constants::*;
pub use loader::{ConfigError, ConfigLoader};

use serde::{Deserialize, Serialize};
use crate::cca::{CcaOptions, CoefficientConvention};
use crate::error::SsvepResult;
use crate::filters::FilterSettings;
use crate::signal::{build_reference_bank, ReferenceBank};

/// Complete analysis configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct SsvepConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub filtering: FilterSettings,

    #[serde(default)]
    pub filter_bank: FilterBankConfig,

    #[serde(default)]
    pub fusion: FusionConfig,
}

/// Acquisition, stimulus and solver parameters
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AnalysisConfig {
    #[serde(default = "defaults::sampling_rate_hz")]
    pub sampling_rate_hz: f64,

    #[serde(default = "defaults::stimulus_frequencies_hz")]
    pub stimulus_frequencies_hz: Vec<f64>,

    #[serde(default = "defaults::num_harmonics")]
    pub num_harmonics: usize,

    /// Channel indices analysed in every trial
    #[serde(default = "defaults::channels")]
    pub channels: Vec<usize>,

    #[serde(default = "defaults::convention")]
    pub convention: CoefficientConvention,

    #[serde(default = "defaults::regularization")]
    pub regularization: f64,

    /// Re-reference trials before analysis
    #[serde(default)]
    pub common_average_reference: bool,

    /// Reference channel for CAR; the channel mean when absent
    #[serde(default)]
    pub car_reference_channel: Option<usize>,
}

/// Filter-bank sub-bands and their weighting `k^(-a) + b`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FilterBankConfig {
    #[serde(default = "defaults::sub_bands_hz")]
    pub sub_bands_hz: Vec<[f64; 2]>,

    #[serde(default = "defaults::filter_bank_weight_a")]
    pub weight_a: f64,

    #[serde(default = "defaults::filter_bank_weight_b")]
    pub weight_b: f64,
}

/// Fusion weights and the (a, b) grids swept during tuning
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FusionConfig {
    #[serde(default = "defaults::fusion_weight_a")]
    pub weight_a: f64,

    #[serde(default = "defaults::fusion_weight_b")]
    pub weight_b: f64,

    #[serde(default = "defaults::a_values")]
    pub a_values: Vec<f64>,

    #[serde(default = "defaults::b_values")]
    pub b_values: Vec<f64>,
}

/// Default value providers using constants
pub(crate) mod defaults {
    use crate::cca::CoefficientConvention;
    use crate::config::constants::*;

    pub fn sampling_rate_hz() -> f64 { signal::DEFAULT_SAMPLING_RATE_HZ }
    pub fn stimulus_frequencies_hz() -> Vec<f64> { reference::DEFAULT_STIMULUS_FREQUENCIES_HZ.to_vec() }
    pub fn num_harmonics() -> usize { reference::DEFAULT_NUM_HARMONICS }
    pub fn channels() -> Vec<usize> { signal::DEFAULT_CHANNELS.to_vec() }
    pub fn convention() -> CoefficientConvention { CoefficientConvention::Correlation }
    pub fn regularization() -> f64 { numerics::DEFAULT_REGULARIZATION }

    pub fn sub_bands_hz() -> Vec<[f64; 2]> { filter_bank::DEFAULT_SUB_BANDS_HZ.to_vec() }
    pub fn filter_bank_weight_a() -> f64 { filter_bank::DEFAULT_WEIGHT_A }
    pub fn filter_bank_weight_b() -> f64 { filter_bank::DEFAULT_WEIGHT_B }

    pub fn fusion_weight_a() -> f64 { fusion::DEFAULT_WEIGHT_A }
    pub fn fusion_weight_b() -> f64 { fusion::DEFAULT_WEIGHT_B }
    pub fn a_values() -> Vec<f64> { fusion::DEFAULT_A_VALUES.to_vec() }
    pub fn b_values() -> Vec<f64> { fusion::DEFAULT_B_VALUES.to_vec() }

    pub fn filter_enabled() -> bool { true }
    pub fn notch_enabled() -> bool { true }
    pub fn filter_order() -> usize { filters::DEFAULT_FILTER_ORDER }
    pub fn low_cutoff_hz() -> f64 { filters::DEFAULT_LOW_CUTOFF_HZ }
    pub fn high_cutoff_hz() -> f64 { filters::DEFAULT_HIGH_CUTOFF_HZ }
    pub fn notch_frequency_hz() -> f64 { filters::POWERLINE_FREQ_50HZ }
    pub fn quality_factor() -> f64 { filters::DEFAULT_QUALITY_FACTOR }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sampling_rate_hz: defaults::sampling_rate_hz(),
            stimulus_frequencies_hz: defaults::stimulus_frequencies_hz(),
            num_harmonics: defaults::num_harmonics(),
            channels: defaults::channels(),
            convention: defaults::convention(),
            regularization: defaults::regularization(),
            common_average_reference: false,
            car_reference_channel: None,
        }
    }
}

impl Default for FilterBankConfig {
    fn default() -> Self {
        Self {
            sub_bands_hz: defaults::sub_bands_hz(),
            weight_a: defaults::filter_bank_weight_a(),
            weight_b: defaults::filter_bank_weight_b(),
        }
    }
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            weight_a: defaults::fusion_weight_a(),
            weight_b: defaults::fusion_weight_b(),
            a_values: defaults::a_values(),
            b_values: defaults::b_values(),
        }
    }
}

impl SsvepConfig {
    /// Validate configuration consistency
    pub fn validate_consistency(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let analysis = &self.analysis;

        let fs = analysis.sampling_rate_hz;
        if !fs.is_finite() || fs <= 0.0 {
            errors.push(format!("Sampling rate must be positive, got {} Hz", fs));
        }
        let nyquist = fs / 2.0;

        // Stimulus set
        if analysis.stimulus_frequencies_hz.is_empty() {
            errors.push("At least one stimulus frequency is required".to_string());
        }
        for (i, &freq) in analysis.stimulus_frequencies_hz.iter().enumerate() {
            if !freq.is_finite() || freq <= 0.0 {
                errors.push(format!("Stimulus frequency {} Hz must be positive", freq));
            } else if freq >= nyquist {
                errors.push(format!(
                    "Stimulus frequency ({} Hz) must be less than Nyquist frequency ({} Hz)",
                    freq, nyquist
                ));
            }
            if analysis.stimulus_frequencies_hz[..i].contains(&freq) {
                errors.push(format!("Stimulus frequency {} Hz is listed twice", freq));
            }
        }

        if analysis.num_harmonics == 0 || analysis.num_harmonics > reference::MAX_HARMONICS {
            errors.push(format!(
                "Harmonic count must be between 1 and {}, got {}",
                reference::MAX_HARMONICS, analysis.num_harmonics
            ));
        }

        if analysis.channels.is_empty() {
            errors.push("At least one channel must be selected".to_string());
        }
        for (i, channel) in analysis.channels.iter().enumerate() {
            if analysis.channels[..i].contains(channel) {
                errors.push(format!("Channel {} is selected twice", channel));
            }
        }

        if !analysis.regularization.is_finite() || analysis.regularization < 0.0 {
            errors.push(format!(
                "Regularization must be finite and non-negative, got {}",
                analysis.regularization
            ));
        }

        // Filters
        errors.extend(self.filtering.consistency_errors(fs));

        for (i, [low, high]) in self.filter_bank.sub_bands_hz.iter().enumerate() {
            if !(*low > 0.0 && low < high && *high < nyquist) {
                errors.push(format!(
                    "Sub-band {} [{}, {}] Hz must satisfy 0 < low < high < {} Hz",
                    i + 1, low, high, nyquist
                ));
            }
        }
        if self.filter_bank.sub_bands_hz.is_empty() {
            errors.push("Filter bank needs at least one sub-band".to_string());
        }

        // Weights
        let weights = [
            self.filter_bank.weight_a,
            self.filter_bank.weight_b,
            self.fusion.weight_a,
            self.fusion.weight_b,
        ];
        if weights.iter().any(|w| !w.is_finite()) {
            errors.push("Weight exponents and offsets must be finite".to_string());
        }
        if self.fusion.a_values.is_empty() || self.fusion.b_values.is_empty() {
            errors.push("Fusion sweep grids must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Solver options for the configured convention and regularization
    pub fn cca_options(&self) -> CcaOptions {
        CcaOptions::new(self.analysis.convention)
            .with_regularization(self.analysis.regularization)
    }

    /// Reference bank for trials of `num_samples` samples
    pub fn reference_bank(&self, num_samples: usize) -> SsvepResult<ReferenceBank> {
        build_reference_bank(
            self.analysis.sampling_rate_hz,
            num_samples,
            &self.analysis.stimulus_frequencies_hz,
            self.analysis.num_harmonics,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_creation() {
        let config = SsvepConfig::default();
        assert_eq!(config.analysis.sampling_rate_hz, signal::DEFAULT_SAMPLING_RATE_HZ);
        assert_eq!(config.analysis.stimulus_frequencies_hz, vec![8.0, 10.0, 12.0, 15.0]);
        assert_eq!(config.analysis.convention, CoefficientConvention::Correlation);
        assert!(config.validate_consistency().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = SsvepConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: SsvepConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: SsvepConfig = toml::from_str(
            r#"
[analysis]
num_harmonics = 3
convention = "squared"
"#,
        )
        .unwrap();

        assert_eq!(config.analysis.num_harmonics, 3);
        assert_eq!(config.analysis.convention, CoefficientConvention::Squared);
        assert_eq!(config.analysis.sampling_rate_hz, 256.0);
        assert_eq!(config.filter_bank.sub_bands_hz.len(), 3);
    }

    #[test]
    fn test_config_validation() {
        let mut config = SsvepConfig::default();
        config.analysis.stimulus_frequencies_hz = vec![10.0, 10.0, 200.0];
        config.analysis.channels.clear();

        let errors = config.validate_consistency().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("twice")));
        assert!(errors.iter().any(|e| e.contains("Nyquist")));
        assert!(errors.iter().any(|e| e.contains("channel")));
    }

    #[test]
    fn test_sub_band_ordering() {
        let mut config = SsvepConfig::default();
        config.filter_bank.sub_bands_hz.push([40.0, 20.0]);
        assert!(config.validate_consistency().is_err());
    }

    #[test]
    fn test_reference_bank_helper() {
        let config = SsvepConfig::default();
        let bank = config.reference_bank(512).unwrap();
        assert_eq!(bank.len(), 4);
        assert_eq!(bank.get(0).unwrap().dim(), (512, 4));

        let options = config.cca_options();
        assert_eq!(options.regularization, f64::EPSILON);
    }
}
