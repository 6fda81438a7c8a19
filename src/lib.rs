//! SSVEP-Core: canonical-correlation frequency detection for SSVEP brain-computer interfaces
//!
//! A steady-state visual evoked potential (SSVEP) is the EEG response to a
//! flickering stimulus; it oscillates at the flicker frequency and its
//! harmonics. This library decides which of several stimulus frequencies a
//! subject attends to by correlating each trial with sine/cosine reference
//! sets. It provides:
//!
//! - A canonical correlation solver with an explicit coefficient convention
//!   and numerical warnings as values
//! - Reference bank construction and labeled-axis signal containers
//! - CCA, fusion (FoCCA), filter-bank (FBCCA) and MSI detectors
//! - Zero-phase Butterworth and notch filtering, common average referencing
//! - Layered TOML/environment configuration and a seeded trial simulator
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ssvep_core::cca::{canonical_correlation, CcaOptions, CoefficientConvention};
//! use ssvep_core::signal::build_reference_bank;
//! use ssvep_core::simulation::{SimulatorConfig, SsvepSimulator};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut simulator = SsvepSimulator::new(SimulatorConfig::default())?;
//!     let trial = simulator.generate_trial(10.0)?;
//!
//!     let bank = build_reference_bank(256.0, trial.samples(), &[8.0, 10.0, 12.0], 2)?;
//!     let options = CcaOptions::new(CoefficientConvention::Correlation);
//!
//!     for (frequency, reference) in bank.iter() {
//!         let rho = canonical_correlation(&trial, reference, &options)?;
//!         println!("{frequency} Hz: {:.3}", rho.max());
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod cca;
pub mod config;
pub mod detection;
pub mod error;
pub mod filters;
pub mod linalg;
pub mod signal;
pub mod simulation;
pub mod utils;

// Re-export commonly used types for convenience
pub use cca::{canonical_correlation, CanonicalCorrelation, CcaOptions, CoefficientConvention, NumericalWarning};
pub use config::{ConfigLoader, SsvepConfig};
pub use detection::{
    accuracy_percent, extract_features, CcaDetector, FbccaDetector, FoccaDetector, FrequencyDetector,
    MsiDetector, WeightSweep,
};
pub use error::{SsvepError, SsvepResult};
pub use signal::{build_reference_bank, Orientation, ReferenceBank, SignalMatrix, TrialLayout, TrialSet};
pub use utils::validation::{ValidationError, ValidationResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: "Canonical-correlation SSVEP frequency detection".to_string(),
        features: vec![
            "Canonical correlation analysis".to_string(),
            "CCA, FoCCA, FBCCA and MSI detectors".to_string(),
            "Zero-phase Butterworth and notch filtering".to_string(),
            "Layered TOML configuration".to_string(),
        ],
    }
}

/// Library version information
#[derive(Debug, Clone)]
pub struct VersionInfo {
    /// Library name
    pub name: String,
    /// Version string
    pub version: String,
    /// Description
    pub description: String,
    /// List of features
    pub features: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        let info = version_info();
        assert_eq!(info.name, NAME);
        assert_eq!(info.version, VERSION);
        assert!(!info.features.is_empty());
    }

    #[test]
    fn test_constants() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "ssvep-core");
    }
}
