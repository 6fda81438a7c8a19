// src/config/constants.rs
//! Library-wide constants and configuration defaults

/// Acquisition-side defaults
pub mod signal {
    pub const DEFAULT_SAMPLING_RATE_HZ: f64 = 256.0;
    pub const DEFAULT_CHANNELS: [usize; 1] = [0];
    pub const MIN_SAMPLES_PER_TRIAL: usize = 2;
}

/// Stimulus and reference defaults
pub mod reference {
    pub const DEFAULT_STIMULUS_FREQUENCIES_HZ: [f64; 4] = [8.0, 10.0, 12.0, 15.0];
    pub const DEFAULT_NUM_HARMONICS: usize = 2;
    pub const MAX_HARMONICS: usize = 10;
}

/// Tolerances for the covariance and eigen solvers
pub mod numerics {
    /// Diagonal loading added to auto-covariance blocks
    pub const DEFAULT_REGULARIZATION: f64 = f64::EPSILON;
    pub const EIGEN_TOLERANCE: f64 = f64::EPSILON;
    pub const EIGEN_MAX_ITERATIONS: usize = 10_000;
    /// Imaginary parts above this fraction of the largest eigenvalue are reported
    pub const COMPLEX_EIGENVALUE_TOLERANCE: f64 = 1e-8;
    /// Columns with variance at or below this fraction of the largest variance are flagged
    pub const DEGENERATE_VARIANCE_RATIO: f64 = 1e-12;
    /// Regularized auto-covariance eigenvalues at or below this fraction of the
    /// block's largest eigenvalue are treated as zero
    pub const SINGULAR_CONDITION_RATIO: f64 = 1e-10;
}

/// Butterworth and notch filter defaults
pub mod filters {
    pub const DEFAULT_FILTER_ORDER: usize = 4;
    pub const MIN_FILTER_ORDER: usize = 1;
    pub const MAX_FILTER_ORDER: usize = 8;
    pub const DEFAULT_LOW_CUTOFF_HZ: f64 = 6.0;
    pub const DEFAULT_HIGH_CUTOFF_HZ: f64 = 50.0;
    pub const POWERLINE_FREQ_50HZ: f64 = 50.0;
    pub const POWERLINE_FREQ_60HZ: f64 = 60.0;
    pub const DEFAULT_QUALITY_FACTOR: f64 = 30.0;
}

/// Filter-bank (FBCCA) defaults
pub mod filter_bank {
    pub const DEFAULT_SUB_BANDS_HZ: [[f64; 2]; 3] = [[6.0, 50.0], [14.0, 50.0], [22.0, 50.0]];
    pub const DEFAULT_WEIGHT_A: f64 = 1.25;
    pub const DEFAULT_WEIGHT_B: f64 = 0.25;
}

/// Weight sweep grids for the fusion and filter-bank detectors
pub mod fusion {
    pub const DEFAULT_WEIGHT_A: f64 = 1.25;
    pub const DEFAULT_WEIGHT_B: f64 = 0.25;
    pub const DEFAULT_A_VALUES: [f64; 5] = [0.0, 0.5, 1.0, 1.25, 1.5];
    pub const DEFAULT_B_VALUES: [f64; 4] = [0.0, 0.25, 0.5, 1.0];
}

/// Configuration file discovery
pub mod paths {
    pub const DEFAULT_CONFIG_FILE: &str = "config/ssvep.toml";
    pub const LOCAL_CONFIG_FILE: &str = "ssvep.toml";
    pub const ENV_PREFIX: &str = "SSVEP_";
    pub const ENV_SEPARATOR: &str = "__";
}
