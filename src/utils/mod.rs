//! Common utility functions for the SSVEP-Core system
//!
//! All validation limits come from constants defined in the config module.

pub mod validation;

pub use validation::{
    validate_below_nyquist,
    validate_frequencies,
    validate_min_len,
    validate_positive,
    validate_range,
    ValidationError,
    ValidationResult,
};
