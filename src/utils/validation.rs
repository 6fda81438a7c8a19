//! Validation utilities for SSVEP-Core
//!
//! Provides range, positivity and uniqueness checks for the scalar and list
//! parameters the analysis routines accept (sampling rates, stimulus
//! frequencies, harmonic counts, filter cutoffs).

use std::fmt;

/// Validation result type
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validation error types
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Value out of valid range
    OutOfRange {
        field: String,
        value: String,
        min: String,
        max: String,
    },
    /// Value is NaN or infinite
    NotFinite {
        field: String,
    },
    /// Array size violation
    InvalidArraySize {
        field: String,
        actual: usize,
        min: usize,
    },
    /// List holds the same value twice
    DuplicateValue {
        field: String,
        value: String,
    },
}

impl ValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &str {
        match self {
            ValidationError::OutOfRange { field, .. }
            | ValidationError::NotFinite { field }
            | ValidationError::InvalidArraySize { field, .. }
            | ValidationError::DuplicateValue { field, .. } => field,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::OutOfRange { field, value, min, max } => {
                write!(f, "Field '{}' value '{}' is out of range [{}, {}]", field, value, min, max)
            }
            ValidationError::NotFinite { field } => {
                write!(f, "Field '{}' must be a finite number", field)
            }
            ValidationError::InvalidArraySize { field, actual, min } => {
                write!(f, "Field '{}' has {} elements, at least {} required", field, actual, min)
            }
            ValidationError::DuplicateValue { field, value } => {
                write!(f, "Field '{}' contains duplicate value {}", field, value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate that a value lies within inclusive bounds
pub fn validate_range<T>(value: T, min: T, max: T, field: &str) -> ValidationResult<()>
where
    T: PartialOrd + fmt::Display + Copy,
{
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(())
}

/// Validate a strictly positive, finite float
pub fn validate_positive(value: f64, field: &str) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field: field.to_string() });
    }
    if value <= 0.0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value: value.to_string(),
            min: "0 (exclusive)".to_string(),
            max: "inf".to_string(),
        });
    }
    Ok(())
}

/// Validate minimum list length
pub fn validate_min_len<T>(array: &[T], min: usize, field: &str) -> ValidationResult<()> {
    if array.len() < min {
        return Err(ValidationError::InvalidArraySize {
            field: field.to_string(),
            actual: array.len(),
            min,
        });
    }
    Ok(())
}

/// Validate a list of stimulus frequencies: non-empty, positive, finite, distinct
pub fn validate_frequencies(frequencies: &[f64], field: &str) -> ValidationResult<()> {
    validate_min_len(frequencies, 1, field)?;
    for (i, &freq) in frequencies.iter().enumerate() {
        validate_positive(freq, field)?;
        if frequencies[..i].iter().any(|&prev| prev == freq) {
            return Err(ValidationError::DuplicateValue {
                field: field.to_string(),
                value: freq.to_string(),
            });
        }
    }
    Ok(())
}

/// Validate a cutoff frequency against the Nyquist limit
pub fn validate_below_nyquist(frequency_hz: f64, sampling_rate_hz: f64, field: &str) -> ValidationResult<()> {
    validate_positive(frequency_hz, field)?;
    let nyquist = sampling_rate_hz / 2.0;
    if frequency_hz >= nyquist {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value: frequency_hz.to_string(),
            min: "0 (exclusive)".to_string(),
            max: format!("{} (exclusive)", nyquist),
        });
    }
    Ok(())
}
