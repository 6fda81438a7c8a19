// src/error.rs
//! Unified error handling for SSVEP Core
//!
//! Every fallible operation in the crate returns [`SsvepResult`]. Module-local
//! error types (filter design, validation, configuration loading) convert into
//! [`SsvepError`] so callers only ever match on one enum.
//!
//! Numerical trouble that the solver can recover from (singular covariance
//! blocks, spurious complex eigenvalues) is *not* an error; it is reported as a
//! [`crate::cca::NumericalWarning`] alongside the coefficients.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::time::SystemTime;
use serde::{Deserialize, Serialize};

/// Unified error type for the SSVEP analysis routines
#[derive(Debug, Clone)]
pub enum SsvepError {
    /// Matrix or trial dimensions are incompatible with the operation
    InvalidInputShape {
        operation: String,
        expected: String,
        actual: String,
        context: ErrorContext,
    },

    /// A scalar or list argument is outside its valid domain
    InvalidParameter {
        parameter: String,
        reason: String,
        context: ErrorContext,
    },

    /// Configuration could not be loaded or is inconsistent
    Configuration {
        component: String,
        reason: String,
        context: ErrorContext,
    },

    /// A processing stage failed (filter design, eigen solver, ...)
    Processing {
        stage: ProcessingStage,
        reason: String,
        context: ErrorContext,
    },
}

/// Processing stages for error tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingStage {
    Filtering,
    Covariance,
    EigenDecomposition,
    Classification,
}

/// Error context for debugging and analysis
#[derive(Debug, Clone, Serialize)]
pub struct ErrorContext {
    pub timestamp: SystemTime,
    pub component: String,
    pub operation: String,
    pub file: Option<&'static str>,
    pub line: Option<u32>,
    pub additional_info: HashMap<String, String>,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(component: &str, operation: &str) -> Self {
        Self {
            timestamp: SystemTime::now(),
            component: component.to_string(),
            operation: operation.to_string(),
            file: None,
            line: None,
            additional_info: HashMap::new(),
        }
    }

    /// Create error context with file and line information
    pub fn with_location(
        component: &str,
        operation: &str,
        file: &'static str,
        line: u32,
    ) -> Self {
        let mut context = Self::new(component, operation);
        context.file = Some(file);
        context.line = Some(line);
        context
    }

    /// Add additional information to the context
    pub fn add_info<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.additional_info.insert(key.into(), value.into());
        self
    }
}

/// Macro for creating error context with file and line info
#[macro_export]
macro_rules! error_context {
    ($component:expr, $operation:expr) => {
        $crate::error::ErrorContext::with_location($component, $operation, file!(), line!())
    };
}

impl SsvepError {
    /// Shape mismatch raised by `operation`
    pub fn shape(
        context: ErrorContext,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        SsvepError::InvalidInputShape {
            operation: context.operation.clone(),
            expected: expected.into(),
            actual: actual.into(),
            context,
        }
    }

    /// Out-of-domain argument
    pub fn parameter(
        context: ErrorContext,
        parameter: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        SsvepError::InvalidParameter {
            parameter: parameter.into(),
            reason: reason.into(),
            context,
        }
    }

    /// Context attached to this error
    pub fn context(&self) -> &ErrorContext {
        match self {
            SsvepError::InvalidInputShape { context, .. }
            | SsvepError::InvalidParameter { context, .. }
            | SsvepError::Configuration { context, .. }
            | SsvepError::Processing { context, .. } => context,
        }
    }

    /// True for errors a driver loop must treat as fatal configuration errors
    pub fn is_shape_error(&self) -> bool {
        matches!(self, SsvepError::InvalidInputShape { .. })
    }
}

impl fmt::Display for SsvepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SsvepError::InvalidInputShape { operation, expected, actual, context } => {
                write!(f, "[SHAPE] Invalid input shape in {}: expected {}, got {} (at {}:{})",
                       operation, expected, actual,
                       context.file.unwrap_or("unknown"), context.line.unwrap_or(0))
            }
            SsvepError::InvalidParameter { parameter, reason, context } => {
                write!(f, "[PARAM] Invalid parameter '{}': {} ({})",
                       parameter, reason, context.operation)
            }
            SsvepError::Configuration { component, reason, context } => {
                write!(f, "[CONFIG] Configuration error in {}: {} ({})",
                       component, reason, context.operation)
            }
            SsvepError::Processing { stage, reason, context } => {
                write!(f, "[PROCESSING] {:?} stage error: {} ({})",
                       stage, reason, context.operation)
            }
        }
    }
}

impl Error for SsvepError {}

// Conversions run far from the failing check, so they carry no source location
impl From<crate::filters::FilterError> for SsvepError {
    fn from(err: crate::filters::FilterError) -> Self {
        SsvepError::Processing {
            stage: ProcessingStage::Filtering,
            reason: err.to_string(),
            context: ErrorContext::new("filters", "filter_design"),
        }
    }
}

impl From<crate::utils::validation::ValidationError> for SsvepError {
    fn from(err: crate::utils::validation::ValidationError) -> Self {
        SsvepError::InvalidParameter {
            parameter: err.field().to_string(),
            reason: err.to_string(),
            context: ErrorContext::new("validation", "validate_parameter"),
        }
    }
}

impl From<crate::config::ConfigError> for SsvepError {
    fn from(err: crate::config::ConfigError) -> Self {
        SsvepError::Configuration {
            component: "config_loader".to_string(),
            reason: err.to_string(),
            context: ErrorContext::new("config", "load"),
        }
    }
}

/// Result type alias for SSVEP operations
pub type SsvepResult<T> = Result<T, SsvepError>;

/// Error builder for convenient error construction
pub struct SsvepErrorBuilder {
    component: String,
    operation: String,
}

impl SsvepErrorBuilder {
    pub fn new(component: &str, operation: &str) -> Self {
        Self {
            component: component.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn configuration(self, reason: &str) -> SsvepError {
        let context = ErrorContext::new(&self.component, &self.operation);
        SsvepError::Configuration {
            component: self.component,
            reason: reason.to_string(),
            context,
        }
    }

    pub fn processing(self, stage: ProcessingStage, reason: &str) -> SsvepError {
        SsvepError::Processing {
            stage,
            reason: reason.to_string(),
            context: ErrorContext::new(&self.component, &self.operation),
        }
    }

    pub fn invalid_shape(self, expected: &str, actual: &str) -> SsvepError {
        SsvepError::InvalidInputShape {
            operation: self.operation.clone(),
            expected: expected.to_string(),
            actual: actual.to_string(),
            context: ErrorContext::new(&self.component, &self.operation),
        }
    }

    pub fn invalid_parameter(self, parameter: &str, reason: &str) -> SsvepError {
        SsvepError::InvalidParameter {
            parameter: parameter.to_string(),
            reason: reason.to_string(),
            context: ErrorContext::new(&self.component, &self.operation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_context_creation() {
        let context = ErrorContext::new("cca", "canonical_correlation");
        assert_eq!(context.component, "cca");
        assert_eq!(context.operation, "canonical_correlation");
        assert!(context.timestamp <= SystemTime::now());
    }

    #[test]
    fn test_error_context_macro_records_location() {
        let context = error_context!("signal", "new");
        assert!(context.file.is_some());
        assert!(context.line.unwrap_or(0) > 0);
    }

    #[test]
    fn test_error_builder() {
        let err = SsvepErrorBuilder::new("loader", "load").configuration("missing section");

        match err {
            SsvepError::Configuration { component, reason, .. } => {
                assert_eq!(component, "loader");
                assert_eq!(reason, "missing section");
            }
            _ => panic!("Expected configuration error"),
        }
    }

    #[test]
    fn test_shape_error_display() {
        let err = SsvepError::shape(
            ErrorContext::new("cca", "canonical_correlation"),
            "512 samples",
            "500 samples",
        );

        let display = format!("{}", err);
        assert!(display.contains("SHAPE"));
        assert!(display.contains("512 samples"));
        assert!(display.contains("500 samples"));
        assert!(err.is_shape_error());
    }

    #[test]
    fn test_error_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SsvepError>();
    }

    #[test]
    fn test_filter_error_conversion() {
        let err: SsvepError =
            crate::filters::FilterError::InvalidParameters("order must be 1-8".to_string()).into();

        match err {
            SsvepError::Processing { stage, reason, .. } => {
                assert_eq!(stage, ProcessingStage::Filtering);
                assert!(reason.contains("order"));
            }
            _ => panic!("Expected processing error"),
        }
    }

    #[test]
    fn test_converted_errors_have_no_location() {
        let errors: Vec<SsvepError> = vec![
            crate::filters::FilterError::InvalidParameters("bad cutoff".to_string()).into(),
            crate::config::ConfigError::FileNotFound("ssvep.toml".to_string()).into(),
        ];

        for err in &errors {
            assert!(err.context().file.is_none(), "{:?}", err.context());
            assert!(err.context().line.is_none());
        }
        assert_eq!(errors[0].context().component, "filters");
        assert_eq!(errors[1].context().component, "config");
    }
}
