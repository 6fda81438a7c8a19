// src/cca.rs
//! Canonical correlation analysis between an observed trial and a reference set
//!
//! # Algorithm
//!
//! Given a signal X (T x C) and a reference Y (T x H):
//! 1. Concatenate the two views column-wise, narrower view first
//! 2. Unbiased covariance of the concatenation, partitioned at `n = min(C, H)`
//!    into `Cx`, `Cy`, `Cxy`, `Cyx`
//! 3. Eigenvalues of `inv(Cy + eps·I) · Cyx · inv(Cx + eps·I) · Cxy`. A block
//!    that is still ill-conditioned after regularization is inverted on its
//!    range only and reported as [`NumericalWarning::SingularCovariance`]
//! 4. Negative eigenvalues clamp to zero, real parts sorted descending,
//!    truncated to `n`
//!
//! The eigenvalues are *squared* canonical correlations. Whether the caller
//! gets them as-is or square-rooted is decided by [`CoefficientConvention`];
//! there is no implicit default inside the solver.

use std::fmt;
use nalgebra::Complex;
use ndarray::{concatenate, Axis};
use serde::{Deserialize, Serialize};
use tracing::warn;
use crate::config::constants::numerics::{
    COMPLEX_EIGENVALUE_TOLERANCE, DEFAULT_REGULARIZATION, DEGENERATE_VARIANCE_RATIO,
    SINGULAR_CONDITION_RATIO,
};
use crate::error::{SsvepError, SsvepResult};
use crate::error_context;
use crate::linalg::{covariance, eigenvalues, regularized_inverse, CovarianceBlocks};
use crate::signal::SignalMatrix;

/// How solved eigenvalues are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoefficientConvention {
    /// Raw eigenvalues, i.e. squared canonical correlations
    Squared,
    /// Square roots of the eigenvalues, i.e. canonical correlations
    Correlation,
}

/// Solver options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CcaOptions {
    pub convention: CoefficientConvention,
    /// Added to the diagonal of both auto-covariance blocks before inversion
    pub regularization: f64,
}

impl CcaOptions {
    pub fn new(convention: CoefficientConvention) -> Self {
        Self {
            convention,
            regularization: DEFAULT_REGULARIZATION,
        }
    }

    pub fn with_regularization(mut self, regularization: f64) -> Self {
        self.regularization = regularization;
        self
    }
}

/// Which of the two views a warning refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum View {
    Signal,
    Reference,
}

/// Non-fatal numerical conditions met while solving
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NumericalWarning {
    /// Auto-covariance block stayed singular after regularization; the
    /// coefficients were solved on the block's numerical range only
    SingularCovariance { view: View },
    /// A column carries (almost) no variance, e.g. a flat or disconnected channel
    DegenerateChannel { view: View, column: usize },
    /// Eigenvalues had imaginary parts above floating-point noise
    ComplexEigenvalues { max_imaginary: f64 },
}

impl fmt::Display for NumericalWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericalWarning::SingularCovariance { view } => {
                write!(f, "{:?} covariance block is singular after regularization", view)
            }
            NumericalWarning::DegenerateChannel { view, column } => {
                write!(f, "{:?} column {} has no variance", view, column)
            }
            NumericalWarning::ComplexEigenvalues { max_imaginary } => {
                write!(f, "eigenvalues have imaginary parts up to {:.3e}", max_imaginary)
            }
        }
    }
}

/// Canonical correlation coefficients, strongest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalCorrelation {
    values: Vec<f64>,
    convention: CoefficientConvention,
    warnings: Vec<NumericalWarning>,
}

impl CanonicalCorrelation {
    /// Coefficients in the requested convention, non-increasing, each in [0, 1]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn convention(&self) -> CoefficientConvention {
        self.convention
    }

    pub fn warnings(&self) -> &[NumericalWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Largest coefficient (0 when empty)
    pub fn max(&self) -> f64 {
        self.values.first().copied().unwrap_or(0.0)
    }

    /// Squared canonical correlations, whatever the stored convention
    pub fn squared(&self) -> Vec<f64> {
        match self.convention {
            CoefficientConvention::Squared => self.values.clone(),
            CoefficientConvention::Correlation => self.values.iter().map(|r| r * r).collect(),
        }
    }

    /// Canonical correlations, whatever the stored convention
    pub fn correlations(&self) -> Vec<f64> {
        match self.convention {
            CoefficientConvention::Squared => self.values.iter().map(|r2| r2.sqrt()).collect(),
            CoefficientConvention::Correlation => self.values.clone(),
        }
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

/// Canonical correlations between `signal` and `reference`.
///
/// Both matrices must have the same number of samples (at least two) and
/// finite values. The result has `min(signal.channels(), reference.channels())`
/// entries and is invariant to swapping the two arguments.
pub fn canonical_correlation(
    signal: &SignalMatrix,
    reference: &SignalMatrix,
    options: &CcaOptions,
) -> SsvepResult<CanonicalCorrelation> {
    if signal.samples() != reference.samples() {
        return Err(SsvepError::shape(
            error_context!("cca", "canonical_correlation"),
            format!("{} reference samples (matching the signal)", signal.samples()),
            format!("{} reference samples", reference.samples()),
        ));
    }
    if !options.regularization.is_finite() || options.regularization < 0.0 {
        return Err(SsvepError::parameter(
            error_context!("cca", "canonical_correlation"),
            "regularization",
            format!("must be finite and non-negative, got {}", options.regularization),
        ));
    }
    if !signal.is_finite() || !reference.is_finite() {
        return Err(SsvepError::parameter(
            error_context!("cca", "canonical_correlation"),
            "signal",
            "input contains NaN or infinite values",
        ));
    }

    // Narrower view first; ties keep the signal first
    let (first, first_view, second, second_view) = if signal.channels() <= reference.channels() {
        (signal, View::Signal, reference, View::Reference)
    } else {
        (reference, View::Reference, signal, View::Signal)
    };
    let n = first.channels();

    let joint = concatenate(Axis(1), &[first.view(), second.view()]).map_err(|e| {
        SsvepError::shape(
            error_context!("cca", "concatenate"),
            "views with equal sample counts",
            e.to_string(),
        )
    })?;
    let cov = covariance(joint.view())?;
    let blocks = CovarianceBlocks::partition(&cov, n);

    let mut warnings = degenerate_columns(&cov, n, first_view, second_view);

    let eps = options.regularization;
    let inv_cx = regularized_inverse(&blocks.cx, eps, SINGULAR_CONDITION_RATIO)?;
    let inv_cy = regularized_inverse(&blocks.cy, eps, SINGULAR_CONDITION_RATIO)?;
    for (inverse, view) in [(&inv_cx, first_view), (&inv_cy, second_view)] {
        if inverse.is_singular() {
            warnings.push(NumericalWarning::SingularCovariance { view });
        }
    }

    let product = inv_cy
        .inverse
        .dot(&blocks.cyx)
        .dot(&inv_cx.inverse)
        .dot(&blocks.cxy);
    let (mut values, complex) = real_spectrum(&eigenvalues(&product)?);
    warnings.extend(complex);
    values.truncate(n);

    Ok(finish(values, options.convention, warnings))
}

/// Real parts clamped at zero and sorted descending, with a warning when the
/// imaginary parts are above floating-point noise
fn real_spectrum(eigen: &[Complex<f64>]) -> (Vec<f64>, Option<NumericalWarning>) {
    let scale = eigen.iter().map(|c| c.re.abs()).fold(1.0_f64, f64::max);
    let max_imaginary = eigen.iter().map(|c| c.im.abs()).fold(0.0_f64, f64::max);
    let warning = (max_imaginary > COMPLEX_EIGENVALUE_TOLERANCE * scale)
        .then_some(NumericalWarning::ComplexEigenvalues { max_imaginary });

    let mut values: Vec<f64> = eigen.iter().map(|c| c.re.max(0.0)).collect();
    values.sort_by(|a, b| b.total_cmp(a));
    (values, warning)
}

fn finish(
    squared: Vec<f64>,
    convention: CoefficientConvention,
    warnings: Vec<NumericalWarning>,
) -> CanonicalCorrelation {
    for warning in &warnings {
        warn!(%warning, "numerical instability in canonical correlation");
    }

    let values = squared
        .into_iter()
        .map(|r2| match convention {
            CoefficientConvention::Squared => r2.min(1.0),
            CoefficientConvention::Correlation => r2.sqrt().min(1.0),
        })
        .collect();

    CanonicalCorrelation {
        values,
        convention,
        warnings,
    }
}

fn degenerate_columns(
    cov: &ndarray::Array2<f64>,
    n: usize,
    first_view: View,
    second_view: View,
) -> Vec<NumericalWarning> {
    let variances = cov.diag();
    let largest = variances.iter().copied().fold(0.0_f64, f64::max);
    let floor = DEGENERATE_VARIANCE_RATIO * largest;

    variances
        .iter()
        .enumerate()
        .filter(|(_, &var)| var <= floor)
        .map(|(idx, _)| {
            if idx < n {
                NumericalWarning::DegenerateChannel { view: first_view, column: idx }
            } else {
                NumericalWarning::DegenerateChannel { view: second_view, column: idx - n }
            }
        })
        .collect()
}
