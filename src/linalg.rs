//! Dense linear algebra helpers for the correlation solvers
//!
//! Signals live in `ndarray` arrays; inversion and eigen decomposition go
//! through `nalgebra`. Matrices here are tiny (channels + 2·harmonics per
//! side), so conversions copy.

use nalgebra::{Complex, DMatrix, Schur, SymmetricEigen};
use ndarray::{s, Array2, ArrayView2, Axis};
use crate::config::constants::numerics::{EIGEN_MAX_ITERATIONS, EIGEN_TOLERANCE};
use crate::error::{ProcessingStage, SsvepError, SsvepResult};
use crate::error_context;

/// Four blocks of a joint covariance matrix partitioned at `n`
#[derive(Debug, Clone, PartialEq)]
pub struct CovarianceBlocks {
    /// First view auto-covariance (n x n)
    pub cx: Array2<f64>,
    /// Second view auto-covariance (m x m)
    pub cy: Array2<f64>,
    /// Cross-covariance (n x m)
    pub cxy: Array2<f64>,
    /// Cross-covariance transpose (m x n)
    pub cyx: Array2<f64>,
}

impl CovarianceBlocks {
    /// Split `covariance` so the first `n` variables form the first view
    pub fn partition(covariance: &Array2<f64>, n: usize) -> Self {
        Self {
            cx: covariance.slice(s![..n, ..n]).to_owned(),
            cy: covariance.slice(s![n.., n..]).to_owned(),
            cxy: covariance.slice(s![..n, n..]).to_owned(),
            cyx: covariance.slice(s![n.., ..n]).to_owned(),
        }
    }
}

/// Unbiased (N-1) sample covariance; rows are observations, columns variables
pub fn covariance(data: ArrayView2<'_, f64>) -> SsvepResult<Array2<f64>> {
    let observations = data.nrows();
    if observations < 2 {
        return Err(SsvepError::shape(
            error_context!("linalg", "covariance"),
            "at least 2 samples",
            format!("{} samples", observations),
        ));
    }

    let mean = data.mean_axis(Axis(0)).ok_or_else(|| SsvepError::Processing {
        stage: ProcessingStage::Covariance,
        reason: "cannot take the mean of an empty axis".to_string(),
        context: error_context!("linalg", "covariance"),
    })?;

    let centered = &data - &mean;
    Ok(centered.t().dot(&centered) / (observations as f64 - 1.0))
}

/// Inverse of a regularized symmetric block, restricted to its numerical range
#[derive(Debug, Clone, PartialEq)]
pub struct RegularizedInverse {
    pub inverse: Array2<f64>,
    /// Eigenvalues kept after the conditioning cut
    pub rank: usize,
}

impl RegularizedInverse {
    /// True when at least one direction was dropped
    pub fn is_singular(&self) -> bool {
        self.rank < self.inverse.nrows()
    }
}

/// Pseudo-inverse of `block + eps·I` for a symmetric positive semi-definite block.
///
/// Eigenvalues of the regularized block that are not above
/// `condition_ratio · λmax` are dropped instead of inverted, so a block that
/// stays singular after regularization still yields a finite inverse on its
/// range. [`RegularizedInverse::is_singular`] reports whether that happened.
pub fn regularized_inverse(
    block: &Array2<f64>,
    eps: f64,
    condition_ratio: f64,
) -> SsvepResult<RegularizedInverse> {
    let eigen = SymmetricEigen::try_new(to_dmatrix(block), EIGEN_TOLERANCE, EIGEN_MAX_ITERATIONS)
        .ok_or_else(|| SsvepError::Processing {
            stage: ProcessingStage::EigenDecomposition,
            reason: "symmetric eigen solver did not converge".to_string(),
            context: error_context!("linalg", "regularized_inverse"),
        })?;

    let regularized = eigen.eigenvalues.map(|lambda| lambda + eps);
    let largest = regularized.iter().copied().fold(0.0_f64, f64::max);
    let floor = condition_ratio * largest;

    let mut rank = 0;
    let scaled = regularized.map(|mu| {
        if mu > floor && mu > 0.0 {
            rank += 1;
            1.0 / mu
        } else {
            0.0
        }
    });

    let vectors = &eigen.eigenvectors;
    let inverse = vectors * DMatrix::from_diagonal(&scaled) * vectors.transpose();
    Ok(RegularizedInverse {
        inverse: from_dmatrix(&inverse),
        rank,
    })
}

/// Eigenvalues of a general real square matrix via the real Schur form
pub fn eigenvalues(matrix: &Array2<f64>) -> SsvepResult<Vec<Complex<f64>>> {
    if !matrix.iter().all(|v| v.is_finite()) {
        return Err(SsvepError::Processing {
            stage: ProcessingStage::EigenDecomposition,
            reason: "matrix contains non-finite values".to_string(),
            context: error_context!("linalg", "eigenvalues"),
        });
    }

    let schur = Schur::try_new(to_dmatrix(matrix), EIGEN_TOLERANCE, EIGEN_MAX_ITERATIONS)
        .ok_or_else(|| SsvepError::Processing {
            stage: ProcessingStage::EigenDecomposition,
            reason: format!(
                "Schur decomposition did not converge within {} iterations",
                EIGEN_MAX_ITERATIONS
            ),
            context: error_context!("linalg", "eigenvalues"),
        })?;

    Ok(schur.complex_eigenvalues().iter().copied().collect())
}

/// Eigenvalues of a symmetric matrix, in no particular order
pub fn symmetric_eigenvalues(matrix: &Array2<f64>) -> SsvepResult<Vec<f64>> {
    let eigen = SymmetricEigen::try_new(to_dmatrix(matrix), EIGEN_TOLERANCE, EIGEN_MAX_ITERATIONS)
        .ok_or_else(|| SsvepError::Processing {
            stage: ProcessingStage::EigenDecomposition,
            reason: "symmetric eigen solver did not converge".to_string(),
            context: error_context!("linalg", "symmetric_eigenvalues"),
        })?;

    Ok(eigen.eigenvalues.iter().copied().collect())
}

/// `(block + eps·I)^(-1/2)` for a symmetric positive semi-definite block.
///
/// Eigenvalues are floored at `eps` before the inverse square root, so `eps`
/// must be positive when the block may be singular.
pub fn inverse_sqrt_symmetric(block: &Array2<f64>, eps: f64) -> SsvepResult<Array2<f64>> {
    let eigen = SymmetricEigen::try_new(to_dmatrix(block), EIGEN_TOLERANCE, EIGEN_MAX_ITERATIONS)
        .ok_or_else(|| SsvepError::Processing {
            stage: ProcessingStage::EigenDecomposition,
            reason: "symmetric eigen solver did not converge".to_string(),
            context: error_context!("linalg", "inverse_sqrt_symmetric"),
        })?;

    let scaled = eigen.eigenvalues.map(|lambda| 1.0 / (lambda + eps).max(eps).sqrt());
    let vectors = &eigen.eigenvectors;
    let result = vectors * DMatrix::from_diagonal(&scaled) * vectors.transpose();
    Ok(from_dmatrix(&result))
}

pub(crate) fn to_dmatrix(array: &Array2<f64>) -> DMatrix<f64> {
    let (rows, cols) = array.dim();
    DMatrix::from_fn(rows, cols, |r, c| array[[r, c]])
}

pub(crate) fn from_dmatrix(matrix: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((matrix.nrows(), matrix.ncols()), |(r, c)| matrix[(r, c)])
}
