// src/kernels.rs

//! Hot-path numeric kernels shared by both SSA variants.
//!
//! These are thin wrappers over ndarray operations so the decomposers and the
//! reconstructor agree on one definition of each primitive. `dot` and
//! `covariance` go through ndarray's blocked GEMM.

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

/// Matrix product `a * b`.
pub fn dot(a: ArrayView2<f64>, b: ArrayView2<f64>) -> Array2<f64> {
    a.dot(&b)
}

/// Outer product `column ⊗ row` with the row order reversed.
///
/// Entry `(r, c)` equals `column[rows - 1 - r] * row[c]`. After the flip the
/// anti-diagonals of the unflipped product become ordinary offset diagonals.
pub fn flipped_outer(column: ArrayView1<f64>, row: ArrayView1<f64>) -> Array2<f64> {
    let rows = column.len();
    Array2::from_shape_fn((rows, row.len()), |(r, c)| column[rows - 1 - r] * row[c])
}

/// Covariance of the columns of a K x L trajectory matrix.
///
/// Each column is a lag variable observed K times. Columns are mean-centred
/// and the cross products divided by `K - 1`, so the result is the L x L
/// unbiased sample covariance. Requires `K >= 2`.
pub fn covariance(trajectory: ArrayView2<f64>) -> Array2<f64> {
    let k = trajectory.len_of(Axis(0));
    debug_assert!(k >= 2, "covariance needs at least two observations, got {}", k);
    let mut centred = trajectory.to_owned();
    if let Some(column_means) = trajectory.mean_axis(Axis(0)) {
        centred -= &column_means;
    }
    let mut cov = centred.t().dot(&centred);
    cov /= (k - 1) as f64;
    cov
}

/// Arithmetic mean of a non-empty lane.
pub fn mean(values: ArrayView1<f64>) -> f64 {
    debug_assert!(!values.is_empty(), "mean of an empty lane");
    values.sum() / values.len() as f64
}
