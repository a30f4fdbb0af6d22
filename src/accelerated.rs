// src/accelerated.rs

//! Performance-oriented SSA: lag-covariance eigendecomposition with parallel
//! embedding and parallel diagonal averaging.
//!
//! The covariance is centred per lag column, so the mean of each window
//! position does not enter the spectrum. For signals whose windows have a
//! non-zero mean the leading modes therefore differ from the classic SVD.

use crate::embedding::embed_trajectory_parallel;
use crate::error::{Result, SsaError};
use crate::kernels;
use crate::linalg_backends::{BackendEigh, LinAlgBackendProvider};
use crate::parallel::WorkerPool;
use crate::reconstruction::reconstruct_parallel;
use crate::spectral::{SpectralDecomposition, SsaVariant};
use log::{debug, warn};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use std::cmp::Ordering;

/// Accelerated SSA.
///
/// Eigenvalues of the L x L lag-covariance `cov(X) / K` (columns centred,
/// unbiased) are sorted by descending signed value and the eigenvectors are
/// reordered to match. Principal components are `X · V` on the uncentred
/// trajectory, so the full set of modes still sums to the signal.
#[derive(Debug)]
pub struct AcceleratedSsa {
    backend: LinAlgBackendProvider<f64>,
    pool: WorkerPool,
}

impl Default for AcceleratedSsa {
    fn default() -> Self {
        Self::new(WorkerPool::global())
    }
}

impl AcceleratedSsa {
    pub fn new(pool: WorkerPool) -> Self {
        Self {
            backend: LinAlgBackendProvider::new(),
            pool,
        }
    }

    /// Builds a variant whose pool runs at most `max_workers` threads.
    pub fn with_max_workers(max_workers: Option<usize>) -> Result<Self> {
        Ok(Self::new(WorkerPool::new(max_workers)?))
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }
}

/// Reorders the columns of a 2D array by `order`.
pub fn reorder_columns_owned<T: Clone>(matrix: &Array2<T>, order: &[usize]) -> Array2<T> {
    matrix.select(Axis(1), order)
}

/// Reorders the elements of a 1D array by `order`.
pub fn reorder_array_owned<T: Clone>(array: &Array1<T>, order: &[usize]) -> Array1<T> {
    array.select(Axis(0), order)
}

/// Indices that sort `values` by descending signed value. NaN sorts last.
pub fn descending_order(values: &Array1<f64>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| match (values[a].is_nan(), values[b].is_nan()) {
        (false, false) => values[b].partial_cmp(&values[a]).unwrap_or(Ordering::Equal),
        (nan_a, nan_b) => nan_a.cmp(&nan_b),
    });
    order
}

impl SsaVariant for AcceleratedSsa {
    fn decompose(&self, signal: ArrayView1<f64>, lag: usize) -> Result<SpectralDecomposition> {
        let trajectory = embed_trajectory_parallel(signal, lag, &self.pool)?;
        let k = trajectory.nrows();
        let mut covariance = kernels::covariance(trajectory.view());
        covariance /= k as f64;

        let eig = self.backend.eigh_upper(&covariance).map_err(|e| {
            SsaError::Linalg(format!("Eigendecomposition of the {}x{} lag-covariance failed: {}", lag, lag, e))
        })?;
        if eig.eigenvalues.len() != lag || eig.eigenvectors.dim() != (lag, lag) {
            return Err(SsaError::Internal(format!(
                "eigendecomposition of a {}x{} matrix returned {} values and {:?} vectors",
                lag,
                lag,
                eig.eigenvalues.len(),
                eig.eigenvectors.dim()
            )));
        }
        if eig.eigenvalues.iter().any(|v| !v.is_finite()) {
            return Err(SsaError::NonFinite { stage: "lag-covariance eigendecomposition" });
        }

        let order = descending_order(&eig.eigenvalues);
        let eigenvalues = reorder_array_owned(&eig.eigenvalues, &order);
        let eigenvectors = reorder_columns_owned(&eig.eigenvectors, &order);

        // Contiguous operands for the product kernel
        let eigenvectors = eigenvectors.as_standard_layout().into_owned();
        let trajectory = trajectory.as_standard_layout().into_owned();
        let principal_components = kernels::dot(trajectory.view(), eigenvectors.view());

        let spectral = SpectralDecomposition {
            values: eigenvalues,
            vectors: eigenvectors,
            principal_components,
        };
        spectral.check_finite("lag-covariance eigendecomposition")?;
        debug!(
            "Accelerated SSA: {} eigenvalues, leading {:e}, trailing {:e}, {} workers.",
            spectral.num_modes(),
            spectral.values[0],
            spectral.values[lag - 1],
            self.pool.num_workers()
        );
        Ok(spectral)
    }

    fn reconstruct(&self, spectral: &SpectralDecomposition, num_components: usize) -> Result<Array2<f64>> {
        let selected = num_components.min(spectral.num_modes());
        if let Some((negatives, smallest)) = negative_selected(&spectral.values, selected) {
            // Singular values cannot be negative, so these modes may be ordered
            // differently from the classic variant.
            warn!(
                "{} of the {} selected lag-covariance eigenvalues are negative; smallest is {:e}.",
                negatives, selected, smallest
            );
        }
        reconstruct_parallel(spectral, num_components, &self.pool)
    }
}

/// Count and minimum of the negative values among the leading `selected`, if any.
pub fn negative_selected(values: &Array1<f64>, selected: usize) -> Option<(usize, f64)> {
    let negatives: Vec<f64> = values.iter().take(selected).copied().filter(|&v| v < 0.0).collect();
    if negatives.is_empty() {
        None
    } else {
        Some((negatives.len(), negatives.iter().copied().fold(f64::INFINITY, f64::min)))
    }
}
