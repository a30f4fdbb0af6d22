// Singular spectrum analysis (SSA)

//! Decomposition of a univariate time series into additive components with
//! singular spectrum analysis.
//!
//! The signal is embedded into a K x L trajectory matrix of lagged windows,
//! the matrix is decomposed into ordered rank-1 modes, and each selected mode
//! is turned back into a length-N series by averaging along anti-diagonals.
//! Summing all L reconstructed components returns the original signal.
//!
//! Two variants are available:
//! - [`SsaMethod::Classic`]: SVD of the trajectory matrix, single-threaded.
//! - [`SsaMethod::Accelerated`]: eigendecomposition of the lag-covariance
//!   matrix, with trajectory embedding and diagonal averaging spread over a
//!   bounded worker pool.
//!
//! # Examples
//!
//! ```
//! use ndarray::Array1;
//! use efficient_ssa::decompose;
//!
//! let signal = Array1::linspace(0.0, 10.0, 100).mapv(f64::sin);
//! let components = decompose(signal.view(), 20, 5, "classic").unwrap();
//! assert_eq!(components.dim(), (100, 5));
//! ```

pub mod accelerated;
pub mod classic;
pub mod config;
pub mod embedding;
pub mod error;
pub mod kernels;
pub mod linalg_backends;
pub mod parallel;
pub mod reconstruction;
pub mod spectral;


pub use accelerated::AcceleratedSsa;
pub use classic::ClassicSsa;
pub use config::{SsaConfig, SsaMethod};
pub use error::{Result, SsaError};
pub use parallel::WorkerPool;
pub use spectral::{SpectralDecomposition, SsaVariant};

use log::{debug, info};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use std::time::Instant;

/// Reconstructed components of one SSA run.
#[derive(Debug, Clone)]
pub struct SsaOutput {
    /// N x num_components; column i is the i-th reconstructed component.
    pub components: Array2<f64>,
    /// Spectral values of the selected modes, non-increasing.
    /// Singular values for the classic method, lag-covariance eigenvalues for the accelerated one.
    pub spectral_values: Array1<f64>,
    pub method: SsaMethod,
}

impl SsaOutput {
    pub fn num_components(&self) -> usize {
        self.components.ncols()
    }

    pub fn signal_len(&self) -> usize {
        self.components.nrows()
    }

    /// Row-wise sum of the components: the signal approximated by the selected modes.
    pub fn reconstructed_signal(&self) -> Array1<f64> {
        self.components.sum_axis(Axis(1))
    }

    /// Share of each selected mode in the variance captured by the selection.
    ///
    /// Classic singular values are squared first so both methods weigh modes
    /// on the same scale. Returns `None` when the total is not strictly positive.
    pub fn contribution_ratios(&self) -> Option<Array1<f64>> {
        let weights = match self.method {
            SsaMethod::Classic => self.spectral_values.mapv(|s| s * s),
            SsaMethod::Accelerated => self.spectral_values.clone(),
        };
        let total = weights.sum();
        if total > 0.0 && total.is_finite() {
            Some(weights / total)
        } else {
            None
        }
    }
}

/// Runs SSA with a fixed configuration.
///
/// Holds no state besides the configuration; every [`Ssa::run`] call is
/// independent.
#[derive(Debug, Clone)]
pub struct Ssa {
    config: SsaConfig,
}

impl Ssa {
    pub fn new(config: SsaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SsaConfig {
        &self.config
    }

    /// Decomposes `signal` and reconstructs the configured number of components.
    ///
    /// # Errors
    /// Range and configuration violations are reported before any computation.
    /// Backend failures, non-finite decompositions and worker failures abort
    /// the call; no partial output is returned.
    pub fn run(&self, signal: ArrayView1<f64>) -> Result<SsaOutput> {
        let cfg = &self.config;
        cfg.validate(signal.len())?;

        info!(
            "Running {} SSA: N = {}, L = {}, {} components.",
            cfg.method,
            signal.len(),
            cfg.lag,
            cfg.num_components
        );
        let start_time = Instant::now();

        let output = match cfg.method {
            SsaMethod::Classic => execute(&ClassicSsa::new(), signal, cfg),
            SsaMethod::Accelerated => {
                let variant = AcceleratedSsa::new(WorkerPool::bounded(cfg.max_workers, signal.len())?);
                execute(&variant, signal, cfg)
            }
        }?;

        info!(
            "Finished {} SSA in {:?}. Output shape: {:?}",
            cfg.method,
            start_time.elapsed(),
            output.components.dim()
        );
        Ok(output)
    }
}

fn execute<V: SsaVariant>(variant: &V, signal: ArrayView1<f64>, cfg: &SsaConfig) -> Result<SsaOutput> {
    let decomposition_start_time = Instant::now();
    let spectral = variant.decompose(signal, cfg.lag)?.truncated(cfg.num_components);
    debug!(
        "Decomposed trajectory in {:?}; selected spectral values: {:?}",
        decomposition_start_time.elapsed(),
        spectral.values
    );

    let reconstruction_start_time = Instant::now();
    let components = variant.reconstruct(&spectral, cfg.num_components)?;
    debug!("Reconstructed components in {:?}.", reconstruction_start_time.elapsed());

    Ok(SsaOutput {
        components,
        spectral_values: spectral.values,
        method: cfg.method,
    })
}

/// Decomposes `signal` into `num_components` reconstructed components.
///
/// `method` is `"classic"` or `"accelerated"`. Returns an
/// `(signal.len(), num_components)` matrix whose columns are ordered by
/// decreasing spectral value.
///
/// # Errors
/// - [`SsaError::InvalidSignal`] for an empty signal.
/// - [`SsaError::LagOutOfRange`] unless `2 <= lag < signal.len() / 2`.
/// - [`SsaError::ComponentsOutOfRange`] unless `1 <= num_components <= lag`.
/// - [`SsaError::UnknownMethod`] for any other method tag.
/// - Computational errors from the selected variant.
pub fn decompose(signal: ArrayView1<f64>, lag: usize, num_components: usize, method: &str) -> Result<Array2<f64>> {
    config::validate_ranges(signal.len(), lag, num_components)?;
    let method: SsaMethod = method.parse()?;
    let config = SsaConfig::new(lag, num_components).with_method(method);
    Ok(Ssa::new(config).run(signal)?.components)
}

/// Full ordered spectral set (all `lag` modes) of `signal`.
///
/// # Errors
/// Same range checks as [`decompose`] for `signal` and `lag`.
pub fn decompose_spectrum(signal: ArrayView1<f64>, lag: usize, method: SsaMethod) -> Result<SpectralDecomposition> {
    config::validate_ranges(signal.len(), lag, 1)?;
    match method {
        SsaMethod::Classic => ClassicSsa::new().decompose(signal, lag),
        SsaMethod::Accelerated => AcceleratedSsa::default().decompose(signal, lag),
    }
}
