// src/classic.rs

//! Reference SSA: SVD of the trajectory matrix, sequential reconstruction.

use crate::embedding::embed_trajectory;
use crate::error::{Result, SsaError};
use crate::linalg_backends::{BackendSVD, LinAlgBackendProvider};
use crate::reconstruction::reconstruct_sequential;
use crate::spectral::{SpectralDecomposition, SsaVariant};
use log::debug;
use ndarray::{s, Array2, ArrayView1};

/// Classic single-threaded SSA.
///
/// The L x K transposed trajectory is factored as `U Σ Vᵗ`. Mode `i` pairs
/// the spectral vector `U[:, i]` with the principal component
/// `Σ[i] · Vᵗ[i, :]ᵗ`, so `pc_i ⊗ U[:, i]` is the i-th rank-1 term of the
/// trajectory matrix.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClassicSsa {
    backend: LinAlgBackendProvider<f64>,
}

impl ClassicSsa {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SsaVariant for ClassicSsa {
    fn decompose(&self, signal: ArrayView1<f64>, lag: usize) -> Result<SpectralDecomposition> {
        let trajectory_t = embed_trajectory(signal, lag).reversed_axes();
        let (l, k) = trajectory_t.dim();

        let svd = self
            .backend
            .svd_into(trajectory_t, true, true)
            .map_err(|e| SsaError::Linalg(format!("SVD of the {}x{} trajectory matrix failed: {}", l, k, e)))?;
        let u = svd
            .u
            .ok_or_else(|| SsaError::Internal("SVD backend returned no left singular vectors".to_string()))?;
        let vt = svd
            .vt
            .ok_or_else(|| SsaError::Internal("SVD backend returned no right singular vectors".to_string()))?;
        if svd.s.len() != l || u.ncols() < l || vt.nrows() < l {
            return Err(SsaError::Internal(format!(
                "SVD of a {}x{} matrix returned {} values, U {:?}, Vt {:?}",
                l,
                k,
                svd.s.len(),
                u.dim(),
                vt.dim()
            )));
        }

        // Column i of Vᵗ[..l]ᵗ scaled by Σ[i]
        let principal_components: Array2<f64> = vt.slice(s![..l, ..]).t().to_owned() * &svd.s;
        let spectral = SpectralDecomposition {
            values: svd.s,
            vectors: u.slice(s![.., ..l]).to_owned(),
            principal_components,
        };
        spectral.check_finite("singular value decomposition")?;
        debug!(
            "Classic SSA: {} singular values, leading {:e}, trailing {:e}.",
            spectral.num_modes(),
            spectral.values[0],
            spectral.values[l - 1]
        );
        Ok(spectral)
    }

    fn reconstruct(&self, spectral: &SpectralDecomposition, num_components: usize) -> Result<Array2<f64>> {
        reconstruct_sequential(spectral, num_components)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::embed_trajectory;
    use approx::assert_abs_diff_eq;
    use ndarray::Array1;

    fn sine(n: usize) -> Array1<f64> {
        Array1::linspace(0.0, 10.0, n).mapv(f64::sin)
    }

    #[test]
    fn singular_values_are_non_increasing_and_non_negative() {
        let signal = sine(100);
        let sd = ClassicSsa::new().decompose(signal.view(), 20).unwrap();
        assert_eq!(sd.num_modes(), 20);
        assert_eq!(sd.vectors.dim(), (20, 20));
        assert_eq!(sd.principal_components.dim(), (81, 20));
        for w in sd.values.windows(2) {
            assert!(w[0] >= w[1]);
        }
        assert!(sd.values.iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn modes_sum_to_the_trajectory_matrix() {
        let signal = sine(60).mapv(|v| v + 0.5);
        let lag = 8;
        let sd = ClassicSsa::new().decompose(signal.view(), lag).unwrap();
        let rebuilt = sd.principal_components.dot(&sd.vectors.t());
        let x = embed_trajectory(signal.view(), lag);
        for (a, b) in rebuilt.iter().zip(x.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-10);
        }
    }

    #[test]
    fn pure_sinusoid_has_rank_two() {
        let signal = sine(100);
        let sd = ClassicSsa::new().decompose(signal.view(), 20).unwrap();
        assert!(sd.values[1] > 1e-3 * sd.values[0]);
        assert!(sd.values[2] < 1e-8 * sd.values[0]);
    }
}
