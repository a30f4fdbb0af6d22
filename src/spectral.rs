// src/spectral.rs

use crate::error::{Result, SsaError};
use ndarray::{s, Array1, Array2, ArrayView1, Axis};

/// Ordered spectral set of a trajectory matrix.
///
/// `values[i]` pairs with `vectors.column(i)` (length L) and
/// `principal_components.column(i)` (length K). Values are non-increasing;
/// index 0 carries the dominant mode.
#[derive(Debug, Clone)]
pub struct SpectralDecomposition {
    /// Singular values (classic) or lag-covariance eigenvalues (accelerated).
    pub values: Array1<f64>,
    /// Spectral vectors as columns, L x r.
    pub vectors: Array2<f64>,
    /// Projection of the trajectory onto each spectral vector, K x r.
    pub principal_components: Array2<f64>,
}

impl SpectralDecomposition {
    /// Window length L.
    pub fn lag(&self) -> usize {
        self.vectors.nrows()
    }

    /// Number of lagged windows K.
    pub fn embedded_length(&self) -> usize {
        self.principal_components.nrows()
    }

    /// Length of the signal this decomposition reconstructs, `K + L - 1`.
    pub fn signal_len(&self) -> usize {
        self.embedded_length() + self.lag() - 1
    }

    /// Number of modes held.
    pub fn num_modes(&self) -> usize {
        self.values.len()
    }

    /// Keeps the leading `num_components` modes.
    pub fn truncated(self, num_components: usize) -> Self {
        let r = num_components.min(self.num_modes());
        Self {
            values: self.values.slice(s![..r]).to_owned(),
            vectors: self.vectors.slice(s![.., ..r]).to_owned(),
            principal_components: self.principal_components.slice(s![.., ..r]).to_owned(),
        }
    }

    /// The `(principal component, spectral vector)` pair of mode `i`.
    pub fn mode(&self, i: usize) -> (ArrayView1<'_, f64>, ArrayView1<'_, f64>) {
        (self.principal_components.column(i), self.vectors.column(i))
    }

    /// Checks the shape relations between the three parts.
    ///
    /// A failure here means a decomposer broke its contract.
    pub(crate) fn check_consistent(&self) -> Result<()> {
        let r = self.values.len();
        if self.vectors.len_of(Axis(1)) != r || self.principal_components.len_of(Axis(1)) != r {
            return Err(SsaError::Internal(format!(
                "spectral set has {} values but {} vectors and {} principal components",
                r,
                self.vectors.ncols(),
                self.principal_components.ncols()
            )));
        }
        if self.lag() == 0 || self.embedded_length() == 0 {
            return Err(SsaError::Internal(format!(
                "degenerate spectral set: lag {}, embedded length {}",
                self.lag(),
                self.embedded_length()
            )));
        }
        Ok(())
    }

    /// Fails with [`SsaError::NonFinite`] if any part holds NaN or infinity.
    pub(crate) fn check_finite(&self, stage: &'static str) -> Result<()> {
        let all_finite = self.values.iter().all(|v| v.is_finite())
            && self.vectors.iter().all(|v| v.is_finite())
            && self.principal_components.iter().all(|v| v.is_finite());
        if all_finite {
            Ok(())
        } else {
            Err(SsaError::NonFinite { stage })
        }
    }
}

/// One SSA variant: a decomposer paired with its reconstructor.
pub trait SsaVariant {
    /// Embeds `signal` with window `lag` and returns all L modes, ordered.
    /// Inputs are assumed validated.
    fn decompose(&self, signal: ArrayView1<f64>, lag: usize) -> Result<SpectralDecomposition>;

    /// Turns the leading `num_components` modes into an N x num_components matrix
    /// of time-aligned component series.
    fn reconstruct(&self, spectral: &SpectralDecomposition, num_components: usize) -> Result<Array2<f64>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn toy() -> SpectralDecomposition {
        SpectralDecomposition {
            values: array![3.0, 2.0, 1.0],
            vectors: Array2::eye(3),
            principal_components: Array2::ones((5, 3)),
        }
    }

    #[test]
    fn dimensions_derive_from_parts() {
        let sd = toy();
        assert_eq!(sd.lag(), 3);
        assert_eq!(sd.embedded_length(), 5);
        assert_eq!(sd.signal_len(), 7);
        assert!(sd.check_consistent().is_ok());
    }

    #[test]
    fn truncation_keeps_leading_modes() {
        let sd = toy().truncated(2);
        assert_eq!(sd.values, array![3.0, 2.0]);
        assert_eq!(sd.vectors.dim(), (3, 2));
        assert_eq!(sd.principal_components.dim(), (5, 2));
        assert_eq!(sd.signal_len(), 7);
    }

    #[test]
    fn inconsistent_parts_are_internal_errors() {
        let mut sd = toy();
        sd.values = array![1.0];
        assert!(matches!(sd.check_consistent(), Err(SsaError::Internal(_))));
    }

    #[test]
    fn nan_is_reported_as_non_finite() {
        let mut sd = toy();
        sd.values[1] = f64::NAN;
        assert!(matches!(sd.check_finite("test"), Err(SsaError::NonFinite { stage: "test" })));
    }
}
