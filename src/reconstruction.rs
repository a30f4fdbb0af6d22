// src/reconstruction.rs

//! Diagonal averaging: rank-1 elementary matrices back to time series.
//!
//! For mode `i` the elementary matrix is `flipud(pc_i ⊗ v_i)`, shape K x L.
//! After the flip, the offset-`j` diagonal (`c - r = j`) for
//! `j in -(K-1)..L` collects exactly the entries that belong to time index
//! `j + K - 1`, so averaging each diagonal in offset order yields the N
//! samples of the component in time order.

use crate::error::{Result, SsaError};
use crate::kernels;
use crate::parallel::WorkerPool;
use crate::spectral::SpectralDecomposition;
use log::trace;
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};
use std::ops::Range;

/// Flipped rank-1 matrix of one mode, K x L.
pub fn elementary_matrix(principal_component: ArrayView1<f64>, vector: ArrayView1<f64>) -> Array2<f64> {
    kernels::flipped_outer(principal_component, vector)
}

/// Diagonal offsets of a `rows x cols` matrix, one per output time index.
pub fn anti_diagonal_offsets(rows: usize, cols: usize) -> Range<isize> {
    -(rows as isize - 1)..cols as isize
}

/// The entries `(r, c)` with `c - r = offset`.
///
/// `offset` must lie in [`anti_diagonal_offsets`] for the matrix shape.
pub fn anti_diagonal<'a>(elementary: ArrayView2<'a, f64>, offset: isize) -> ArrayView1<'a, f64> {
    let shifted = if offset >= 0 {
        elementary.slice_move(s![.., offset as usize..])
    } else {
        elementary.slice_move(s![(-offset) as usize.., ..])
    };
    shifted.into_diag()
}

/// Averages every diagonal of `elementary` sequentially.
pub fn diagonal_average(elementary: ArrayView2<f64>) -> Array1<f64> {
    let (rows, cols) = elementary.dim();
    anti_diagonal_offsets(rows, cols)
        .map(|offset| kernels::mean(anti_diagonal(elementary, offset)))
        .collect()
}

/// Averages every diagonal of `elementary` with one pool task per diagonal.
///
/// Results are gathered in submission order, which is time order.
pub fn diagonal_average_parallel(elementary: ArrayView2<f64>, pool: &WorkerPool) -> Result<Array1<f64>> {
    let (rows, cols) = elementary.dim();
    let first_offset = -(rows as isize - 1);
    let n = rows + cols - 1;
    let averaged = pool.map_indexed(n, |t| {
        Ok(kernels::mean(anti_diagonal(elementary, first_offset + t as isize)))
    })?;
    Ok(Array1::from_vec(averaged))
}

/// Reconstructs the leading `num_components` modes one at a time, averaging
/// each elementary matrix with `average`.
fn reconstruct_with<A>(spectral: &SpectralDecomposition, num_components: usize, mut average: A) -> Result<Array2<f64>>
where
    A: FnMut(ArrayView2<f64>) -> Result<Array1<f64>>,
{
    spectral.check_consistent()?;
    if num_components == 0 || num_components > spectral.num_modes() {
        return Err(SsaError::Internal(format!(
            "cannot reconstruct {} components from {} modes",
            num_components,
            spectral.num_modes()
        )));
    }

    let n = spectral.signal_len();
    let mut rc = Array2::<f64>::zeros((n, num_components));
    for i in 0..num_components {
        let (pc, vector) = spectral.mode(i);
        let elementary = elementary_matrix(pc, vector);
        let series = average(elementary.view())?;
        if series.len() != n {
            return Err(SsaError::Internal(format!(
                "component {} averaged to {} samples, expected {}",
                i,
                series.len(),
                n
            )));
        }
        rc.column_mut(i).assign(&series);
        trace!("Reconstructed component {} (spectral value {:e}).", i, spectral.values[i]);
    }
    Ok(rc)
}

/// Sequential reconstruction of the leading `num_components` modes, N x num_components.
pub fn reconstruct_sequential(spectral: &SpectralDecomposition, num_components: usize) -> Result<Array2<f64>> {
    reconstruct_with(spectral, num_components, |elementary| Ok(diagonal_average(elementary)))
}

/// Reconstruction with per-diagonal parallelism inside each component.
/// Components themselves are processed one after another.
pub fn reconstruct_parallel(
    spectral: &SpectralDecomposition,
    num_components: usize,
    pool: &WorkerPool,
) -> Result<Array2<f64>> {
    reconstruct_with(spectral, num_components, |elementary| diagonal_average_parallel(elementary, pool))
}
