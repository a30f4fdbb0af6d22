// src/embedding.rs

//! Trajectory (lagged-window) matrix construction.
//!
//! Both builders assume validated inputs (`2 <= lag < signal.len() / 2`);
//! range checks live in [`crate::config`].

use crate::error::Result;
use crate::parallel::WorkerPool;
use log::trace;
use ndarray::{s, Array2, ArrayView1, Axis};

/// Number of lagged windows, `K = N - L + 1`.
pub fn embedded_length(signal_len: usize, lag: usize) -> usize {
    signal_len + 1 - lag
}

/// Builds the K x L trajectory matrix, entry `(i, j) = signal[i + j]`.
pub fn embed_trajectory(signal: ArrayView1<f64>, lag: usize) -> Array2<f64> {
    let k = embedded_length(signal.len(), lag);
    Array2::from_shape_fn((k, lag), |(i, j)| signal[i + j])
}

/// Builds the same matrix as [`embed_trajectory`] with one task per column.
///
/// Column `m` receives `signal[m..m + K]`. Columns are disjoint, and the
/// matrix is returned only after every column task has joined.
pub fn embed_trajectory_parallel(
    signal: ArrayView1<f64>,
    lag: usize,
    pool: &WorkerPool,
) -> Result<Array2<f64>> {
    let k = embedded_length(signal.len(), lag);
    let mut trajectory = Array2::<f64>::zeros((k, lag));
    pool.for_each_lane_mut(trajectory.view_mut(), Axis(1), |m, mut column| {
        column.assign(&signal.slice(s![m..m + k]));
    })?;
    trace!("Embedded {} samples into a {}x{} trajectory matrix.", signal.len(), k, lag);
    Ok(trajectory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    #[test]
    fn trajectory_rows_are_lagged_windows() {
        let signal = array![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let x = embed_trajectory(signal.view(), 2);
        assert_eq!(x.dim(), (5, 2));
        assert_eq!(x.row(0), array![1.0, 2.0]);
        assert_eq!(x.row(4), array![5.0, 6.0]);
        assert_eq!(x.column(1), array![2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn parallel_embedding_matches_sequential() {
        let signal = Array1::linspace(0.0, 10.0, 101).mapv(f64::sin);
        let pool = WorkerPool::new(Some(3)).unwrap();
        for lag in [2, 7, 20, 49] {
            let seq = embed_trajectory(signal.view(), lag);
            let par = embed_trajectory_parallel(signal.view(), lag, &pool).unwrap();
            assert_eq!(seq, par, "lag {}", lag);
        }
    }

    #[test]
    fn embedded_length_is_n_minus_l_plus_one() {
        assert_eq!(embedded_length(100, 20), 81);
        assert_eq!(embedded_length(6, 2), 5);
    }
}
