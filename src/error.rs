// src/error.rs

//! Error types returned by the SSA pipeline.

use std::error::Error as StdError;
use thiserror::Error;

/// A thread-safe wrapper for standard dynamic errors,
/// so they implement `Send` and `Sync`.
/// Used at the linear-algebra backend seam.
pub type ThreadSafeStdError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors produced while validating, decomposing or reconstructing a signal.
#[derive(Error, Debug)]
pub enum SsaError {
    /// The input signal has no samples.
    #[error("Invalid signal: {0}")]
    InvalidSignal(String),

    /// Window length outside `2 <= lag < signal_len / 2`.
    #[error("Lag must satisfy 2 <= lag < {max_exclusive} (signal length {signal_len}), got {lag}")]
    LagOutOfRange {
        lag: usize,
        signal_len: usize,
        max_exclusive: usize,
    },

    /// Component count outside `1 <= num_components <= lag`.
    #[error("Number of components must satisfy 1 <= num_components <= {lag}, got {num_components}")]
    ComponentsOutOfRange { num_components: usize, lag: usize },

    /// The method tag is not one of the recognized variants.
    #[error("Unknown SSA method '{0}': options are 'classic' or 'accelerated'")]
    UnknownMethod(String),

    /// Invalid runtime configuration (e.g. a zero-sized worker pool).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The linear-algebra backend failed (e.g. no convergence).
    #[error("Linear algebra error: {0}")]
    Linalg(String),

    /// A decomposition produced NaN or infinite values.
    #[error("Non-finite values produced during {stage}")]
    NonFinite { stage: &'static str },

    /// A parallel task failed or panicked; the whole call is aborted.
    #[error("Worker failure: {0}")]
    WorkerFailure(String),

    /// An internal invariant was broken. Unreachable in a correct build.
    #[error("Internal invariant violated: {0}")]
    Internal(String),
}

impl SsaError {
    /// True for the errors reported by input validation, before any computation.
    pub fn is_range_violation(&self) -> bool {
        matches!(
            self,
            Self::InvalidSignal(_) | Self::LagOutOfRange { .. } | Self::ComponentsOutOfRange { .. }
        )
    }

    /// True for unrecognized or inconsistent configuration.
    pub fn is_configuration_violation(&self) -> bool {
        matches!(self, Self::UnknownMethod(_) | Self::InvalidConfig(_))
    }
}

/// Result type alias for SSA operations.
pub type Result<T> = std::result::Result<T, SsaError>;
