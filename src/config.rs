// src/config.rs

use crate::error::{Result, SsaError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The SSA variant to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SsaMethod {
    /// SVD of the trajectory matrix, sequential reconstruction.
    #[default]
    Classic,
    /// Lag-covariance eigendecomposition with parallel embedding and averaging.
    Accelerated,
}

impl SsaMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SsaMethod::Classic => "classic",
            SsaMethod::Accelerated => "accelerated",
        }
    }
}

impl fmt::Display for SsaMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SsaMethod {
    type Err = SsaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "classic" => Ok(SsaMethod::Classic),
            "accelerated" => Ok(SsaMethod::Accelerated),
            other => Err(SsaError::UnknownMethod(other.to_string())),
        }
    }
}

/// Parameters of one SSA run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsaConfig {
    /// Window length L. Must satisfy `2 <= lag < signal_len / 2`.
    pub lag: usize,
    /// Number of reconstructed components. Must satisfy `1 <= num_components <= lag`.
    pub num_components: usize,
    #[serde(default)]
    pub method: SsaMethod,
    /// Upper bound on worker threads for the accelerated variant.
    /// `None` uses the global pool (one thread per CPU).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<usize>,
}

impl SsaConfig {
    /// Classic-method configuration with the global worker pool.
    pub fn new(lag: usize, num_components: usize) -> Self {
        Self {
            lag,
            num_components,
            method: SsaMethod::Classic,
            max_workers: None,
        }
    }

    pub fn with_method(mut self, method: SsaMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = Some(max_workers);
        self
    }

    /// Checks this configuration against a signal of `signal_len` samples.
    pub fn validate(&self, signal_len: usize) -> Result<()> {
        validate_ranges(signal_len, self.lag, self.num_components)?;
        if self.max_workers == Some(0) {
            return Err(SsaError::InvalidConfig("max_workers must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Range checks shared by every entry point:
/// non-empty signal, `2 <= lag < signal_len / 2`, `1 <= num_components <= lag`.
pub fn validate_ranges(signal_len: usize, lag: usize, num_components: usize) -> Result<()> {
    if signal_len == 0 {
        return Err(SsaError::InvalidSignal("signal must contain at least one sample".to_string()));
    }
    let max_exclusive = signal_len / 2;
    if lag < 2 || lag >= max_exclusive {
        return Err(SsaError::LagOutOfRange {
            lag,
            signal_len,
            max_exclusive,
        });
    }
    if num_components < 1 || num_components > lag {
        return Err(SsaError::ComponentsOutOfRange { num_components, lag });
    }
    Ok(())
}
