// SPDX-License-Identifier: AGPL-3.0-only

//! Typed errors for the Wishart product study.
//!
//! Every fallible operation in the crate returns `WishartError` so callers can
//! pattern-match on the failure mode (bad matrix shape, non-convergent
//! numerics, persistence) instead of parsing strings. Nothing in the core
//! recovers locally: a failure aborts the run.

use std::fmt;

/// Errors arising from sampling, density evaluation, configuration, or output.
#[derive(Debug)]
pub enum WishartError {
    /// A matrix dimension or trial count is zero.
    Dimension {
        /// Name of the offending parameter (`T`, `Nx`, `Ny`, `n_trials`, `threads`).
        name: &'static str,
        /// The rejected value.
        value: usize,
    },

    /// Eigen-decomposition or polynomial root finding did not converge, or
    /// produced non-finite values.
    Numerical(String),

    /// An argument outside the domain of the operation (e.g. `max_eig <= 0`).
    InvalidInput(String),

    /// Malformed CLI flag or configuration file content.
    Config(String),

    /// Filesystem failure while persisting results.
    Io(std::io::Error),

    /// JSON (de)serialization failure.
    Json(serde_json::Error),

    /// Chart rendering failure (wraps the backend error message).
    Plot(String),
}

impl fmt::Display for WishartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dimension { name, value } => {
                write!(f, "Invalid dimension: {name}={value} (must be >= 1)")
            }
            Self::Numerical(msg) => write!(f, "Numerical failure: {msg}"),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Json(e) => write!(f, "JSON error: {e}"),
            Self::Plot(msg) => write!(f, "Plot rendering failed: {msg}"),
        }
    }
}

impl std::error::Error for WishartError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for WishartError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for WishartError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Reject a zero dimension, naming the parameter in the error.
///
/// # Errors
///
/// Returns [`WishartError::Dimension`] if `value == 0`.
pub fn require_positive(name: &'static str, value: usize) -> Result<usize, WishartError> {
    if value == 0 {
        Err(WishartError::Dimension { name, value })
    } else {
        Ok(value)
    }
}
