// SPDX-License-Identifier: AGPL-3.0-only

//! Persistence of run outputs.
//!
//! - Eigenvalue dump: one value per line in `%.18e` style, no header, full
//!   overwrite (the format `numpy.savetxt` produces for a 1-D array).
//! - Density dump: two space-separated columns `x density`.
//! - Run summary: pretty-printed JSON, machine-readable.

use crate::error::WishartError;
use crate::spectral::{DensityCurve, SpectrumSummary};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Write pooled eigenvalues, one per line, replacing any existing file.
///
/// # Errors
///
/// Returns [`WishartError::Io`] on any filesystem failure.
pub fn write_eigenvalues(path: &Path, values: &[f64]) -> Result<(), WishartError> {
    let mut w = BufWriter::new(File::create(path)?);
    for v in values {
        writeln!(w, "{v:.18e}")?;
    }
    w.flush()?;
    Ok(())
}

/// Read a single-column eigenvalue dump; blank lines are skipped.
///
/// # Errors
///
/// Returns [`WishartError::Io`] if the file cannot be read and
/// [`WishartError::InvalidInput`] naming the first unparseable line.
pub fn read_eigenvalues(path: &Path) -> Result<Vec<f64>, WishartError> {
    let reader = BufReader::new(File::open(path)?);
    let mut values = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let v = trimmed.parse::<f64>().map_err(|_| {
            WishartError::InvalidInput(format!(
                "{}:{}: not a number: {trimmed:?}",
                path.display(),
                lineno + 1
            ))
        })?;
        values.push(v);
    }
    Ok(values)
}

/// Write the density curve as `x density` lines.
///
/// # Errors
///
/// Returns [`WishartError::Io`] on any filesystem failure.
pub fn write_density_curve(path: &Path, curve: &DensityCurve) -> Result<(), WishartError> {
    let mut w = BufWriter::new(File::create(path)?);
    for (x, d) in curve.points() {
        writeln!(w, "{x:.18e} {d:.18e}")?;
    }
    w.flush()?;
    Ok(())
}

/// Machine-readable record of one study run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Trial sample size T.
    pub t: usize,
    /// Feature dimension Nx.
    pub nx: usize,
    /// Feature dimension Ny.
    pub ny: usize,
    /// qx = T / Nx.
    pub qx: f64,
    /// qy = T / Ny.
    pub qy: f64,
    /// Trials pooled.
    pub n_trials: usize,
    /// Base seed of the trial streams.
    pub seed: u64,
    /// Pooled spectrum statistics.
    pub spectrum: SpectrumSummary,
    /// Nx·Ny / T², the exact expected mean eigenvalue.
    pub expected_mean: f64,
    /// Largest |Im λ| discarded by the real-part projection.
    pub max_imag: f64,
    /// Trials whose imaginary parts exceeded the round-off allowance.
    pub flagged_trials: usize,
    /// Grid points in the theory curve.
    pub density_points: usize,
    /// ∫ρ dx over the grid.
    pub density_integral: f64,
    /// ∫xρ dx over the grid.
    pub density_first_moment: f64,
    /// Grid points clipped to zero density.
    pub clipped_points: usize,
    /// Wall-clock time of the run in seconds.
    pub wall_seconds: f64,
}

/// Write a run summary as pretty JSON.
///
/// # Errors
///
/// Returns [`WishartError::Io`] or [`WishartError::Json`] on failure.
pub fn write_summary(path: &Path, summary: &RunSummary) -> Result<(), WishartError> {
    let mut w = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut w, summary)?;
    writeln!(w)?;
    w.flush()?;
    Ok(())
}
