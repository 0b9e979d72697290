// SPDX-License-Identifier: AGPL-3.0-only

//! Spectrum statistics: pool summary, density histogram, curve moments,
//! analytic reference values, and level-spacing ratio.
//!
//! The histogram and the curve integrals are what the chart and the
//! validation binary compare; the analytic references follow from
//! E[tr(X·Xᵗ·Y·Yᵗ)] = T·Nx·Ny.

use crate::config::EnsembleConfig;
use crate::error::WishartError;
use serde::{Deserialize, Serialize};

/// Count, extremes, and mean of a pooled spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrumSummary {
    /// Number of eigenvalues.
    pub count: usize,
    /// Smallest eigenvalue.
    pub min: f64,
    /// Largest eigenvalue.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
}

impl SpectrumSummary {
    /// Summarize a non-empty slice of eigenvalues.
    ///
    /// # Errors
    ///
    /// Returns [`WishartError::InvalidInput`] for an empty slice or a
    /// non-finite value.
    pub fn from_values(values: &[f64]) -> Result<Self, WishartError> {
        if values.is_empty() {
            return Err(WishartError::InvalidInput(
                "cannot summarize an empty spectrum".to_string(),
            ));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(WishartError::InvalidInput(format!(
                "non-finite eigenvalue {bad} in spectrum"
            )));
        }
        let (min, max, sum) = values.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(lo, hi, s), &v| (lo.min(v), hi.max(v), s + v),
        );
        Ok(Self {
            count: values.len(),
            min,
            max,
            mean: sum / values.len() as f64,
        })
    }
}

/// One bar of a density-normalized histogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    /// Left edge.
    pub lo: f64,
    /// Right edge.
    pub hi: f64,
    /// count / (total · width), so Σ height·width = 1.
    pub height: f64,
}

/// Equal-width histogram over [min, max] normalized to unit area.
///
/// The last bin is closed on the right. A degenerate range (all values
/// equal) is widened to [v − 0.5, v + 0.5].
///
/// # Errors
///
/// Returns [`WishartError::InvalidInput`] for zero bins, an empty slice, or
/// non-finite values.
pub fn density_histogram(values: &[f64], bins: usize) -> Result<Vec<HistogramBin>, WishartError> {
    if bins == 0 {
        return Err(WishartError::InvalidInput(
            "histogram needs at least one bin".to_string(),
        ));
    }
    let summary = SpectrumSummary::from_values(values)?;
    let (lo, hi) = if summary.max > summary.min {
        (summary.min, summary.max)
    } else {
        (summary.min - 0.5, summary.max + 0.5)
    };
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let norm = values.len() as f64 * width;
    Ok(counts
        .iter()
        .enumerate()
        .map(|(i, &n)| HistogramBin {
            lo: lo + width * i as f64,
            hi: lo + width * (i + 1) as f64,
            height: n as f64 / norm,
        })
        .collect())
}

/// Trapezoid-rule integral of y(x) over the sample points.
#[must_use]
pub fn trapezoid(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xw, yw)| (xw[1] - xw[0]) * (yw[0] + yw[1]) * 0.5)
        .sum()
}

/// First moment ∫ x·ρ(x) dx of a sampled density (trapezoid rule).
#[must_use]
pub fn first_moment(x: &[f64], density: &[f64]) -> f64 {
    let weighted: Vec<f64> = x.iter().zip(density).map(|(a, b)| a * b).collect();
    trapezoid(x, &weighted)
}

/// Largest abscissa where the sampled density exceeds `threshold`.
#[must_use]
pub fn support_upper_edge(x: &[f64], density: &[f64], threshold: f64) -> Option<f64> {
    x.iter()
        .zip(density)
        .filter(|&(_, &d)| d > threshold)
        .map(|(&xi, _)| xi)
        .reduce(f64::max)
}

/// Exact mean eigenvalue E[tr B]/T = Nx·Ny / T² = 1 / (qx·qy).
#[must_use]
pub fn expected_mean_eigenvalue(config: &EnsembleConfig) -> f64 {
    1.0 / (config.qx() * config.qy())
}

/// Fraction of eigenvalues that are not structurally zero:
/// rank(B)/T = min(T, Nx, Ny)/T.
#[must_use]
pub fn continuous_mass(config: &EnsembleConfig) -> f64 {
    config.t().min(config.nx()).min(config.ny()) as f64 / config.t() as f64
}

/// Mean level spacing ratio ⟨r⟩ of sorted eigenvalues,
/// rᵢ = min(sᵢ, sᵢ₊₁) / max(sᵢ, sᵢ₊₁) with sᵢ = λᵢ₊₁ − λᵢ.
///
/// Zero spacings are skipped; fewer than three eigenvalues give 0.
///
/// # Provenance
/// Oganesyan & Huse (2007), Phys. Rev. B 75, 155111
/// Atas et al. (2013), Phys. Rev. Lett. 110, 084101
#[must_use]
pub fn level_spacing_ratio(sorted: &[f64]) -> f64 {
    let (sum, count) = sorted
        .windows(3)
        .map(|w| (w[1] - w[0], w[2] - w[1]))
        .filter(|&(s1, s2)| s1 > 0.0 && s2 > 0.0)
        .fold((0.0, 0usize), |(sum, n), (s1, s2)| {
            (sum + s1.min(s2) / s1.max(s2), n + 1)
        });
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Poisson level spacing ratio (uncorrelated levels): 2 ln 2 − 1.
pub const POISSON_R: f64 = 0.386_294_361_119_890_6;

/// GOE level spacing ratio (real symmetric ensembles with level repulsion).
pub const GOE_R: f64 = 0.5307;
