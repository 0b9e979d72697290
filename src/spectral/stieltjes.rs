// SPDX-License-Identifier: AGPL-3.0-only

//! Limiting spectral density of the Wishart product from its Stieltjes
//! transform.
//!
//! The Green's function g(z) of B = (X·Xᵗ)(Y·Yᵗ)/T² satisfies, with
//! qx = T/Nx and qy = T/Ny,
//!
//!   a3·g³ + a2·g² + a1·g + a0 = 0
//!   a3 = z²·qx·qy
//!   a2 = z·(qy(1 − qx) + qx(1 − qy))
//!   a1 = (1 − qx)(1 − qy) − z·qx·qy
//!   a0 = qx·qy
//!
//! Evaluated at z = x − iε, the physical branch is the root with the
//! largest imaginary part and ρ(x) = Im g / π. When every root sits on or
//! below the real axis (outside the support) the density is clipped to 0.
//!
//! # Provenance
//!
//! Burda, Jarosz, Livan, Nowak, Swiech (2010) "Eigenvalues and singular
//! values of products of rectangular Gaussian random matrices",
//! Phys. Rev. E 82, 061114

use super::cubic::polynomial_roots;
use crate::config::EnsembleConfig;
use crate::error::WishartError;
use crate::tolerances::{
    DENSITY_GRID_FLOOR, DENSITY_GRID_HEADROOM, DENSITY_GRID_POINTS, REGULARIZATION_EPSILON,
};
use num_complex::Complex64;
use rayon::prelude::*;
use std::f64::consts::PI;
use tracing::{info, warn};

/// Coefficients of the Green's-function cubic at one regularized point z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicCoefficients {
    /// g³ coefficient.
    pub a3: Complex64,
    /// g² coefficient.
    pub a2: Complex64,
    /// g coefficient.
    pub a1: Complex64,
    /// Constant term.
    pub a0: Complex64,
}

impl CubicCoefficients {
    /// Coefficients for aspect ratios `qx`, `qy` at complex point `z`.
    #[must_use]
    pub fn new(qx: f64, qy: f64, z: Complex64) -> Self {
        let qq = qx * qy;
        Self {
            a3: z * z * qq,
            a2: z * (qy * (1.0 - qx) + qx * (1.0 - qy)),
            a1: Complex64::new((1.0 - qx) * (1.0 - qy), 0.0) - z * qq,
            a0: Complex64::new(qq, 0.0),
        }
    }

    /// `[a3, a2, a1, a0]`, highest degree first.
    #[must_use]
    pub const fn as_array(&self) -> [Complex64; 4] {
        [self.a3, self.a2, self.a1, self.a0]
    }
}

/// Regularized evaluation point z = x − iε.
#[must_use]
pub fn regularized_point(x: f64) -> Complex64 {
    Complex64::new(x, -REGULARIZATION_EPSILON)
}

/// Root with the largest imaginary part (`None` for an empty slice).
#[must_use]
pub fn select_physical_root(roots: &[Complex64]) -> Option<Complex64> {
    roots.iter().copied().reduce(|best, r| if r.im > best.im { r } else { best })
}

/// Density value at one abscissa, with the raw imaginary part before clipping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityPoint {
    /// Abscissa x.
    pub x: f64,
    /// max(Im g, 0) / π.
    pub density: f64,
    /// Im g of the selected root, unclipped.
    pub raw_imag: f64,
}

impl DensityPoint {
    /// Density at `x` from the selected Green's-function root `g`, clipped
    /// to zero when `g` lies below the real axis.
    #[must_use]
    pub fn from_root(x: f64, g: Complex64) -> Self {
        Self {
            x,
            density: g.im.max(0.0) / PI,
            raw_imag: g.im,
        }
    }

    /// Whether clipping changed the value (selected root below the axis).
    #[must_use]
    pub fn clipped(&self) -> bool {
        self.raw_imag < 0.0
    }
}

/// Evaluate the theoretical density at `x` for aspect ratios `qx`, `qy`.
///
/// # Errors
///
/// Returns [`WishartError::Numerical`] if the cubic's roots cannot be found
/// to the required backward error.
pub fn density_at(qx: f64, qy: f64, x: f64) -> Result<DensityPoint, WishartError> {
    let coeffs = CubicCoefficients::new(qx, qy, regularized_point(x));
    let roots = polynomial_roots(&coeffs.as_array())?;
    let g = select_physical_root(&roots)
        .ok_or_else(|| WishartError::Numerical(format!("no roots at x={x}")))?;
    Ok(DensityPoint::from_root(x, g))
}

/// `n` equally spaced points from `start` to `end` inclusive.
///
/// The last point is exactly `end`; `start > end` yields a descending grid.
#[must_use]
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            let mut grid: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            grid[n - 1] = end;
            grid
        }
    }
}

/// Theoretical density sampled on the plotting grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityCurve {
    /// Grid abscissas, from 0.01 to 1.1 × max_eig.
    pub x: Vec<f64>,
    /// Non-negative density ordinates, same length as `x`.
    pub density: Vec<f64>,
    /// Grid points whose selected root had negative imaginary part.
    pub clipped: usize,
}

impl DensityCurve {
    /// Assemble a curve from evaluated points, counting the clipped ones.
    #[must_use]
    pub fn from_points(points: &[DensityPoint]) -> Self {
        Self {
            x: points.iter().map(|p| p.x).collect(),
            density: points.iter().map(|p| p.density).collect(),
            clipped: points.iter().filter(|p| p.clipped()).count(),
        }
    }

    /// Number of grid points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether the curve has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// `(x, density)` pairs in grid order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + Clone + '_ {
        self.x.iter().copied().zip(self.density.iter().copied())
    }
}

/// Compute the theoretical density curve for an ensemble, on a grid sized by
/// the observed maximum eigenvalue.
///
/// Grid points are evaluated in parallel; the output keeps grid order.
///
/// # Errors
///
/// Returns [`WishartError::InvalidInput`] if `max_eig` is not finite and
/// positive, and [`WishartError::Numerical`] if any grid point fails; the
/// whole curve is abandoned rather than returned with gaps.
pub fn compute_density(
    config: &EnsembleConfig,
    max_eig: f64,
) -> Result<DensityCurve, WishartError> {
    if !max_eig.is_finite() || max_eig <= 0.0 {
        return Err(WishartError::InvalidInput(format!(
            "max_eig must be finite and positive, got {max_eig}"
        )));
    }
    let (qx, qy) = (config.qx(), config.qy());
    info!(qx, qy, max_eig, "Calculating theoretical curve");

    let grid = linspace(
        DENSITY_GRID_FLOOR,
        DENSITY_GRID_HEADROOM * max_eig,
        DENSITY_GRID_POINTS,
    );
    let points: Vec<DensityPoint> = grid
        .par_iter()
        .map(|&x| density_at(qx, qy, x))
        .collect::<Result<_, WishartError>>()?;

    let curve = DensityCurve::from_points(&points);
    if curve.clipped > 0 {
        warn!(
            clipped = curve.clipped,
            "density clipped to zero where no root lies above the axis"
        );
    }
    Ok(curve)
}
