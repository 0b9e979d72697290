// SPDX-License-Identifier: AGPL-3.0-only

//! Centralized numerical constants and validation tolerances.
//!
//! Every threshold used by the sampler, the density solver, and the
//! validation binary is defined here with its origin. No ad-hoc magic numbers
//! in the numerical modules.
//!
//! | Category | Basis | Example |
//! |----------|-------|---------|
//! | Machine precision | IEEE 754 f64 | 1e-10 for Gram symmetry |
//! | Numerical method | Algorithm convergence | 1e-8 root backward error |
//! | Model | Finite-size / finite-ε effects | 2% curve normalization |
//! | Statistical | Monte Carlo fluctuation | 10% simulated mean |

// ═══════════════════════════════════════════════════════════════════
// Machine-precision tolerances (IEEE 754 f64)
// ═══════════════════════════════════════════════════════════════════

/// Tolerance for operations that should be exact in f64 arithmetic.
///
/// 1e-10 allows 5 digits of accumulated rounding in compositions of exact
/// operations (matrix products, rescaling).
pub const EXACT_F64: f64 = 1e-10;

/// Tolerance for f64 operations with moderate accumulation.
///
/// Iterative algorithms (Newton polishing, QR sweeps) accumulate O(n)
/// rounding steps; 1e-8 keeps ~7 digits after iteration.
pub const ITERATIVE_F64: f64 = 1e-8;

/// Relative asymmetry allowed in a Gram matrix X·Xᵗ.
///
/// Entries (i, j) and (j, i) are the same dot product summed in possibly
/// different blocked order by the GEMM kernel.
pub const GRAM_SYMMETRY_TOLERANCE: f64 = EXACT_F64;

// ═══════════════════════════════════════════════════════════════════
// Ensemble sampler
// ═══════════════════════════════════════════════════════════════════

/// Real Schur iteration cap, per matrix dimension.
///
/// Francis double-shift QR typically needs 2–4 sweeps per eigenvalue; 100
/// per dimension only triggers on genuine non-convergence.
pub const SCHUR_MAX_ITER_PER_DIM: usize = 100;

/// Largest |Im λ| accepted as round-off, relative to `max(1, max |λ|)`.
///
/// B = A·A1/T² is similar to the PSD matrix A^{1/2}·A1·A^{1/2}/T², so its
/// spectrum is real. Clusters of (near-)zero eigenvalues in rank-deficient
/// ensembles (T > Nx or T > Ny) split into complex pairs of size
/// ~√ε_mach·‖B‖ ≈ 1e-8·‖B‖; 1e-6 leaves two orders of headroom.
pub const IMAG_PART_REL_TOLERANCE: f64 = 1e-6;

/// Progress notification cadence of `run_trials` (every 100th trial).
pub const PROGRESS_INTERVAL: usize = 100;

// ═══════════════════════════════════════════════════════════════════
// Spectral density solver
// ═══════════════════════════════════════════════════════════════════

/// Imaginary regularization ε in z = x − iε.
pub const REGULARIZATION_EPSILON: f64 = 1e-4;

/// Number of abscissas in the density grid.
pub const DENSITY_GRID_POINTS: usize = 1000;

/// First abscissa of the density grid (keeps z away from the pole at 0).
pub const DENSITY_GRID_FLOOR: f64 = 0.01;

/// Last abscissa is `DENSITY_GRID_HEADROOM × max_eig`.
pub const DENSITY_GRID_HEADROOM: f64 = 1.1;

/// Maximum relative backward error of a polished polynomial root:
/// |p(g)| / Σ|a_k||g|^k.
pub const ROOT_RESIDUAL_TOLERANCE: f64 = ITERATIVE_F64;

/// Newton polishing stops once |Δg| <= this × max(1, |g|).
pub const NEWTON_STEP_TOLERANCE: f64 = 1e-14;

/// Newton polishing iteration cap per root.
pub const NEWTON_MAX_ITER: usize = 50;

/// A leading coefficient below this × max|a_k| is treated as zero and the
/// polynomial degree is reduced.
pub const DEGENERATE_LEADING_REL: f64 = 1e-14;

// ═══════════════════════════════════════════════════════════════════
// Presentation
// ═══════════════════════════════════════════════════════════════════

/// Histogram bins of the simulated spectrum in the chart.
pub const HISTOGRAM_BINS: usize = 50;

// ═══════════════════════════════════════════════════════════════════
// Validation tolerances
// ═══════════════════════════════════════════════════════════════════

/// |∫ρ dx − 1| for a full-rank ensemble (qx, qy < 1).
///
/// Finite ε = 1e-4 and the trapezoid rule on 1000 points lose mass at the
/// square-root edges; the qx = qy = 0.5 curve integrates to 1.0009.
pub const DENSITY_NORMALIZATION_TOLERANCE: f64 = 0.02;

/// Relative error of ∫x ρ dx against Nx·Ny/T² for a full-rank ensemble.
pub const FIRST_MOMENT_REL_TOLERANCE: f64 = 0.02;

/// Relative error of the simulated mean eigenvalue against Nx·Ny/T².
///
/// The pooled mean is tr(B)/T per trial; its trial-to-trial fluctuation is
/// a few percent for T ~ 50 and shrinks as 1/√n_trials.
pub const SIMULATED_MEAN_REL_TOLERANCE: f64 = 0.10;

/// Relative gap allowed between the largest simulated eigenvalue and the
/// upper edge of the theoretical support.
pub const SUPPORT_EDGE_REL_TOLERANCE: f64 = 0.25;

/// Density below which a grid point counts as outside the support.
pub const SUPPORT_DENSITY_THRESHOLD: f64 = 1e-3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::assertions_on_constants)] // constants sanity check
    fn tolerance_ordering() {
        assert!(EXACT_F64 < ITERATIVE_F64);
        assert!(NEWTON_STEP_TOLERANCE < ROOT_RESIDUAL_TOLERANCE);
        assert!(DEGENERATE_LEADING_REL < ROOT_RESIDUAL_TOLERANCE);
        assert!(ITERATIVE_F64 < IMAG_PART_REL_TOLERANCE);
    }

    #[test]
    #[allow(clippy::assertions_on_constants)] // constants sanity check
    fn grid_constants_are_sane() {
        assert!(DENSITY_GRID_POINTS >= 2);
        assert!(DENSITY_GRID_FLOOR > 0.0);
        assert!(DENSITY_GRID_HEADROOM > 1.0);
        assert!(REGULARIZATION_EPSILON < DENSITY_GRID_FLOOR);
    }

    #[test]
    #[allow(clippy::assertions_on_constants)] // constants sanity check
    fn validation_tolerances_are_fractions() {
        for tol in [
            DENSITY_NORMALIZATION_TOLERANCE,
            FIRST_MOMENT_REL_TOLERANCE,
            SIMULATED_MEAN_REL_TOLERANCE,
            SUPPORT_EDGE_REL_TOLERANCE,
        ] {
            assert!(tol > 0.0 && tol < 1.0);
        }
    }
}
