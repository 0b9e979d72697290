// SPDX-License-Identifier: AGPL-3.0-only

//! Spectral study of the Wishart product ensemble B = (X·Xᵗ)(Y·Yᵗ)/T².
//!
//! - **wishart**: Monte Carlo sampler; per-trial Gaussian draws, Gram
//!   products, real Schur eigenvalues, pooled across independent trials
//! - **stieltjes**: limiting density from the Green's-function cubic,
//!   evaluated on a regularized grid z = x − iε
//! - **cubic**: closed-form complex roots of degree ≤ 3 with Newton polish
//! - **stats**: pool summary, density histogram, curve moments, level
//!   spacing ratio
//!
//! # Provenance
//!
//! - Wishart (1928) "The generalised product moment distribution in samples
//!   from a normal multivariate population"
//! - Marchenko & Pastur (1967) "Distribution of eigenvalues for some sets of
//!   random matrices"
//! - Burda et al. (2010) Phys. Rev. E 82, 061114 (products of rectangular
//!   Gaussian matrices)

pub mod cubic;
pub mod stats;
pub mod stieltjes;
pub mod wishart;

pub use cubic::polynomial_roots;
pub use stats::{
    continuous_mass, density_histogram, expected_mean_eigenvalue, first_moment,
    level_spacing_ratio, support_upper_edge, trapezoid, HistogramBin, SpectrumSummary, GOE_R,
    POISSON_R,
};
pub use stieltjes::{
    compute_density, density_at, linspace, regularized_point, select_physical_root,
    CubicCoefficients, DensityCurve, DensityPoint,
};
pub use wishart::{
    gaussian_matrix, generate_trial, generate_trial_spectrum, gram_matrix, imag_diagnostics,
    max_asymmetry, product_matrix, real_schur_spectrum, run_trials, trial_rng, EigenvaluePool,
    LogProgress, SilentProgress, TrialObserver, TrialSpectrum,
};
