// SPDX-License-Identifier: AGPL-3.0-only

//! Wishart Product Validation
//!
//! Checks the sampler and the density solver against exact results:
//!
//! **Sampler**:
//! - Pool holds n_trials × T eigenvalues, in trial order
//! - Gram matrices are symmetric to round-off
//! - Trial `i` is reproducible from (seed, i) alone
//! - Mean eigenvalue E[tr B]/T = Nx·Ny/T²
//! - Level spacing ratio is GOE-like (B is similar to a symmetric matrix)
//!
//! **Density solver** (qx = qy = 0.5):
//! - 1000-point grid from 0.01 to 1.1 × max_eig
//! - ∫ρ = 1 and ∫xρ = Nx·Ny/T² = 4
//! - Non-negative ordinates; upper support edge near the simulated maximum
//! - qx = qy = 1 (singular cubic coefficients) stays finite
//!
//! # Provenance
//!
//! Burda et al. (2010) Phys. Rev. E 82, 061114
//! Atas et al. (2013) Phys. Rev. Lett. 110, 084101

use tracing_subscriber::EnvFilter;
use wishart_spectrum::config::EnsembleConfig;
use wishart_spectrum::spectral::{self, EigenvaluePool, SilentProgress, GOE_R, POISSON_R};
use wishart_spectrum::tolerances;
use wishart_spectrum::validation::ValidationHarness;

const SEED: u64 = 42;
const N_TRIALS: usize = 20;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║  Wishart Product Validation                                 ║");
    println!("║  Monte Carlo sampler + Stieltjes cubic density              ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let mut harness = ValidationHarness::new("wishart_product");

    let Ok(ensemble) = EnsembleConfig::new(40, 80, 80) else {
        harness.check_bool("ensemble config", false);
        harness.finish();
    };
    let pool = match spectral::run_trials(N_TRIALS, &ensemble, SEED, &SilentProgress) {
        Ok(p) => p,
        Err(e) => {
            println!("  sampler failed: {e}");
            harness.check_bool("sampler completes", false);
            harness.finish();
        }
    };

    check_pool_shape(&mut harness, &ensemble, &pool);
    check_gram_symmetry(&mut harness);
    check_reproducibility(&mut harness, &ensemble, &pool);
    check_simulated_mean(&mut harness, &ensemble, &pool);
    check_level_statistics(&mut harness, &pool);
    check_reference_curve(&mut harness);
    check_support_edge(&mut harness, &ensemble, &pool);
    check_unit_ratio(&mut harness);

    println!();
    harness.finish();
}

fn check_pool_shape(
    harness: &mut ValidationHarness,
    ensemble: &EnsembleConfig,
    pool: &EigenvaluePool,
) {
    println!("[1] Sampler: pool shape");
    println!(
        "  T={}, Nx={}, Ny={}, trials={N_TRIALS}",
        ensemble.t(),
        ensemble.nx(),
        ensemble.ny()
    );
    println!("  Pool: {} eigenvalues, {} flagged trials", pool.len(), pool.flagged_trials);

    harness.check_bool("pool length = n_trials × T", pool.len() == N_TRIALS * ensemble.t());
    harness.check_bool("all eigenvalues finite", pool.values.iter().all(|v| v.is_finite()));
    harness.check_bool("no flagged trials", pool.flagged_trials == 0);
    println!();
}

fn check_gram_symmetry(harness: &mut ValidationHarness) {
    println!("[2] Sampler: Gram symmetry");
    let mut rng = spectral::trial_rng(SEED, 999);
    let x = spectral::gaussian_matrix(&mut rng, 60, 120);
    let asym = spectral::max_asymmetry(&spectral::gram_matrix(&x));
    println!("  max |A - Aᵗ| = {asym:.3e}");
    harness.check_upper("Gram matrix symmetric", asym, tolerances::GRAM_SYMMETRY_TOLERANCE);
    println!();
}

fn check_reproducibility(
    harness: &mut ValidationHarness,
    ensemble: &EnsembleConfig,
    pool: &EigenvaluePool,
) {
    println!("[3] Sampler: per-trial reproducibility");
    let trial = 3;
    let t = ensemble.t();
    let first = spectral::generate_trial(ensemble, &mut spectral::trial_rng(SEED, trial));
    let second = spectral::generate_trial(ensemble, &mut spectral::trial_rng(SEED, trial));
    let same = matches!((&first, &second), (Ok(a), Ok(b)) if a == b);
    let matches_pool = first
        .as_ref()
        .is_ok_and(|a| a.as_slice() == &pool.values[trial * t..(trial + 1) * t]);
    println!("  trial {trial}: repeat identical = {same}, matches pool slice = {matches_pool}");
    harness.check_bool("trial reproducible from (seed, index)", same);
    harness.check_bool("pool preserves trial order", matches_pool);
    println!();
}

fn check_simulated_mean(
    harness: &mut ValidationHarness,
    ensemble: &EnsembleConfig,
    pool: &EigenvaluePool,
) {
    println!("[4] Sampler: mean eigenvalue");
    let expected = spectral::expected_mean_eigenvalue(ensemble);
    let mean = pool.values.iter().sum::<f64>() / pool.len() as f64;
    println!("  ⟨λ⟩ = {mean:.4}, exact Nx·Ny/T² = {expected:.4}");
    harness.check_rel(
        "simulated mean = Nx·Ny/T²",
        mean,
        expected,
        tolerances::SIMULATED_MEAN_REL_TOLERANCE,
    );
    println!();
}

fn check_level_statistics(harness: &mut ValidationHarness, pool: &EigenvaluePool) {
    println!("[5] Sampler: level spacing ratio");
    let ratios: Vec<f64> = pool
        .values
        .chunks(pool.trial_size)
        .map(|trial| {
            let mut sorted = trial.to_vec();
            sorted.sort_by(f64::total_cmp);
            spectral::level_spacing_ratio(&sorted)
        })
        .collect();
    let r = ratios.iter().sum::<f64>() / ratios.len() as f64;
    let midpoint = 0.5 * (POISSON_R + GOE_R);
    println!("  ⟨r⟩ = {r:.4} (Poisson {POISSON_R:.4}, GOE {GOE_R:.4})");
    harness.check_lower("⟨r⟩ shows level repulsion", r, midpoint);
    println!();
}

fn check_reference_curve(harness: &mut ValidationHarness) {
    println!("[6] Density: qx = qy = 0.5 reference curve");
    let max_eig = 18.0;
    let curve = match EnsembleConfig::new(500, 1000, 1000)
        .and_then(|c| spectral::compute_density(&c, max_eig))
    {
        Ok(c) => c,
        Err(e) => {
            println!("  solver failed: {e}");
            harness.check_bool("reference curve computed", false);
            return;
        }
    };
    let integral = spectral::trapezoid(&curve.x, &curve.density);
    let moment = spectral::first_moment(&curve.x, &curve.density);
    let last = curve.x.last().copied().unwrap_or(f64::NAN);
    println!("  grid: {} points on [{:.2}, {last:.2}]", curve.len(), curve.x[0]);
    println!("  ∫ρ = {integral:.5}, ∫xρ = {moment:.5}, clipped = {}", curve.clipped);

    harness.check_bool(
        "curve has 1000 points",
        curve.len() == tolerances::DENSITY_GRID_POINTS,
    );
    harness.check_abs(
        "grid starts at 0.01",
        curve.x[0],
        tolerances::DENSITY_GRID_FLOOR,
        tolerances::EXACT_F64,
    );
    harness.check_abs(
        "grid ends at 1.1 × max_eig",
        last,
        tolerances::DENSITY_GRID_HEADROOM * max_eig,
        tolerances::EXACT_F64,
    );
    harness.check_bool("density non-negative", curve.density.iter().all(|&d| d >= 0.0));
    harness.check_abs(
        "∫ρ dx = 1",
        integral,
        1.0,
        tolerances::DENSITY_NORMALIZATION_TOLERANCE,
    );
    harness.check_rel("∫xρ dx = Nx·Ny/T²", moment, 4.0, tolerances::FIRST_MOMENT_REL_TOLERANCE);
    println!();
}

fn check_support_edge(
    harness: &mut ValidationHarness,
    ensemble: &EnsembleConfig,
    pool: &EigenvaluePool,
) {
    println!("[7] Density vs simulation: upper support edge");
    let Some(sim_max) = pool.max() else {
        harness.check_bool("simulated maximum exists", false);
        return;
    };
    let edge = spectral::compute_density(ensemble, sim_max).ok().and_then(|c| {
        spectral::support_upper_edge(&c.x, &c.density, tolerances::SUPPORT_DENSITY_THRESHOLD)
    });
    let Some(edge) = edge else {
        harness.check_bool("theory support edge found", false);
        return;
    };
    println!("  theory edge ≈ {edge:.3}, simulated max = {sim_max:.3}");
    harness.check_rel(
        "support edge ≈ simulated max",
        edge,
        sim_max,
        tolerances::SUPPORT_EDGE_REL_TOLERANCE,
    );
    println!();
}

fn check_unit_ratio(harness: &mut ValidationHarness) {
    println!("[8] Density: qx = qy = 1");
    let finite = EnsembleConfig::new(50, 50, 50)
        .and_then(|c| spectral::compute_density(&c, 5.0))
        .is_ok_and(|curve| {
            curve.len() == tolerances::DENSITY_GRID_POINTS
                && curve.density.iter().all(|d| d.is_finite())
        });
    println!("  finite curve = {finite}");
    harness.check_bool("qx = qy = 1 curve finite", finite);
    println!();
}
