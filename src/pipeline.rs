// SPDX-License-Identifier: AGPL-3.0-only

//! Study orchestration: sample, persist, solve, plot, summarize.
//!
//! Stages run in a fixed order and the first failure aborts the run. The
//! eigenvalue dump is written before the density curve is attempted, so a
//! solver failure still leaves the raw spectrum on disk.

use crate::config::RunConfig;
use crate::error::WishartError;
use crate::io::{write_density_curve, write_eigenvalues, write_summary, RunSummary};
use crate::plot::plot_results;
use crate::spectral::{
    compute_density, expected_mean_eigenvalue, first_moment, run_trials, trapezoid,
    DensityCurve, EigenvaluePool, SpectrumSummary, TrialObserver,
};
use std::time::Instant;
use tracing::info;

/// Everything one study run produced.
#[derive(Debug)]
pub struct RunReport {
    /// Pooled eigenvalues from every trial.
    pub pool: EigenvaluePool,
    /// Theoretical density on the plotting grid.
    pub curve: DensityCurve,
    /// Record written to the summary file (when enabled).
    pub summary: RunSummary,
}

/// Execute a full study for `config`.
///
/// When `config.threads` is set the parallel stages run on a dedicated
/// rayon pool of that size; otherwise the global pool is used.
///
/// # Errors
///
/// Returns [`WishartError::Dimension`] for a zero dimension, trial count, or
/// thread count, [`WishartError::Config`] if the thread pool cannot be built,
/// and propagates the first sampler, solver, I/O, or plotting failure.
pub fn run(config: &RunConfig, observer: &dyn TrialObserver) -> Result<RunReport, WishartError> {
    config.validate()?;
    match config.threads {
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| WishartError::Config(format!("thread pool: {e}")))?;
            pool.install(|| run_stages(config, observer))
        }
        None => run_stages(config, observer),
    }
}

fn run_stages(config: &RunConfig, observer: &dyn TrialObserver) -> Result<RunReport, WishartError> {
    let t0 = Instant::now();
    let ensemble = config.ensemble()?;

    let pool = run_trials(config.n_trials, &ensemble, config.seed, observer)?;
    let spectrum = SpectrumSummary::from_values(&pool.values)?;
    info!(
        count = spectrum.count,
        max = spectrum.max,
        mean = spectrum.mean,
        "simulation complete"
    );

    write_eigenvalues(&config.eigenvalue_output, &pool.values)?;
    info!(path = %config.eigenvalue_output.display(), "eigenvalues written");

    let curve = compute_density(&ensemble, spectrum.max)?;
    if let Some(path) = &config.density_output {
        write_density_curve(path, &curve)?;
        info!(path = %path.display(), "density curve written");
    }
    if let Some(path) = &config.plot_output {
        plot_results(path, &pool.values, &curve)?;
        info!(path = %path.display(), "chart written");
    }

    let summary = RunSummary {
        t: ensemble.t(),
        nx: ensemble.nx(),
        ny: ensemble.ny(),
        qx: ensemble.qx(),
        qy: ensemble.qy(),
        n_trials: config.n_trials,
        seed: config.seed,
        spectrum,
        expected_mean: expected_mean_eigenvalue(&ensemble),
        max_imag: pool.max_imag,
        flagged_trials: pool.flagged_trials,
        density_points: curve.len(),
        density_integral: trapezoid(&curve.x, &curve.density),
        density_first_moment: first_moment(&curve.x, &curve.density),
        clipped_points: curve.clipped,
        wall_seconds: t0.elapsed().as_secs_f64(),
    };
    if let Some(path) = &config.summary_output {
        write_summary(path, &summary)?;
        info!(path = %path.display(), "summary written");
    }

    Ok(RunReport {
        pool,
        curve,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::read_eigenvalues;
    use crate::spectral::SilentProgress;

    fn small_config(dir: &std::path::Path) -> RunConfig {
        RunConfig {
            t: 20,
            nx: 40,
            ny: 40,
            n_trials: 3,
            seed: 7,
            eigenvalue_output: dir.join("eigs.txt"),
            density_output: Some(dir.join("curve.txt")),
            summary_output: Some(dir.join("summary.json")),
            plot_output: Some(dir.join("chart.svg")),
            threads: Some(2),
        }
    }

    #[test]
    fn small_run_writes_every_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let config = small_config(dir.path());
        let report = run(&config, &SilentProgress).unwrap();

        assert_eq!(report.pool.len(), 60);
        assert_eq!(report.curve.len(), crate::tolerances::DENSITY_GRID_POINTS);
        assert_eq!(read_eigenvalues(&config.eigenvalue_output).unwrap(), report.pool.values);
        assert!(dir.path().join("curve.txt").exists());
        assert!(dir.path().join("summary.json").exists());
        assert!(dir.path().join("chart.svg").exists());
        assert!((report.summary.expected_mean - 4.0).abs() < 1e-12);
    }

    #[test]
    fn optional_outputs_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig {
            density_output: None,
            summary_output: None,
            plot_output: None,
            threads: None,
            ..small_config(dir.path())
        };
        run(&config, &SilentProgress).unwrap();
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn invalid_config_fails_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig {
            n_trials: 0,
            ..small_config(dir.path())
        };
        assert!(matches!(
            run(&config, &SilentProgress),
            Err(WishartError::Dimension {
                name: "n_trials",
                ..
            })
        ));
        assert!(!config.eigenvalue_output.exists());
    }

    #[test]
    fn zero_threads_is_a_dimension_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig {
            threads: Some(0),
            ..small_config(dir.path())
        };
        assert!(matches!(
            run(&config, &SilentProgress),
            Err(WishartError::Dimension {
                name: "threads",
                ..
            })
        ));
    }
}
