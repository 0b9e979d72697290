// SPDX-License-Identifier: AGPL-3.0-only

//! Ensemble sampler for the Wishart product B = (X·Xᵗ)(Y·Yᵗ) / T².
//!
//! Each trial draws X (T×Nx) and Y (T×Ny) with i.i.d. standard-normal
//! entries, forms the two Gram matrices, multiplies and rescales them, and
//! extracts the eigenvalues of B from a real Schur decomposition.
//!
//! B is not symmetric, but it is similar to A^{1/2}·A1·A^{1/2}/T² and so has
//! a real, non-negative spectrum. The imaginary parts returned by the Schur
//! form are therefore round-off; they are measured per trial and flagged
//! when they exceed [`IMAG_PART_REL_TOLERANCE`] instead of being dropped
//! silently.
//!
//! Trials are independent: trial `i` of a run draws from stream `i` of a
//! ChaCha20 generator seeded with the run seed, so the pooled spectrum is the
//! same for any thread count.

use crate::config::EnsembleConfig;
use crate::error::{require_positive, WishartError};
use crate::tolerances::{IMAG_PART_REL_TOLERANCE, PROGRESS_INTERVAL, SCHUR_MAX_ITER_PER_DIM};
use nalgebra::linalg::Schur;
use nalgebra::DMatrix;
use num_complex::Complex64;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_distr::StandardNormal;
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Dense T×N matrix with i.i.d. N(0, 1) entries.
pub fn gaussian_matrix<R: Rng + ?Sized>(rng: &mut R, rows: usize, cols: usize) -> DMatrix<f64> {
    DMatrix::from_fn(rows, cols, |_, _| rng.sample::<f64, _>(StandardNormal))
}

/// Gram matrix M·Mᵗ (symmetric positive semi-definite by construction).
#[must_use]
pub fn gram_matrix(m: &DMatrix<f64>) -> DMatrix<f64> {
    m * m.transpose()
}

/// Product matrix B = (A·A1) / T², with T the dimension of the Gram matrices.
///
/// # Errors
///
/// Returns [`WishartError::InvalidInput`] if the Gram matrices are not square
/// and of equal dimension.
pub fn product_matrix(a: &DMatrix<f64>, a1: &DMatrix<f64>) -> Result<DMatrix<f64>, WishartError> {
    if !a.is_square() || !a1.is_square() || a.nrows() != a1.nrows() {
        return Err(WishartError::InvalidInput(format!(
            "Gram matrices must be square and equal: {}x{} vs {}x{}",
            a.nrows(),
            a.ncols(),
            a1.nrows(),
            a1.ncols()
        )));
    }
    let t = a.nrows() as f64;
    Ok((a * a1) / (t * t))
}

/// Largest relative asymmetry max|M_ij − M_ji| / max(1, max|M_ij|).
#[must_use]
pub fn max_asymmetry(m: &DMatrix<f64>) -> f64 {
    let scale = m.amax().max(1.0);
    let mut worst = 0.0f64;
    for i in 0..m.nrows() {
        for j in (i + 1)..m.ncols() {
            worst = worst.max((m[(i, j)] - m[(j, i)]).abs());
        }
    }
    worst / scale
}

/// Eigenvalues of one trial plus the diagnostics of the real-part projection.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialSpectrum {
    /// Real parts of the T eigenvalues of B, in Schur order.
    pub eigenvalues: Vec<f64>,
    /// max |Im λ| over the trial.
    pub max_imag: f64,
    /// Whether `max_imag` exceeded the round-off allowance.
    pub flagged: bool,
}

/// All eigenvalues (complex) of a square matrix via real Schur decomposition.
///
/// # Errors
///
/// Returns [`WishartError::Numerical`] if the Schur iteration does not
/// converge within `SCHUR_MAX_ITER_PER_DIM × n` sweeps or produces
/// non-finite eigenvalues.
pub fn real_schur_spectrum(
    m: DMatrix<f64>,
) -> Result<Vec<Complex64>, WishartError> {
    let n = m.nrows();
    let schur = Schur::try_new(m, f64::EPSILON, SCHUR_MAX_ITER_PER_DIM * n.max(1))
        .ok_or_else(|| {
            WishartError::Numerical(format!("Schur decomposition of {n}x{n} matrix did not converge"))
        })?;
    let eigs: Vec<Complex64> = schur.complex_eigenvalues().iter().copied().collect();
    if eigs.iter().any(|l| !l.re.is_finite() || !l.im.is_finite()) {
        return Err(WishartError::Numerical(
            "non-finite eigenvalue in Schur spectrum".to_string(),
        ));
    }
    Ok(eigs)
}

/// Largest |Im λ| of a spectrum, and whether it exceeds
/// [`IMAG_PART_REL_TOLERANCE`] × max(1, max |λ|).
#[must_use]
pub fn imag_diagnostics(eigs: &[Complex64]) -> (f64, bool) {
    let max_imag = eigs.iter().map(|l| l.im.abs()).fold(0.0, f64::max);
    let scale = eigs.iter().map(|l| l.norm()).fold(1.0, f64::max);
    (max_imag, max_imag > IMAG_PART_REL_TOLERANCE * scale)
}

/// Draw one trial and return its spectrum with imaginary-part diagnostics.
///
/// # Errors
///
/// Propagates [`WishartError::Numerical`] from the eigen-decomposition.
pub fn generate_trial_spectrum<R: Rng + ?Sized>(
    config: &EnsembleConfig,
    rng: &mut R,
) -> Result<TrialSpectrum, WishartError> {
    let t = config.t();
    let x = gaussian_matrix(rng, t, config.nx());
    let y = gaussian_matrix(rng, t, config.ny());

    let a = gram_matrix(&x);
    let a1 = gram_matrix(&y);
    let b = product_matrix(&a, &a1)?;

    let eigs = real_schur_spectrum(b)?;

    let (max_imag, flagged) = imag_diagnostics(&eigs);

    Ok(TrialSpectrum {
        eigenvalues: eigs.iter().map(|l| l.re).collect(),
        max_imag,
        flagged,
    })
}

/// Draw one trial and return the real parts of its T eigenvalues.
///
/// Identical generator state gives identical output.
///
/// # Errors
///
/// Propagates [`WishartError::Numerical`] from the eigen-decomposition.
pub fn generate_trial<R: Rng + ?Sized>(
    config: &EnsembleConfig,
    rng: &mut R,
) -> Result<Vec<f64>, WishartError> {
    generate_trial_spectrum(config, rng).map(|s| s.eigenvalues)
}

/// Independent generator for trial `trial` of a run seeded with `seed`.
///
/// Every trial gets its own ChaCha20 stream, so trials can run on any thread
/// in any order without sharing generator state.
#[must_use]
pub fn trial_rng(seed: u64, trial: usize) -> ChaCha20Rng {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    rng.set_stream(trial as u64);
    rng
}

/// Receives the periodic progress notifications of [`run_trials`].
pub trait TrialObserver: Sync {
    /// Called when trial `index` (0-based) of `total` starts, for every
    /// index that is a multiple of [`PROGRESS_INTERVAL`].
    fn on_progress(&self, index: usize, total: usize);
}

/// Observer that emits an `info!` event per notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl TrialObserver for LogProgress {
    fn on_progress(&self, index: usize, total: usize) {
        info!(index, total, "Processing trial {index}/{total}");
    }
}

/// Observer that ignores notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl TrialObserver for SilentProgress {
    fn on_progress(&self, _index: usize, _total: usize) {}
}

/// Eigenvalues of all trials, concatenated in trial order.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenvaluePool {
    /// Pooled real eigenvalues; length `n_trials × T`.
    pub values: Vec<f64>,
    /// Number of trials pooled.
    pub n_trials: usize,
    /// Eigenvalues per trial (T).
    pub trial_size: usize,
    /// Largest |Im λ| seen in any trial.
    pub max_imag: f64,
    /// Trials whose imaginary parts exceeded the round-off allowance.
    pub flagged_trials: usize,
}

impl EigenvaluePool {
    /// Number of pooled eigenvalues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the pool is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Concatenate per-trial spectra in order, accumulating the
    /// imaginary-part diagnostics.
    #[must_use]
    pub fn from_spectra(spectra: Vec<TrialSpectrum>, trial_size: usize) -> Self {
        let n_trials = spectra.len();
        let mut values = Vec::with_capacity(n_trials * trial_size);
        let mut max_imag = 0.0f64;
        let mut flagged_trials = 0;
        for spectrum in spectra {
            max_imag = max_imag.max(spectrum.max_imag);
            flagged_trials += usize::from(spectrum.flagged);
            values.extend(spectrum.eigenvalues);
        }
        Self {
            values,
            n_trials,
            trial_size,
            max_imag,
            flagged_trials,
        }
    }

    /// Largest pooled eigenvalue (`None` for an empty pool).
    #[must_use]
    pub fn max(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::max)
    }
}

/// Run `n_trials` independent trials and pool their eigenvalues.
///
/// Trials fan out over the current rayon pool; the result is the in-order
/// concatenation of `generate_trial(config, &mut trial_rng(seed, i))` for
/// `i in 0..n_trials`, independent of thread count.
///
/// # Errors
///
/// Returns [`WishartError::Dimension`] if `n_trials == 0`, and propagates the
/// first trial failure; no partial pool is returned.
pub fn run_trials(
    n_trials: usize,
    config: &EnsembleConfig,
    seed: u64,
    observer: &dyn TrialObserver,
) -> Result<EigenvaluePool, WishartError> {
    require_positive("n_trials", n_trials)?;
    info!(
        n_trials,
        t = config.t(),
        nx = config.nx(),
        ny = config.ny(),
        "Starting simulation: {n_trials} trials"
    );

    let spectra: Vec<TrialSpectrum> = (0..n_trials)
        .into_par_iter()
        .map(|i| {
            if i % PROGRESS_INTERVAL == 0 {
                observer.on_progress(i, n_trials);
            }
            let spectrum = generate_trial_spectrum(config, &mut trial_rng(seed, i))?;
            debug!(trial = i, max_imag = spectrum.max_imag, "trial complete");
            if spectrum.flagged {
                warn!(
                    trial = i,
                    max_imag = spectrum.max_imag,
                    "eigenvalue imaginary parts exceed round-off allowance"
                );
            }
            Ok(spectrum)
        })
        .collect::<Result<_, WishartError>>()?;

    Ok(EigenvaluePool::from_spectra(spectra, config.t()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tolerances::GRAM_SYMMETRY_TOLERANCE;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cfg(t: usize, nx: usize, ny: usize) -> EnsembleConfig {
        EnsembleConfig::new(t, nx, ny).unwrap()
    }

    #[test]
    fn gaussian_matrix_shape_and_moments() {
        let mut rng = trial_rng(1, 0);
        let m = gaussian_matrix(&mut rng, 100, 100);
        assert_eq!(m.shape(), (100, 100));
        let n = m.len() as f64;
        let mean = m.sum() / n;
        let var = m.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 0.05, "mean={mean}");
        assert!((var - 1.0).abs() < 0.05, "var={var}");
    }

    #[test]
    fn gram_matrix_is_symmetric_psd_diagonal() {
        let mut rng = trial_rng(3, 0);
        let x = gaussian_matrix(&mut rng, 30, 17);
        let a = gram_matrix(&x);
        assert_eq!(a.shape(), (30, 30));
        assert!(max_asymmetry(&a) < GRAM_SYMMETRY_TOLERANCE);
        assert!(a.diagonal().iter().all(|&d| d >= 0.0));
    }

    #[test]
    fn product_matrix_rescales_by_t_squared() {
        let a = DMatrix::<f64>::identity(4, 4) * 2.0;
        let a1 = DMatrix::<f64>::identity(4, 4) * 8.0;
        let b = product_matrix(&a, &a1).unwrap();
        assert!((b[(0, 0)] - 1.0).abs() < 1e-15);
        assert!(b[(0, 1)].abs() < 1e-15);
    }

    #[test]
    fn product_matrix_rejects_mismatched_shapes() {
        let a = DMatrix::<f64>::identity(3, 3);
        let a1 = DMatrix::<f64>::identity(4, 4);
        assert!(matches!(
            product_matrix(&a, &a1),
            Err(WishartError::InvalidInput(_))
        ));
    }

    #[test]
    fn schur_spectrum_of_diagonal_matrix() {
        let m = DMatrix::from_diagonal(&nalgebra::DVector::from_vec(vec![3.0, 1.0, 2.0]));
        let mut eigs: Vec<f64> = real_schur_spectrum(m).unwrap().iter().map(|l| l.re).collect();
        eigs.sort_by(f64::total_cmp);
        assert!((eigs[0] - 1.0).abs() < 1e-12);
        assert!((eigs[2] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn schur_spectrum_of_rotation_is_complex() {
        let m = DMatrix::from_row_slice(2, 2, &[0.0, -1.0, 1.0, 0.0]);
        let eigs = real_schur_spectrum(m).unwrap();
        assert!(eigs.iter().all(|l| (l.im.abs() - 1.0).abs() < 1e-12));
    }

    #[test]
    fn rotation_spectrum_is_flagged() {
        let m = DMatrix::from_row_slice(2, 2, &[0.0, -1.0, 1.0, 0.0]);
        let (max_imag, flagged) = imag_diagnostics(&real_schur_spectrum(m).unwrap());
        assert!((max_imag - 1.0).abs() < 1e-12);
        assert!(flagged);
    }

    #[test]
    fn round_off_imaginary_part_is_not_flagged() {
        let eigs = [
            Complex64::new(4.0, 1e-12),
            Complex64::new(1.0, 0.0),
        ];
        let (max_imag, flagged) = imag_diagnostics(&eigs);
        assert!((max_imag - 1e-12).abs() < 1e-24);
        assert!(!flagged);
        assert_eq!(imag_diagnostics(&[]), (0.0, false));
    }

    #[test]
    fn imag_allowance_scales_with_spectrum() {
        // 1e-4 is round-off next to |λ| = 1e3 but not next to |λ| <= 1
        let big = [Complex64::new(1e3, 1e-4)];
        let small = [Complex64::new(0.5, 1e-4)];
        assert!(!imag_diagnostics(&big).1);
        assert!(imag_diagnostics(&small).1);
    }

    #[test]
    fn pool_counts_flagged_trials() {
        let spectrum = |eigenvalues: Vec<f64>, max_imag: f64, flagged: bool| TrialSpectrum {
            eigenvalues,
            max_imag,
            flagged,
        };
        let pool = EigenvaluePool::from_spectra(
            vec![
                spectrum(vec![1.0, 2.0], 1e-15, false),
                spectrum(vec![0.0, 0.0], 1.0, true),
                spectrum(vec![3.0, 4.0], 0.3, true),
            ],
            2,
        );
        assert_eq!(pool.n_trials, 3);
        assert_eq!(pool.flagged_trials, 2);
        assert!((pool.max_imag - 1.0).abs() < 1e-15);
        assert_eq!(pool.values, vec![1.0, 2.0, 0.0, 0.0, 3.0, 4.0]);
    }

    #[test]
    fn trial_has_t_real_positive_eigenvalues() {
        let c = cfg(20, 40, 40);
        let s = generate_trial_spectrum(&c, &mut trial_rng(5, 0)).unwrap();
        assert_eq!(s.eigenvalues.len(), 20);
        assert!(!s.flagged, "max_imag={}", s.max_imag);
        assert!(s.eigenvalues.iter().all(|&l| l > 0.0));
    }

    #[test]
    fn rank_deficient_trial_is_not_flagged() {
        // T > Nx: X·Xᵗ has rank Nx, so B has T − Nx (near-)zero eigenvalues.
        let c = cfg(30, 10, 40);
        let s = generate_trial_spectrum(&c, &mut trial_rng(9, 0)).unwrap();
        assert_eq!(s.eigenvalues.len(), 30);
        assert!(!s.flagged, "max_imag={}", s.max_imag);
    }

    #[test]
    fn single_element_ensemble() {
        let c = cfg(1, 1, 1);
        let eigs = generate_trial(&c, &mut trial_rng(11, 0)).unwrap();
        assert_eq!(eigs.len(), 1);
        assert!(eigs[0] >= 0.0);
    }

    #[test]
    fn same_stream_state_same_trial() {
        let c = cfg(12, 20, 25);
        let mut rng_a = trial_rng(21, 3);
        let mut rng_b = rng_a.clone();
        let a = generate_trial(&c, &mut rng_a).unwrap();
        let b = generate_trial(&c, &mut rng_b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn trial_streams_are_distinct() {
        let c = cfg(8, 16, 16);
        let a = generate_trial(&c, &mut trial_rng(21, 0)).unwrap();
        let b = generate_trial(&c, &mut trial_rng(21, 1)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn run_trials_concatenates_in_trial_order() {
        let c = cfg(10, 15, 20);
        let pool = run_trials(4, &c, 77, &SilentProgress).unwrap();
        assert_eq!(pool.len(), 40);
        assert_eq!(pool.n_trials, 4);
        assert_eq!(pool.trial_size, 10);

        let expected: Vec<f64> = (0..4)
            .flat_map(|i| generate_trial(&c, &mut trial_rng(77, i)).unwrap())
            .collect();
        assert_eq!(pool.values, expected);
    }

    #[test]
    fn run_trials_rejects_zero_trials() {
        let c = cfg(4, 4, 4);
        assert!(matches!(
            run_trials(0, &c, 1, &SilentProgress),
            Err(WishartError::Dimension {
                name: "n_trials",
                ..
            })
        ));
    }

    struct Counting(AtomicUsize);

    impl TrialObserver for Counting {
        fn on_progress(&self, index: usize, _total: usize) {
            assert_eq!(index % PROGRESS_INTERVAL, 0);
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn progress_every_hundredth_trial() {
        let c = cfg(1, 1, 1);
        let observer = Counting(AtomicUsize::new(0));
        run_trials(250, &c, 5, &observer).unwrap();
        // trials 0, 100, 200
        assert_eq!(observer.0.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn pool_max_matches_values() {
        let pool = EigenvaluePool {
            values: vec![0.5, 3.0, 1.5],
            n_trials: 1,
            trial_size: 3,
            max_imag: 0.0,
            flagged_trials: 0,
        };
        assert_eq!(pool.max(), Some(3.0));
        assert!(!pool.is_empty());
    }
}
