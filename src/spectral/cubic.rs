// SPDX-License-Identifier: AGPL-3.0-only

//! Roots of complex polynomials of degree ≤ 3.
//!
//! Cubics are solved in closed form (Cardano on the depressed cubic, taking
//! the larger-modulus branch of the square root to avoid cancellation) and
//! each root is then Newton-polished on the original polynomial. A root is
//! accepted only if its relative backward error
//! |p(g)| / Σ|a_k||g|^k is below [`ROOT_RESIDUAL_TOLERANCE`]; otherwise the
//! whole solve fails rather than returning a bad root.
//!
//! Leading coefficients that vanish relative to the rest are stripped first,
//! so a degenerate cubic falls back to the quadratic or linear formula.

use crate::error::WishartError;
use crate::tolerances::{
    DEGENERATE_LEADING_REL, NEWTON_MAX_ITER, NEWTON_STEP_TOLERANCE, ROOT_RESIDUAL_TOLERANCE,
};
use num_complex::Complex64;

/// Evaluate p(g) = Σ coeffs[k]·g^(n−k) (highest degree first) by Horner.
#[must_use]
pub fn eval_poly(coeffs: &[Complex64], g: Complex64) -> Complex64 {
    coeffs
        .iter()
        .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * g + c)
}

/// Evaluate p'(g) for coefficients ordered highest degree first.
#[must_use]
pub fn eval_poly_derivative(coeffs: &[Complex64], g: Complex64) -> Complex64 {
    let n = coeffs.len().saturating_sub(1);
    coeffs[..n]
        .iter()
        .enumerate()
        .fold(Complex64::new(0.0, 0.0), |acc, (k, &c)| {
            acc * g + c * (n - k) as f64
        })
}

/// Relative backward error |p(g)| / Σ|a_k||g|^k.
#[must_use]
pub fn backward_error(coeffs: &[Complex64], g: Complex64) -> f64 {
    let r = g.norm();
    let scale = coeffs.iter().fold(0.0, |acc, c| acc * r + c.norm());
    if scale == 0.0 {
        return 0.0;
    }
    eval_poly(coeffs, g).norm() / scale
}

/// All roots of a polynomial of degree ≤ 3, coefficients highest degree
/// first (`[a3, a2, a1, a0]` for a cubic).
///
/// Returns as many roots as the effective degree after stripping vanishing
/// leading coefficients.
///
/// # Errors
///
/// Returns [`WishartError::InvalidInput`] for more than four coefficients or
/// non-finite coefficients, and [`WishartError::Numerical`] when the
/// polynomial is constant (no roots) or a root fails the backward-error test.
pub fn polynomial_roots(coeffs: &[Complex64]) -> Result<Vec<Complex64>, WishartError> {
    if coeffs.len() > 4 {
        return Err(WishartError::InvalidInput(format!(
            "degree {} polynomial not supported (max 3)",
            coeffs.len().saturating_sub(1)
        )));
    }
    if coeffs.iter().any(|c| !c.re.is_finite() || !c.im.is_finite()) {
        return Err(WishartError::InvalidInput(
            "non-finite polynomial coefficient".to_string(),
        ));
    }

    let effective = strip_leading(coeffs);
    let roots = match effective.len() {
        0 | 1 => {
            return Err(WishartError::Numerical(
                "polynomial has no non-zero coefficient above degree 0".to_string(),
            ))
        }
        2 => vec![-effective[1] / effective[0]],
        3 => quadratic_roots(effective[0], effective[1], effective[2]).to_vec(),
        _ => cubic_roots(effective[0], effective[1], effective[2], effective[3]).to_vec(),
    };

    roots
        .into_iter()
        .map(|g| polish_root(effective, g))
        .collect()
}

/// Drop leading coefficients negligible against the largest one.
fn strip_leading(coeffs: &[Complex64]) -> &[Complex64] {
    let scale = coeffs.iter().map(|c| c.norm()).fold(0.0, f64::max);
    let threshold = DEGENERATE_LEADING_REL * scale;
    let first = coeffs
        .iter()
        .position(|c| c.norm() > threshold)
        .unwrap_or(coeffs.len());
    &coeffs[first..]
}

/// Roots of a·g² + b·g + c with a ≠ 0, avoiding cancellation.
fn quadratic_roots(a: Complex64, b: Complex64, c: Complex64) -> [Complex64; 2] {
    let disc = (b * b - a * c * 4.0).sqrt();
    // choose the sign that makes |b + s·disc| largest
    let s = if (b.conj() * disc).re >= 0.0 { 1.0 } else { -1.0 };
    let q = -(b + disc * s) * 0.5;
    if q.norm() == 0.0 {
        // b = 0 and c = 0: double root at zero
        return [q, q];
    }
    [q / a, c / q]
}

/// Principal complex cube root.
fn cbrt(w: Complex64) -> Complex64 {
    if w.norm() == 0.0 {
        return w;
    }
    Complex64::from_polar(w.norm().cbrt(), w.arg() / 3.0)
}

/// Roots of a·g³ + b·g² + c·g + d with a ≠ 0 (Cardano).
fn cubic_roots(a: Complex64, b: Complex64, c: Complex64, d: Complex64) -> [Complex64; 3] {
    let b = b / a;
    let c = c / a;
    let d = d / a;

    // depressed cubic t³ + p·t + q = 0 with g = t − b/3
    let p = c - b * b / 3.0;
    let q = b * b * b * (2.0 / 27.0) - b * c / 3.0 + d;
    let shift = -b / 3.0;

    let half_q = q * 0.5;
    let disc = (half_q * half_q + p * p * p / 27.0).sqrt();
    let w_plus = -half_q + disc;
    let w_minus = -half_q - disc;
    let w = if w_plus.norm() >= w_minus.norm() {
        w_plus
    } else {
        w_minus
    };
    let u = cbrt(w);

    let omega = Complex64::new(-0.5, 3.0f64.sqrt() / 2.0);
    let mut roots = [shift; 3];
    let mut uk = u;
    for root in &mut roots {
        // u·v = −p/3 pairs each cube root of w with its partner
        let t = if uk.norm() == 0.0 {
            Complex64::new(0.0, 0.0)
        } else {
            uk - p / (uk * 3.0)
        };
        *root = t + shift;
        uk *= omega;
    }
    roots
}

/// Newton-polish `g` on `coeffs` and enforce the backward-error bound.
fn polish_root(coeffs: &[Complex64], mut g: Complex64) -> Result<Complex64, WishartError> {
    for _ in 0..NEWTON_MAX_ITER {
        let dp = eval_poly_derivative(coeffs, g);
        if dp.norm() == 0.0 {
            break;
        }
        let step = eval_poly(coeffs, g) / dp;
        if !step.re.is_finite() || !step.im.is_finite() {
            break;
        }
        g -= step;
        if step.norm() <= NEWTON_STEP_TOLERANCE * g.norm().max(1.0) {
            break;
        }
    }

    let err = backward_error(coeffs, g);
    if !g.re.is_finite() || !g.im.is_finite() || err > ROOT_RESIDUAL_TOLERANCE {
        return Err(WishartError::Numerical(format!(
            "root finding did not converge: g={g}, backward error={err:.3e}"
        )));
    }
    Ok(g)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn contains(roots: &[Complex64], target: Complex64, tol: f64) -> bool {
        roots.iter().any(|r| (r - target).norm() < tol)
    }

    #[test]
    fn horner_evaluation() {
        // g³ − 6g² + 11g − 6 at g = 4 → 64 − 96 + 44 − 6 = 6
        let p = [c(1.0, 0.0), c(-6.0, 0.0), c(11.0, 0.0), c(-6.0, 0.0)];
        assert!((eval_poly(&p, c(4.0, 0.0)) - c(6.0, 0.0)).norm() < 1e-12);
        // p' = 3g² − 12g + 11 at 4 → 48 − 48 + 11
        assert!((eval_poly_derivative(&p, c(4.0, 0.0)) - c(11.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn cubic_with_three_real_roots() {
        let p = [c(1.0, 0.0), c(-6.0, 0.0), c(11.0, 0.0), c(-6.0, 0.0)];
        let roots = polynomial_roots(&p).unwrap();
        assert_eq!(roots.len(), 3);
        for r in [1.0, 2.0, 3.0] {
            assert!(contains(&roots, c(r, 0.0), 1e-10), "missing {r}: {roots:?}");
        }
    }

    #[test]
    fn cubic_with_complex_pair() {
        // (g − 2)(g² + 1) = g³ − 2g² + g − 2
        let p = [c(1.0, 0.0), c(-2.0, 0.0), c(1.0, 0.0), c(-2.0, 0.0)];
        let roots = polynomial_roots(&p).unwrap();
        assert!(contains(&roots, c(2.0, 0.0), 1e-10));
        assert!(contains(&roots, c(0.0, 1.0), 1e-10));
        assert!(contains(&roots, c(0.0, -1.0), 1e-10));
    }

    #[test]
    fn cubic_with_complex_coefficients() {
        // (g − i)(g + 1)(g − 2 − i)
        let r = [c(0.0, 1.0), c(-1.0, 0.0), c(2.0, 1.0)];
        let a2 = -(r[0] + r[1] + r[2]);
        let a1 = r[0] * r[1] + r[0] * r[2] + r[1] * r[2];
        let a0 = -(r[0] * r[1] * r[2]);
        let roots = polynomial_roots(&[c(1.0, 0.0), a2, a1, a0]).unwrap();
        for target in r {
            assert!(contains(&roots, target, 1e-10), "missing {target}: {roots:?}");
        }
    }

    #[test]
    fn triple_root_at_zero() {
        let p = [c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(0.0, 0.0)];
        let roots = polynomial_roots(&p).unwrap();
        assert!(roots.iter().all(|r| r.norm() < 1e-12));
    }

    #[test]
    fn scaled_cubic_same_roots() {
        let p = [c(1e-3, 0.0), c(-6e-3, 0.0), c(11e-3, 0.0), c(-6e-3, 0.0)];
        let roots = polynomial_roots(&p).unwrap();
        assert!(contains(&roots, c(2.0, 0.0), 1e-9));
    }

    #[test]
    fn degenerate_cubic_falls_back_to_quadratic() {
        // 0·g³ + g² − 3g + 2 = (g − 1)(g − 2)
        let p = [c(0.0, 0.0), c(1.0, 0.0), c(-3.0, 0.0), c(2.0, 0.0)];
        let roots = polynomial_roots(&p).unwrap();
        assert_eq!(roots.len(), 2);
        assert!(contains(&roots, c(1.0, 0.0), 1e-12));
        assert!(contains(&roots, c(2.0, 0.0), 1e-12));
    }

    #[test]
    fn degenerate_to_linear() {
        let p = [c(0.0, 0.0), c(0.0, 0.0), c(2.0, 0.0), c(-1.0, 0.0)];
        let roots = polynomial_roots(&p).unwrap();
        assert_eq!(roots.len(), 1);
        assert!((roots[0] - c(0.5, 0.0)).norm() < 1e-15);
    }

    #[test]
    fn quadratic_without_cancellation() {
        // g² − 1e8·g + 1: roots ≈ 1e8 and 1e-8
        let p = [c(1.0, 0.0), c(-1e8, 0.0), c(1.0, 0.0)];
        let roots = polynomial_roots(&p).unwrap();
        assert!(contains(&roots, c(1e-8, 0.0), 1e-20));
    }

    #[test]
    fn constant_polynomial_is_numerical_error() {
        let p = [c(0.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(5.0, 0.0)];
        assert!(matches!(
            polynomial_roots(&p),
            Err(WishartError::Numerical(_))
        ));
    }

    #[test]
    fn non_finite_coefficient_rejected() {
        let p = [c(f64::NAN, 0.0), c(1.0, 0.0)];
        assert!(matches!(
            polynomial_roots(&p),
            Err(WishartError::InvalidInput(_))
        ));
    }

    #[test]
    fn backward_error_of_exact_root_is_tiny() {
        let p = [c(1.0, 0.0), c(-3.0, 0.0), c(2.0, 0.0)];
        assert!(backward_error(&p, c(2.0, 0.0)) < 1e-16);
        assert!(backward_error(&p, c(5.0, 0.0)) > 0.1);
    }
}
