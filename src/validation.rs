// SPDX-License-Identifier: AGPL-3.0-only

//! Pass/fail harness for the validation binary.
//!
//! Each check records the observed value, the reference it was compared
//! with, and the tolerance. `finish` prints the table and exits 0 when every
//! check passed, 1 otherwise.

use std::fmt::Write as _;
use std::process;

/// How a check compared its observed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToleranceMode {
    /// |observed − expected| < tolerance
    Absolute,
    /// |observed − expected| / |expected| < tolerance
    Relative,
    /// observed < threshold
    UpperBound,
    /// observed > threshold
    LowerBound,
    /// boolean condition
    Flag,
}

impl std::fmt::Display for ToleranceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Absolute => "abs",
            Self::Relative => "rel",
            Self::UpperBound => "<",
            Self::LowerBound => ">",
            Self::Flag => "flag",
        })
    }
}

/// One recorded comparison.
#[derive(Debug, Clone)]
pub struct Check {
    /// Human-readable label
    pub label: String,
    /// Whether the comparison held
    pub passed: bool,
    /// Observed value
    pub observed: f64,
    /// Reference value or threshold
    pub expected: f64,
    /// Tolerance (0 for bounds and flags)
    pub tolerance: f64,
    /// Comparison kind
    pub mode: ToleranceMode,
}

/// Accumulates checks for one validation run.
#[derive(Debug, Default)]
#[must_use]
pub struct ValidationHarness {
    /// Name printed in the summary banner
    pub name: String,
    /// Checks in the order they were made
    pub checks: Vec<Check>,
}

impl ValidationHarness {
    /// Empty harness for the named run.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            checks: Vec::new(),
        }
    }

    fn push(
        &mut self,
        label: &str,
        passed: bool,
        observed: f64,
        expected: f64,
        tolerance: f64,
        mode: ToleranceMode,
    ) {
        self.checks.push(Check {
            label: label.to_string(),
            passed,
            observed,
            expected,
            tolerance,
            mode,
        });
    }

    /// |observed − expected| < tolerance
    pub fn check_abs(&mut self, label: &str, observed: f64, expected: f64, tolerance: f64) {
        let passed = (observed - expected).abs() < tolerance;
        self.push(label, passed, observed, expected, tolerance, ToleranceMode::Absolute);
    }

    /// |observed − expected| / |expected| < tolerance; falls back to
    /// |observed| < tolerance when `expected` is zero.
    pub fn check_rel(&mut self, label: &str, observed: f64, expected: f64, tolerance: f64) {
        let passed = if expected.abs() > f64::EPSILON {
            ((observed - expected) / expected).abs() < tolerance
        } else {
            observed.abs() < tolerance
        };
        self.push(label, passed, observed, expected, tolerance, ToleranceMode::Relative);
    }

    /// observed < threshold
    pub fn check_upper(&mut self, label: &str, observed: f64, threshold: f64) {
        self.push(
            label,
            observed < threshold,
            observed,
            threshold,
            0.0,
            ToleranceMode::UpperBound,
        );
    }

    /// observed > threshold
    pub fn check_lower(&mut self, label: &str, observed: f64, threshold: f64) {
        self.push(
            label,
            observed > threshold,
            observed,
            threshold,
            0.0,
            ToleranceMode::LowerBound,
        );
    }

    /// Boolean condition.
    pub fn check_bool(&mut self, label: &str, passed: bool) {
        self.push(
            label,
            passed,
            f64::from(u8::from(passed)),
            1.0,
            0.0,
            ToleranceMode::Flag,
        );
    }

    /// Checks that passed.
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    /// Checks recorded.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.checks.len()
    }

    /// Whether every check passed (vacuously true when empty).
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Banner, one line per check, and the verdict.
    #[must_use]
    pub fn format_summary(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(
            s,
            "═══ {} validation: {}/{} checks passed ═══",
            self.name,
            self.passed_count(),
            self.total_count()
        );
        for check in &self.checks {
            let icon = if check.passed { "✓" } else { "✗" };
            let _ = writeln!(
                s,
                "  {icon} {}: observed={:.6e}, expected={:.6e}, tol={:.2e} ({})",
                check.label, check.observed, check.expected, check.tolerance, check.mode
            );
        }
        if self.all_passed() {
            let _ = writeln!(s, "ALL CHECKS PASSED");
        } else {
            let failed: Vec<&str> = self
                .checks
                .iter()
                .filter(|c| !c.passed)
                .map(|c| c.label.as_str())
                .collect();
            let _ = writeln!(s, "FAILED CHECKS: {}", failed.join(", "));
        }
        s
    }

    /// Print the summary and exit 0 (all passed) or 1.
    pub fn finish(&self) -> ! {
        println!();
        print!("{}", self.format_summary());
        process::exit(i32::from(!self.all_passed()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_pass_and_fail() {
        let mut h = ValidationHarness::new("wishart");
        h.check_abs("curve integral", 1.0009, 1.0, 0.02);
        h.check_abs("curve integral (bad)", 0.5, 1.0, 0.02);
        h.check_bool("pool length", true);
        assert_eq!(h.passed_count(), 2);
        assert_eq!(h.total_count(), 3);
        assert!(!h.all_passed());
    }

    #[test]
    fn relative_check() {
        let mut h = ValidationHarness::new("wishart");
        h.check_rel("simulated mean", 4.1, 4.0, 0.10);
        h.check_rel("simulated mean (far)", 5.0, 4.0, 0.10);
        h.check_rel("zero reference", 1e-12, 0.0, 1e-10);
        assert!(h.checks[0].passed);
        assert!(!h.checks[1].passed);
        assert!(h.checks[2].passed);
    }

    #[test]
    fn bounds_are_strict() {
        let mut h = ValidationHarness::new("wishart");
        h.check_upper("below", 0.5, 1.0);
        h.check_upper("at", 1.0, 1.0);
        h.check_lower("above", 0.0, -1e-12);
        h.check_lower("at", 0.0, 0.0);
        let passed: Vec<bool> = h.checks.iter().map(|c| c.passed).collect();
        assert_eq!(passed, vec![true, false, true, false]);
    }

    #[test]
    fn summary_lists_failures() {
        let mut h = ValidationHarness::new("wishart");
        h.check_abs("support edge", 17.6, 17.5, 0.5);
        h.check_bool("no flagged trials", false);
        let s = h.format_summary();
        assert!(s.contains("wishart validation: 1/2"));
        assert!(s.contains("FAILED CHECKS: no flagged trials"));
        assert!(!s.contains("ALL CHECKS PASSED"));
    }

    #[test]
    fn empty_harness_passes() {
        let h = ValidationHarness::new("empty");
        assert!(h.all_passed());
        assert!(h.format_summary().contains("ALL CHECKS PASSED"));
    }

    #[test]
    fn mode_display() {
        assert_eq!(ToleranceMode::Absolute.to_string(), "abs");
        assert_eq!(ToleranceMode::Relative.to_string(), "rel");
        assert_eq!(ToleranceMode::UpperBound.to_string(), "<");
        assert_eq!(ToleranceMode::LowerBound.to_string(), ">");
        assert_eq!(ToleranceMode::Flag.to_string(), "flag");
    }
}
