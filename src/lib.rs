// SPDX-License-Identifier: AGPL-3.0-only

//! Wishart product ensemble: Monte Carlo spectrum vs. Stieltjes theory
//!
//! Samples B = (X·Xᵗ)(Y·Yᵗ)/T² for independent standard-normal X (T×Nx) and
//! Y (T×Ny), pools the eigenvalues over many trials, and compares their
//! histogram with the limiting density recovered from the cubic equation of
//! the Green's function.
//!
//! ## Modules
//!   - `spectral` — sampler, cubic root solver, density curve, statistics
//!   - `config` — ensemble shape and run settings (CLI flags, JSON file)
//!   - `io` — eigenvalue/density dumps and JSON run summary
//!   - `plot` — SVG chart of histogram and theory curve
//!   - `pipeline` — end-to-end study run
//!   - `validation` — pass/fail harness for `validate_wishart`
//!   - `tolerances` — every numerical threshold, with its justification
//!   - `error` — crate error type
//!
//! ## Binaries
//!   - `wishart_product` — run a study and write its artifacts
//!   - `validate_wishart` — small-ensemble checks against exact moments

pub mod config;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod plot;
pub mod spectral;
pub mod tolerances;
pub mod validation;
