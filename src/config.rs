// SPDX-License-Identifier: AGPL-3.0-only

//! Run configuration: ensemble shape, trial count, seed, and output paths.
//!
//! Defaults reproduce the reference study (T=500, Nx=Ny=1000, 10 trials).
//! A JSON config file (`--config=path.json`) is applied first; the remaining
//! `--key=value` flags override it.
//!
//! ```bash
//! cargo run --release --bin wishart_product -- \
//!   --t=500 --nx=1000 --ny=1000 --trials=10 --seed=42 --output=simpurenoise0.txt
//! ```

use crate::error::{require_positive, WishartError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Shape of both random matrices in every trial: X is T×Nx, Y is T×Ny.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnsembleConfig {
    t: usize,
    nx: usize,
    ny: usize,
}

impl EnsembleConfig {
    /// Validated constructor.
    ///
    /// # Errors
    ///
    /// Returns [`WishartError::Dimension`] if any of `t`, `nx`, `ny` is zero.
    pub fn new(t: usize, nx: usize, ny: usize) -> Result<Self, WishartError> {
        Ok(Self {
            t: require_positive("T", t)?,
            nx: require_positive("Nx", nx)?,
            ny: require_positive("Ny", ny)?,
        })
    }

    /// Trial sample size T (rows of X and Y, dimension of B).
    #[must_use]
    pub const fn t(&self) -> usize {
        self.t
    }

    /// Feature dimension of X.
    #[must_use]
    pub const fn nx(&self) -> usize {
        self.nx
    }

    /// Feature dimension of Y.
    #[must_use]
    pub const fn ny(&self) -> usize {
        self.ny
    }

    /// Aspect ratio qx = T / Nx.
    #[must_use]
    pub fn qx(&self) -> f64 {
        self.t as f64 / self.nx as f64
    }

    /// Aspect ratio qy = T / Ny.
    #[must_use]
    pub fn qy(&self) -> f64 {
        self.t as f64 / self.ny as f64
    }
}

/// Complete configuration of one study run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Trial sample size T.
    pub t: usize,
    /// Feature dimension Nx.
    pub nx: usize,
    /// Feature dimension Ny.
    pub ny: usize,
    /// Number of independent trials.
    pub n_trials: usize,
    /// Base seed; trial `i` draws from stream `i` of this seed.
    pub seed: u64,
    /// Flat-text eigenvalue dump (one value per line, overwritten).
    pub eigenvalue_output: PathBuf,
    /// Optional two-column `x density` dump of the theory curve.
    pub density_output: Option<PathBuf>,
    /// Optional JSON run summary.
    pub summary_output: Option<PathBuf>,
    /// Optional SVG chart; `None` skips rendering.
    pub plot_output: Option<PathBuf>,
    /// Worker threads for the trial fan-out; `None` uses rayon's default.
    pub threads: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            t: 500,
            nx: 1000,
            ny: 1000,
            n_trials: 10,
            seed: 42,
            eigenvalue_output: PathBuf::from("simpurenoise0.txt"),
            density_output: None,
            summary_output: Some(PathBuf::from("wishart_summary.json")),
            plot_output: Some(PathBuf::from("wishart_density.svg")),
            threads: None,
        }
    }
}

impl RunConfig {
    /// Validated ensemble shape.
    ///
    /// # Errors
    ///
    /// Returns [`WishartError::Dimension`] if T, Nx, or Ny is zero.
    pub fn ensemble(&self) -> Result<EnsembleConfig, WishartError> {
        EnsembleConfig::new(self.t, self.nx, self.ny)
    }

    /// Check every numeric field before any work starts.
    ///
    /// # Errors
    ///
    /// Returns [`WishartError::Dimension`] for a zero dimension, trial count,
    /// or thread count.
    pub fn validate(&self) -> Result<(), WishartError> {
        self.ensemble()?;
        require_positive("n_trials", self.n_trials)?;
        if let Some(threads) = self.threads {
            require_positive("threads", threads)?;
        }
        Ok(())
    }

    /// Load a JSON config file; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`WishartError::Io`] if the file cannot be opened and
    /// [`WishartError::Json`] for malformed content or unknown fields.
    pub fn from_json_file(path: &Path) -> Result<Self, WishartError> {
        let reader = std::io::BufReader::new(std::fs::File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Build a config from CLI arguments (program name already stripped).
    ///
    /// # Errors
    ///
    /// Returns [`WishartError::Config`] for unknown flags or unparseable
    /// values, plus any error from loading `--config=`.
    pub fn from_args<I>(args: I) -> Result<Self, WishartError>
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();

        let mut cfg = match args.iter().find_map(|a| a.strip_prefix("--config=")) {
            Some(path) => Self::from_json_file(Path::new(path))?,
            None => Self::default(),
        };

        for arg in &args {
            if arg.starts_with("--config=") {
                continue;
            } else if let Some(val) = arg.strip_prefix("--t=") {
                cfg.t = parse_flag("--t", val)?;
            } else if let Some(val) = arg.strip_prefix("--nx=") {
                cfg.nx = parse_flag("--nx", val)?;
            } else if let Some(val) = arg.strip_prefix("--ny=") {
                cfg.ny = parse_flag("--ny", val)?;
            } else if let Some(val) = arg.strip_prefix("--trials=") {
                cfg.n_trials = parse_flag("--trials", val)?;
            } else if let Some(val) = arg.strip_prefix("--seed=") {
                cfg.seed = parse_flag("--seed", val)?;
            } else if let Some(val) = arg.strip_prefix("--threads=") {
                cfg.threads = Some(parse_flag("--threads", val)?);
            } else if let Some(val) = arg.strip_prefix("--output=") {
                cfg.eigenvalue_output = PathBuf::from(val);
            } else if let Some(val) = arg.strip_prefix("--density-output=") {
                cfg.density_output = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--summary=") {
                cfg.summary_output = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--plot=") {
                cfg.plot_output = Some(PathBuf::from(val));
            } else if arg == "--no-plot" {
                cfg.plot_output = None;
            } else if arg == "--no-summary" {
                cfg.summary_output = None;
            } else {
                return Err(WishartError::Config(format!("unknown argument: {arg}")));
            }
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_flag<T: std::str::FromStr>(flag: &str, val: &str) -> Result<T, WishartError> {
    val.parse()
        .map_err(|_| WishartError::Config(format!("{flag}: cannot parse {val:?}")))
}
