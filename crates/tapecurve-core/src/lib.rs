//! # tapecurve-core
//!
//! **How many steps does your Turing machine take as its input grows?**
//!
//! `tapecurve-core` drives an external simulator (`runtm`) over a folder of
//! numbered tapes, keeps the metric line from each run's output, and fits a
//! least-squares polynomial trend of step count against input size.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tapecurve_core::{ExperimentConfig, TapeRunner, fit_samples, parse_samples};
//!
//! let config = ExperimentConfig {
//!     machine: "binadd.tm".to_string(),
//!     folder: "machines".into(),
//!     ..Default::default()
//! };
//!
//! let log = TapeRunner::from_config(&config).run_all(config.runs)?;
//! let lines = config.sampling.sample(&log.output());
//! let samples = parse_samples(&lines)?;
//! let report = fit_samples(&samples, config.degree, config.precision)?;
//! println!("{}", report.equation);
//! # Ok::<(), tapecurve_core::TapeCurveError>(())
//! ```
//!
//! ## Architecture
//!
//! Runner → Run log (in memory) → Sampler → Results file → Fitter → Chart
//!
//! The accumulated simulator output never touches disk before sampling: the
//! results file is written exactly once, with the sampled lines only.

pub mod config;
pub mod error;
pub mod fit;
pub mod plot;
pub mod runner;
pub mod sampler;
pub mod summary;

pub use config::{ChartConfig, ExperimentConfig, ExperimentSettings};
pub use error::{EXIT_FAILURE, EXIT_IO, InvocationFailure, TapeCurveError};
pub use fit::{FitError, FitReport, Polynomial, fit_samples, polyfit, sample_points};
pub use plot::render_chart;
pub use runner::{Invocation, RunLog, TapeRunner};
pub use sampler::{SamplingRule, load_samples, parse_samples, write_results};
pub use summary::{InvocationRecord, RunSummary};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
