//! Experiment configuration.
//!
//! [`ExperimentConfig`] is the fully resolved set of knobs for one run.
//! [`ExperimentSettings`] is the subset that may come from a JSON settings
//! file; every field is optional there and falls back to the defaults below.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::TapeCurveError;
use crate::sampler::SamplingRule;

/// Number of tapes (`1.tape` ..= `50.tape`) run by default.
pub const DEFAULT_RUNS: u32 = 50;

/// Simulator invoked by default, resolved against the working directory.
pub const DEFAULT_RUNNER: &str = "./runtm";

/// Decimal places an `f64` coefficient can meaningfully keep.
pub const MAX_PRECISION: u32 = 15;

/// Chart written by default, in the working directory.
pub const DEFAULT_CHART_PATH: &str = "BinAddComplexity50.png";

/// `{index}.{tape_type}tape`, e.g. `7.tape` or `7.validtape`.
pub fn tape_file_name(index: u32, tape_type: &str) -> String {
    format!("{index}.{tape_type}tape")
}

// ---------------------------------------------------------------------------
// Chart config
// ---------------------------------------------------------------------------

/// Where and how the step-count chart is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub path: PathBuf,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub width: u32,
    pub height: u32,
    /// Also draw the fitted polynomial as a second series.
    pub show_fit: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CHART_PATH),
            title: "Steps taken to accept a valid tape".to_string(),
            x_label: "Number of bits in each binary string".to_string(),
            y_label: "Steps".to_string(),
            width: 640,
            height: 480,
            show_fit: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Settings file
// ---------------------------------------------------------------------------

/// Settings loadable from a JSON file.
///
/// ```json
/// { "runs": 20, "sampling": { "stride": 5, "offset": 4 }, "chart": { "show_fit": true } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentSettings {
    pub runs: u32,
    pub runner: PathBuf,
    pub sampling: SamplingRule,
    pub degree: usize,
    pub precision: u32,
    pub strict: bool,
    pub chart: ChartConfig,
}

impl Default for ExperimentSettings {
    fn default() -> Self {
        Self {
            runs: DEFAULT_RUNS,
            runner: PathBuf::from(DEFAULT_RUNNER),
            sampling: SamplingRule::default(),
            degree: 2,
            precision: 5,
            strict: false,
            chart: ChartConfig::default(),
        }
    }
}

impl ExperimentSettings {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, TapeCurveError> {
        let text = std::fs::read_to_string(path).map_err(|e| TapeCurveError::io(path, e))?;
        serde_json::from_str(&text).map_err(|e| {
            TapeCurveError::InvalidConfig(format!("{}: {e}", path.display()))
        })
    }
}

// ---------------------------------------------------------------------------
// Experiment config
// ---------------------------------------------------------------------------

/// Everything needed to run one experiment end to end.
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    /// Machine description file name, resolved under `folder`.
    pub machine: String,
    /// Directory holding the machine description and the numbered tapes.
    pub folder: PathBuf,
    /// Sampled results are written here.
    pub results_path: PathBuf,
    /// Inserted between the tape index and `tape`: `{i}.{tape_type}tape`.
    pub tape_type: String,
    pub runs: u32,
    pub runner: PathBuf,
    pub sampling: SamplingRule,
    pub degree: usize,
    pub precision: u32,
    /// Fail on the first nonzero simulator exit instead of warning.
    pub strict: bool,
    pub chart: ChartConfig,
    /// Optional copy of the unfiltered simulator output.
    pub raw_output: Option<PathBuf>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self::from_settings(ExperimentSettings::default())
    }
}

impl ExperimentConfig {
    /// Build a config from file settings; run-specific paths start empty.
    pub fn from_settings(settings: ExperimentSettings) -> Self {
        Self {
            machine: String::new(),
            folder: PathBuf::from("."),
            results_path: PathBuf::from("results.txt"),
            tape_type: String::new(),
            runs: settings.runs,
            runner: settings.runner,
            sampling: settings.sampling,
            degree: settings.degree,
            precision: settings.precision,
            strict: settings.strict,
            chart: settings.chart,
            raw_output: None,
        }
    }

    /// `{folder}/{machine}`
    pub fn machine_path(&self) -> PathBuf {
        self.folder.join(&self.machine)
    }

    /// `{folder}/{index}.{tape_type}tape`
    pub fn tape_path(&self, index: u32) -> PathBuf {
        self.folder.join(tape_file_name(index, &self.tape_type))
    }

    /// Reject settings that could never produce a fit.
    pub fn validate(&self) -> Result<(), TapeCurveError> {
        if self.runs == 0 {
            return Err(TapeCurveError::InvalidConfig(
                "runs must be at least 1".to_string(),
            ));
        }
        SamplingRule::new(self.sampling.stride, self.sampling.offset)?;
        if self.precision > MAX_PRECISION {
            return Err(TapeCurveError::InvalidConfig(format!(
                "precision {} exceeds {MAX_PRECISION} decimal places",
                self.precision
            )));
        }
        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(TapeCurveError::InvalidConfig(format!(
                "chart size {}x{} is empty",
                self.chart.width, self.chart.height
            )));
        }
        Ok(())
    }
}
