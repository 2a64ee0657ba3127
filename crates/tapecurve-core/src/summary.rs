//! Machine-readable record of one experiment run.

use std::path::Path;

use serde::Serialize;

use crate::config::ExperimentConfig;
use crate::error::TapeCurveError;
use crate::fit::FitReport;
use crate::runner::{Invocation, RunLog};
use crate::sampler::SamplingRule;

/// Per-tape entry in the summary. Captured output itself is not kept.
#[derive(Debug, Clone, Serialize)]
pub struct InvocationRecord {
    pub index: u32,
    pub tape: String,
    pub exit_code: Option<i32>,
    pub success: bool,
    pub stdout_lines: usize,
    pub elapsed_ms: u64,
}

impl From<&Invocation> for InvocationRecord {
    fn from(inv: &Invocation) -> Self {
        Self {
            index: inv.index,
            tape: inv.tape.display().to_string(),
            exit_code: inv.exit_code,
            success: inv.success,
            stdout_lines: inv.stdout.lines().count(),
            elapsed_ms: inv.elapsed.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub version: u32,
    pub tapecurve_version: String,
    pub machine: String,
    pub folder: String,
    pub tape_type: String,
    pub results_path: String,
    pub sampling: SamplingRule,
    /// Empty when the run was plot-only.
    pub invocations: Vec<InvocationRecord>,
    pub samples: Vec<i64>,
    pub fit: FitReport,
    pub chart: Option<String>,
}

impl RunSummary {
    pub fn new(
        config: &ExperimentConfig,
        log: Option<&RunLog>,
        samples: &[i64],
        fit: FitReport,
    ) -> Self {
        Self {
            version: 1,
            tapecurve_version: crate::VERSION.to_string(),
            machine: config.machine.clone(),
            folder: config.folder.display().to_string(),
            tape_type: config.tape_type.clone(),
            results_path: config.results_path.display().to_string(),
            sampling: config.sampling,
            invocations: log
                .map(|l| l.invocations().iter().map(InvocationRecord::from).collect())
                .unwrap_or_default(),
            samples: samples.to_vec(),
            fit,
            chart: None,
        }
    }

    /// Record the chart path once it has been written.
    pub fn with_chart(mut self, chart: &Path) -> Self {
        self.chart = Some(chart.display().to_string());
        self
    }

    /// Write the summary as pretty-printed JSON.
    pub fn write(&self, path: &Path) -> Result<(), TapeCurveError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| TapeCurveError::io(path, std::io::Error::other(e)))?;
        std::fs::write(path, json).map_err(|e| TapeCurveError::io(path, e))
    }
}
