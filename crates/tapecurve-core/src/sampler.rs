//! Line sampling and the results file.
//!
//! The simulator prints several lines per run and only one line offset
//! carries the step count. [`SamplingRule`] picks that offset out of the
//! accumulated output; the kept lines are what gets written to the results
//! file and later parsed into the sample sequence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TapeCurveError;

/// Keep every line whose 1-based position `p` satisfies `p % stride == offset`.
///
/// The default (`stride = 5`, `offset = 4`) keeps lines 4, 9, 14, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingRule {
    pub stride: usize,
    pub offset: usize,
}

impl Default for SamplingRule {
    fn default() -> Self {
        Self {
            stride: 5,
            offset: 4,
        }
    }
}

impl SamplingRule {
    /// Checked constructor. `offset` must be below `stride` or nothing would match.
    pub fn new(stride: usize, offset: usize) -> Result<Self, TapeCurveError> {
        if stride == 0 {
            return Err(TapeCurveError::InvalidConfig(
                "sampling stride must be at least 1".to_string(),
            ));
        }
        if offset >= stride {
            return Err(TapeCurveError::InvalidConfig(format!(
                "sampling offset {offset} must be below stride {stride}"
            )));
        }
        Ok(Self { stride, offset })
    }

    /// Whether the line at 1-based `position` is kept.
    pub fn keeps(&self, position: usize) -> bool {
        self.stride != 0 && position % self.stride == self.offset
    }

    /// Kept lines of `text`, in original order, without line terminators.
    pub fn sample(&self, text: &str) -> Vec<String> {
        text.lines()
            .enumerate()
            .filter(|(i, _)| self.keeps(i + 1))
            .map(|(_, line)| line.to_string())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Results file
// ---------------------------------------------------------------------------

/// Write `lines` to `path`, one per line, replacing any previous contents.
pub fn write_results(path: &Path, lines: &[String]) -> Result<(), TapeCurveError> {
    let mut body = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        body.push_str(line);
        body.push('\n');
    }
    std::fs::write(path, body).map_err(|e| TapeCurveError::io(path, e))?;
    log::debug!("wrote {} sampled line(s) to {}", lines.len(), path.display());
    Ok(())
}

/// Parse each line as a base-10 integer, ignoring surrounding whitespace.
pub fn parse_samples<S: AsRef<str>>(lines: &[S]) -> Result<Vec<i64>, TapeCurveError> {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let line = line.as_ref();
            line.trim().parse::<i64>().map_err(|_| TapeCurveError::Parse {
                line: i + 1,
                content: line.to_string(),
            })
        })
        .collect()
}

/// Read an already-sampled results file and parse it.
pub fn load_samples(path: &Path) -> Result<Vec<i64>, TapeCurveError> {
    let text = std::fs::read_to_string(path).map_err(|e| TapeCurveError::io(path, e))?;
    let lines: Vec<&str> = text.lines().collect();
    parse_samples(&lines)
}
