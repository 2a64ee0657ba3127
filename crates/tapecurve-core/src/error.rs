//! The closed set of failures an experiment run can end with.
//!
//! Every fallible operation in the crate returns [`TapeCurveError`]. The CLI
//! matches on it once, at its boundary, and turns it into a message and an
//! exit code via [`TapeCurveError::exit_code`].

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::fit::FitError;

/// Exit code for I/O failures (missing file, unwritable directory, ...).
pub const EXIT_IO: i32 = 3;

/// Exit code for every other failure.
pub const EXIT_FAILURE: i32 = 1;

/// Why a single simulator invocation failed.
#[derive(Debug, Error)]
pub enum InvocationFailure {
    /// The process could not be started at all.
    #[error("could not start process: {0}")]
    Spawn(#[source] io::Error),
    /// The process ran but reported failure. `None` means killed by a signal.
    #[error("exited with {}", describe_exit(.0))]
    ExitStatus(Option<i32>),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

#[derive(Debug, Error)]
pub enum TapeCurveError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: {content:?} is not an integer")]
    Parse { line: usize, content: String },

    #[error("{program} failed on tape {index}: {reason}")]
    Invocation {
        program: String,
        index: u32,
        #[source]
        reason: InvocationFailure,
    },

    #[error("fit failed: {0}")]
    Fit(#[from] FitError),

    #[error("could not render chart {}: {message}", .path.display())]
    Plot { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TapeCurveError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Process exit code for this failure: 3 for I/O, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io { .. } => EXIT_IO,
            Self::Parse { .. }
            | Self::Invocation { .. }
            | Self::Fit(_)
            | Self::Plot { .. }
            | Self::InvalidConfig(_) => EXIT_FAILURE,
        }
    }

    /// True for an I/O error whose cause is a missing file or directory.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}
