//! Sequential invocation of the external simulator.
//!
//! Each tape is run as `<program> <folder>/<machine> <folder>/<i>.<type>tape`.
//! Runs are blocking and strictly ordered. Stdout is captured into the
//! [`RunLog`] in invocation order; stderr goes straight to the terminal.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::config::{ExperimentConfig, tape_file_name};
use crate::error::{InvocationFailure, TapeCurveError};

/// One completed simulator run.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub index: u32,
    pub tape: PathBuf,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub elapsed: Duration,
}

/// Every invocation of one experiment, in order.
#[derive(Debug, Clone, Default)]
pub struct RunLog {
    invocations: Vec<Invocation>,
}

impl RunLog {
    pub fn push(&mut self, invocation: Invocation) {
        self.invocations.push(invocation);
    }

    pub fn invocations(&self) -> &[Invocation] {
        &self.invocations
    }

    pub fn len(&self) -> usize {
        self.invocations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invocations.is_empty()
    }

    /// Number of runs that exited unsuccessfully.
    pub fn failures(&self) -> usize {
        self.invocations.iter().filter(|i| !i.success).count()
    }

    /// All captured stdout, concatenated exactly as a shell `>>` would.
    pub fn output(&self) -> String {
        self.invocations.iter().map(|i| i.stdout.as_str()).collect()
    }
}

/// Runs the simulator over numbered tapes.
#[derive(Debug, Clone)]
pub struct TapeRunner {
    program: PathBuf,
    machine: PathBuf,
    folder: PathBuf,
    tape_type: String,
    strict: bool,
}

impl TapeRunner {
    pub fn new(program: impl Into<PathBuf>, folder: impl Into<PathBuf>, machine: &str) -> Self {
        let folder = folder.into();
        Self {
            program: program.into(),
            machine: folder.join(machine),
            folder,
            tape_type: String::new(),
            strict: false,
        }
    }

    pub fn from_config(config: &ExperimentConfig) -> Self {
        Self::new(&config.runner, &config.folder, &config.machine)
            .with_tape_type(&config.tape_type)
            .strict(config.strict)
    }

    pub fn with_tape_type(mut self, tape_type: &str) -> Self {
        self.tape_type = tape_type.to_string();
        self
    }

    /// Treat a nonzero exit as an error instead of a warning.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn tape_path(&self, index: u32) -> PathBuf {
        self.folder.join(tape_file_name(index, &self.tape_type))
    }

    /// Run the simulator on tape `index` and wait for it to finish.
    pub fn invoke(&self, index: u32) -> Result<Invocation, TapeCurveError> {
        let tape = self.tape_path(index);
        let started = Instant::now();
        let output = Command::new(&self.program)
            .arg(&self.machine)
            .arg(&tape)
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| self.failure(index, InvocationFailure::Spawn(e)))?;
        let elapsed = started.elapsed();

        let invocation = Invocation {
            index,
            tape,
            exit_code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            elapsed,
        };

        if !invocation.success {
            if self.strict {
                return Err(self.failure(index, InvocationFailure::ExitStatus(invocation.exit_code)));
            }
            log::warn!(
                "{} exited with {:?} on {}; keeping its output",
                self.program.display(),
                invocation.exit_code,
                invocation.tape.display()
            );
        }
        Ok(invocation)
    }

    /// Run tapes `1..=runs` in order.
    pub fn run_all(&self, runs: u32) -> Result<RunLog, TapeCurveError> {
        let mut run_log = RunLog::default();
        for index in 1..=runs {
            let invocation = self.invoke(index)?;
            log::info!(
                "tape {index}/{runs}: {} line(s) in {:.2}s",
                invocation.stdout.lines().count(),
                invocation.elapsed.as_secs_f64()
            );
            run_log.push(invocation);
        }
        Ok(run_log)
    }

    fn failure(&self, index: u32, reason: InvocationFailure) -> TapeCurveError {
        TapeCurveError::Invocation {
            program: self.program.display().to_string(),
            index,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation(index: u32, stdout: &str, success: bool) -> Invocation {
        Invocation {
            index,
            tape: PathBuf::from(format!("{index}.tape")),
            exit_code: Some(if success { 0 } else { 1 }),
            success,
            stdout: stdout.to_string(),
            elapsed: Duration::ZERO,
        }
    }

    // -----------------------------------------------------------------------
    // RunLog
    // -----------------------------------------------------------------------

    #[test]
    fn test_run_log_concatenates_in_order() {
        let mut log = RunLog::default();
        assert!(log.is_empty());
        log.push(invocation(1, "a\nb\n", true));
        log.push(invocation(2, "c", false));
        log.push(invocation(3, "d\n", true));

        assert_eq!(log.len(), 3);
        assert_eq!(log.output(), "a\nb\ncd\n");
        assert_eq!(log.failures(), 1);
    }

    // -----------------------------------------------------------------------
    // TapeRunner paths
    // -----------------------------------------------------------------------

    #[test]
    fn test_runner_paths() {
        let runner = TapeRunner::new("./runtm", "binadd", "add.tm").with_tape_type("valid");
        assert_eq!(runner.program(), Path::new("./runtm"));
        assert_eq!(runner.machine, PathBuf::from("binadd/add.tm"));
        assert_eq!(runner.tape_path(3), PathBuf::from("binadd/3.validtape"));
    }

    #[test]
    fn test_from_config_matches_config_paths() {
        let cfg = ExperimentConfig {
            machine: "add.tm".to_string(),
            folder: PathBuf::from("binadd"),
            tape_type: "bad".to_string(),
            strict: true,
            ..Default::default()
        };
        let runner = TapeRunner::from_config(&cfg);
        assert_eq!(runner.machine, cfg.machine_path());
        assert_eq!(runner.tape_path(50), cfg.tape_path(50));
        assert!(runner.strict);
    }

    // -----------------------------------------------------------------------
    // Invocation errors
    // -----------------------------------------------------------------------

    #[test]
    fn test_missing_program_is_invocation_error() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = TapeRunner::new(tmp.path().join("no-such-runtm"), tmp.path(), "m.tm");
        match runner.invoke(1) {
            Err(TapeCurveError::Invocation {
                index,
                reason: InvocationFailure::Spawn(_),
                ..
            }) => assert_eq!(index, 1),
            other => panic!("expected spawn failure, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_kept_unless_strict() {
        // `false` ignores its arguments and exits 1.
        let runner = TapeRunner::new("false", ".", "m.tm");
        let inv = runner.invoke(4).unwrap();
        assert!(!inv.success);
        assert_eq!(inv.exit_code, Some(1));
        assert!(inv.stdout.is_empty());

        let err = runner.strict(true).invoke(4).unwrap_err();
        assert!(matches!(
            err,
            TapeCurveError::Invocation {
                reason: InvocationFailure::ExitStatus(Some(1)),
                ..
            }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_stdout_is_captured_with_arguments() {
        // `echo` prints the machine and tape paths it was given.
        let runner = TapeRunner::new("echo", "tapes", "add.tm").with_tape_type("x");
        let log = runner.run_all(2).unwrap();
        assert_eq!(
            log.output(),
            "tapes/add.tm tapes/1.xtape\ntapes/add.tm tapes/2.xtape\n"
        );
        assert_eq!(log.failures(), 0);
    }
}
