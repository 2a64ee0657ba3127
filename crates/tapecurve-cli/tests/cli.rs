//! End-to-end tests of the `tapecurve` binary: exit codes, messages and the
//! files it leaves behind.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Prints five lines per tape; the fourth is the square of the tape's number.
const SQUARES_RUNTM: &str = r#"#!/bin/sh
n=$(cat "$2")
echo "machine $1"
echo "tape $2"
echo "accepted"
echo $((n * n))
echo "halted"
"#;

fn write_runner(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("runtm");
    std::fs::write(&path, body).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn write_tapes(dir: &Path, runs: u32) {
    std::fs::write(dir.join("binadd.tm"), "states").unwrap();
    for i in 1..=runs {
        std::fs::write(dir.join(format!("{i}.tape")), format!("{i}\n")).unwrap();
    }
}

fn tapecurve(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tapecurve"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute tapecurve")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// Usage
// ---------------------------------------------------------------------------

#[test]
fn missing_arguments_exit_one() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tapecurve(tmp.path(), &["binadd.tm", "."]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Usage"), "got: {}", stderr(&output));
}

#[test]
fn help_exits_zero() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tapecurve(tmp.path(), &["--help"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("--plot-only"));
}

#[test]
fn invalid_sampling_exits_one() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tapecurve(
        tmp.path(),
        &["binadd.tm", ".", "results.txt", "--stride", "3", "--offset", "3"],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("Error: invalid configuration"));
}

// ---------------------------------------------------------------------------
// Collection failures
// ---------------------------------------------------------------------------

#[test]
fn unwritable_results_path_exits_three_before_running() {
    let tmp = tempfile::tempdir().unwrap();
    let marker = tmp.path().join("ran");
    let runner = write_runner(
        tmp.path(),
        &format!("#!/bin/sh\ntouch {}\n", marker.display()),
    );
    write_tapes(tmp.path(), 2);

    let output = tapecurve(
        tmp.path(),
        &[
            "binadd.tm",
            ".",
            "no-such-dir/results.txt",
            "--runs",
            "2",
            "--runner",
            runner.to_str().unwrap(),
        ],
    );
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("no-such-dir/results.txt"));
    assert!(!marker.exists());
}

#[test]
fn missing_runner_exits_one() {
    let tmp = tempfile::tempdir().unwrap();
    write_tapes(tmp.path(), 1);
    let output = tapecurve(
        tmp.path(),
        &[
            "binadd.tm",
            ".",
            "results.txt",
            "--runs",
            "1",
            "--runner",
            "./no-such-runtm",
        ],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("failed on tape 1"));
}

#[test]
fn non_numeric_sample_exits_one_without_chart() {
    let tmp = tempfile::tempdir().unwrap();
    let runner = write_runner(
        tmp.path(),
        "#!/bin/sh\nprintf 'a\\nb\\nc\\nnot a number\\ne\\n'\n",
    );
    write_tapes(tmp.path(), 3);

    let output = tapecurve(
        tmp.path(),
        &[
            "binadd.tm",
            ".",
            "results.txt",
            "--runs",
            "3",
            "--runner",
            runner.to_str().unwrap(),
        ],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("\"not a number\" is not an integer"));
    // The results file is still written with what was sampled.
    let results = std::fs::read_to_string(tmp.path().join("results.txt")).unwrap();
    assert_eq!(results, "not a number\nnot a number\nnot a number\n");
    assert!(!tmp.path().join("BinAddComplexity50.png").exists());
}

#[test]
fn short_output_leaves_empty_results_and_exits_one() {
    let tmp = tempfile::tempdir().unwrap();
    let runner = write_runner(tmp.path(), "#!/bin/sh\necho only\n");
    write_tapes(tmp.path(), 3);
    std::fs::write(tmp.path().join("results.txt"), "stale\n").unwrap();

    let output = tapecurve(
        tmp.path(),
        &[
            "binadd.tm",
            ".",
            "results.txt",
            "--runs",
            "3",
            "--runner",
            runner.to_str().unwrap(),
        ],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("fit failed"));
    let results = std::fs::read_to_string(tmp.path().join("results.txt")).unwrap();
    assert!(results.is_empty());
}

// ---------------------------------------------------------------------------
// Plot-only
// ---------------------------------------------------------------------------

#[test]
fn plot_only_missing_results_exits_three() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tapecurve(
        tmp.path(),
        &["binadd.tm", ".", "missing.txt", "--plot-only"],
    );
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("missing.txt"));
}

#[test]
fn plot_only_non_numeric_results_exits_one() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("results.txt"), "12\nabc\n").unwrap();
    let output = tapecurve(
        tmp.path(),
        &["binadd.tm", ".", "results.txt", "--plot-only"],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("line 2"));
    assert!(!tmp.path().join("BinAddComplexity50.png").exists());
}

#[test]
fn plot_only_unwritable_chart_exits_three() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("results.txt"), "1\n4\n9\n").unwrap();
    let output = tapecurve(
        tmp.path(),
        &[
            "binadd.tm",
            ".",
            "results.txt",
            "--plot-only",
            "--chart",
            "no-such-dir/chart.png",
        ],
    );
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("no-such-dir/chart.png"));
}

#[test]
#[ignore] // Needs system fonts. Run with: cargo test -- --ignored
fn plot_only_single_sample_succeeds() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("results.txt"), "5\n").unwrap();
    let output = tapecurve(
        tmp.path(),
        &["binadd.tm", ".", "results.txt", "--plot-only"],
    );
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("1.66667x²"));
    assert!(tmp.path().join("BinAddComplexity50.png").exists());
}

// ---------------------------------------------------------------------------
// Full run
// ---------------------------------------------------------------------------

#[test]
#[ignore] // Needs system fonts. Run with: cargo test -- --ignored
fn full_run_writes_results_chart_and_summary() {
    let tmp = tempfile::tempdir().unwrap();
    let runner = write_runner(tmp.path(), SQUARES_RUNTM);
    write_tapes(tmp.path(), 10);
    let args = [
        "binadd.tm",
        ".",
        "results.txt",
        "--runs",
        "10",
        "--runner",
        runner.to_str().unwrap(),
        "--output",
        "summary.json",
    ];

    for _ in 0..2 {
        let output = tapecurve(tmp.path(), &args);
        assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Cleaned results"));
        assert!(stdout.contains("1.0x² + 0.0x + 0.0"));
    }

    let results = std::fs::read_to_string(tmp.path().join("results.txt")).unwrap();
    let expected: String = (1..=10).map(|n| format!("{}\n", n * n)).collect();
    assert_eq!(results, expected);
    assert!(tmp.path().join("BinAddComplexity50.png").exists());

    let summary: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(tmp.path().join("summary.json")).unwrap())
            .unwrap();
    assert_eq!(summary["samples"].as_array().unwrap().len(), 10);
}
