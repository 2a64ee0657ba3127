use std::fs::File;

use tapecurve_core::{ExperimentConfig, RunLog, TapeCurveError, TapeRunner, write_results};

/// Raw runs plus the lines the sampling rule kept.
pub struct Collected {
    pub log: RunLog,
    pub lines: Vec<String>,
}

/// Run every tape, sample the combined output and rewrite the results file.
pub fn run(config: &ExperimentConfig) -> Result<Collected, TapeCurveError> {
    // Truncate up front: an unwritable results path fails before any run.
    File::create(&config.results_path)
        .map_err(|e| TapeCurveError::io(&config.results_path, e))?;

    let runner = TapeRunner::from_config(config);
    log::info!(
        "running {} on {} tape(s) from {}",
        runner.program().display(),
        config.runs,
        config.folder.display()
    );
    let run_log = runner.run_all(config.runs)?;
    let output = run_log.output();

    if let Some(raw) = &config.raw_output {
        std::fs::write(raw, &output).map_err(|e| TapeCurveError::io(raw, e))?;
        log::info!("raw output saved to {}", raw.display());
    }

    let lines = config.sampling.sample(&output);
    write_results(&config.results_path, &lines)?;
    println!("Cleaned results");

    if run_log.failures() > 0 {
        eprintln!(
            "Warning: {} of {} run(s) exited unsuccessfully; their output was kept",
            run_log.failures(),
            run_log.len()
        );
    }
    log::info!(
        "kept {} of {} line(s) (stride {}, offset {})",
        lines.len(),
        output.lines().count(),
        config.sampling.stride,
        config.sampling.offset
    );

    Ok(Collected {
        log: run_log,
        lines,
    })
}
