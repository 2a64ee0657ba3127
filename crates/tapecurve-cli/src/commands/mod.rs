pub mod collect;
pub mod plot;

use std::path::Path;

use tapecurve_core::{
    ExperimentConfig, ExperimentSettings, RunSummary, SamplingRule, TapeCurveError, load_samples,
    parse_samples,
};

/// Everything parsed from the command line, borrowed from `Cli`.
pub struct RunCommandConfig<'a> {
    pub machine: &'a str,
    pub folder: &'a Path,
    pub results_path: &'a Path,
    pub tape_type: &'a str,
    pub settings_path: Option<&'a Path>,
    pub runs: Option<u32>,
    pub runner: Option<&'a Path>,
    pub stride: Option<usize>,
    pub offset: Option<usize>,
    pub degree: Option<usize>,
    pub precision: Option<u32>,
    pub chart_path: Option<&'a Path>,
    pub show_fit: bool,
    pub strict: bool,
    pub plot_only: bool,
    pub raw_output: Option<&'a Path>,
    pub summary_path: Option<&'a Path>,
}

/// Route `log` records to stderr. `RUST_LOG` wins over `-v`.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Resolve defaults, the settings file and command-line overrides, in that order.
pub fn build_config(cfg: &RunCommandConfig<'_>) -> Result<ExperimentConfig, TapeCurveError> {
    let settings = match cfg.settings_path {
        Some(path) => ExperimentSettings::load(path)?,
        None => ExperimentSettings::default(),
    };
    let mut config = ExperimentConfig::from_settings(settings);

    config.machine = cfg.machine.to_string();
    config.folder = cfg.folder.to_path_buf();
    config.results_path = cfg.results_path.to_path_buf();
    config.tape_type = cfg.tape_type.to_string();
    config.raw_output = cfg.raw_output.map(Path::to_path_buf);

    if let Some(runs) = cfg.runs {
        config.runs = runs;
    }
    if let Some(runner) = cfg.runner {
        config.runner = runner.to_path_buf();
    }
    if cfg.stride.is_some() || cfg.offset.is_some() {
        config.sampling = SamplingRule::new(
            cfg.stride.unwrap_or(config.sampling.stride),
            cfg.offset.unwrap_or(config.sampling.offset),
        )?;
    }
    if let Some(degree) = cfg.degree {
        config.degree = degree;
    }
    if let Some(precision) = cfg.precision {
        config.precision = precision;
    }
    if let Some(chart) = cfg.chart_path {
        config.chart.path = chart.to_path_buf();
    }
    config.chart.show_fit |= cfg.show_fit;
    config.strict |= cfg.strict;

    config.validate()?;
    Ok(config)
}

/// Collect (unless plot-only), then fit and plot.
pub fn run(cfg: RunCommandConfig<'_>) -> Result<(), TapeCurveError> {
    let config = build_config(&cfg)?;
    log::debug!("resolved configuration: {config:?}");

    let (run_log, samples) = if cfg.plot_only {
        (None, load_samples(&config.results_path)?)
    } else {
        let collected = collect::run(&config)?;
        let samples = parse_samples(&collected.lines)?;
        (Some(collected.log), samples)
    };

    let report = plot::run(&config, &samples)?;

    if let Some(path) = cfg.summary_path {
        RunSummary::new(&config, run_log.as_ref(), &samples, report)
            .with_chart(&config.chart.path)
            .write(path)?;
        println!("Summary saved to: {}", path.display());
    }
    Ok(())
}

/// Print `err` and return the exit code it maps to.
pub fn report_failure(err: &TapeCurveError) -> i32 {
    match err {
        TapeCurveError::Io { .. } => eprintln!("{err}"),
        TapeCurveError::Plot { .. } => eprintln!("Error plotting graph: {err}"),
        TapeCurveError::Parse { .. }
        | TapeCurveError::Invocation { .. }
        | TapeCurveError::Fit(_)
        | TapeCurveError::InvalidConfig(_) => eprintln!("Error: {err}"),
    }
    log::debug!("{err:?}");
    err.exit_code()
}
