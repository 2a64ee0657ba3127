//! CLI for tapecurve: how many steps does your Turing machine take?

mod commands;

use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Parser)]
#[command(name = "tapecurve")]
#[command(about = "Run runtm over numbered tapes, sample its output and plot the step-count trend")]
#[command(version = tapecurve_core::VERSION)]
struct Cli {
    /// Machine description file, resolved under FOLDER
    machine: String,

    /// Directory holding the machine description and the numbered tapes
    folder: PathBuf,

    /// Results file: rewritten with the sampled lines, then fitted
    results: PathBuf,

    /// Tape type inserted into tape names: FOLDER/<i>.<TAPE_TYPE>tape
    #[arg(default_value = "")]
    tape_type: String,

    /// JSON settings file (runs, runner, sampling, degree, precision, chart, strict)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of tapes to run, starting at 1 [default: 50]
    #[arg(long)]
    runs: Option<u32>,

    /// Simulator executable [default: ./runtm]
    #[arg(long)]
    runner: Option<PathBuf>,

    /// Keep every STRIDE-th output line [default: 5]
    #[arg(long)]
    stride: Option<usize>,

    /// 1-based position modulo STRIDE of the kept line [default: 4]
    #[arg(long)]
    offset: Option<usize>,

    /// Degree of the fitted polynomial [default: 2]
    #[arg(long)]
    degree: Option<usize>,

    /// Decimal places kept in the fitted coefficients [default: 5]
    #[arg(long)]
    precision: Option<u32>,

    /// Chart output path [default: BinAddComplexity50.png]
    #[arg(long)]
    chart: Option<PathBuf>,

    /// Also draw the fitted curve on the chart
    #[arg(long)]
    show_fit: bool,

    /// Fail on the first tape the simulator exits unsuccessfully on
    #[arg(long)]
    strict: bool,

    /// Skip the runs; fit and plot the existing results file
    #[arg(long)]
    plot_only: bool,

    /// Also save the unfiltered simulator output here
    #[arg(long)]
    raw_output: Option<PathBuf>,

    /// Write a JSON run summary here
    #[arg(long)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Usage errors exit 1 like every other non-I/O failure.
            let code = if e.use_stderr() {
                tapecurve_core::EXIT_FAILURE
            } else {
                0
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    commands::init_logging(cli.verbose);

    let result = commands::run(commands::RunCommandConfig {
        machine: &cli.machine,
        folder: &cli.folder,
        results_path: &cli.results,
        tape_type: &cli.tape_type,
        settings_path: cli.config.as_deref(),
        runs: cli.runs,
        runner: cli.runner.as_deref(),
        stride: cli.stride,
        offset: cli.offset,
        degree: cli.degree,
        precision: cli.precision,
        chart_path: cli.chart.as_deref(),
        show_fit: cli.show_fit,
        strict: cli.strict,
        plot_only: cli.plot_only,
        raw_output: cli.raw_output.as_deref(),
        summary_path: cli.output.as_deref(),
    });

    if let Err(e) = result {
        std::process::exit(commands::report_failure(&e));
    }
}
