use tapecurve_core::{ExperimentConfig, FitReport, TapeCurveError, fit_samples, render_chart};

/// Fit the samples and draw the chart. Nothing is written if the fit fails.
pub fn run(config: &ExperimentConfig, samples: &[i64]) -> Result<FitReport, TapeCurveError> {
    let report = fit_samples(samples, config.degree, config.precision)?;
    render_chart(samples, &report, &config.chart)?;

    match report.r_squared {
        Some(r2) => println!("Fit: {} (R² = {r2:.5})", report.equation),
        None => println!("Fit: {}", report.equation),
    }
    println!("Chart saved to: {}", config.chart.path.display());
    Ok(report)
}
