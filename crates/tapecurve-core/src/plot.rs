//! Step-count chart rendering.
//!
//! Draws the sampled step counts against their position as a line series,
//! labelled with the fitted equation, and writes a PNG through plotters'
//! bitmap backend. Font lookup happens inside plotters; a host without
//! usable fonts can make it panic, so the whole draw runs under
//! `catch_unwind` and any panic surfaces as [`TapeCurveError::Plot`]. A
//! target that cannot be created is [`TapeCurveError::Io`].

use std::any::Any;
use std::fs::File;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};

use plotters::prelude::*;

use crate::config::ChartConfig;
use crate::error::TapeCurveError;
use crate::fit::{FitReport, sample_points};

/// Points used to draw the fitted curve when `show_fit` is set.
const CURVE_STEPS: usize = 200;

/// Render `samples` and the fit legend to `chart.path`, overwriting it.
pub fn render_chart(
    samples: &[i64],
    fit: &FitReport,
    chart: &ChartConfig,
) -> Result<(), TapeCurveError> {
    let plot_error = |message: String| TapeCurveError::Plot {
        path: chart.path.clone(),
        message,
    };
    if samples.is_empty() {
        return Err(plot_error("no samples to plot".to_string()));
    }

    // An unwritable target is an I/O error, reported before any drawing.
    File::create(&chart.path).map_err(|e| TapeCurveError::io(&chart.path, e))?;

    let failure = match panic::catch_unwind(AssertUnwindSafe(|| draw(samples, fit, chart))) {
        Ok(Ok(())) => {
            log::info!("chart written to {}", chart.path.display());
            return Ok(());
        }
        Ok(Err(e)) => e.to_string(),
        Err(payload) => panic_message(payload.as_ref()),
    };
    if let Err(e) = std::fs::remove_file(&chart.path) {
        log::debug!("could not remove partial chart {}: {e}", chart.path.display());
    }
    Err(plot_error(failure))
}

fn draw(
    samples: &[i64],
    fit: &FitReport,
    chart: &ChartConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let (x, y) = sample_points(samples);
    let curve = if chart.show_fit {
        fit_curve(fit, x[0], x[x.len() - 1])
    } else {
        Vec::new()
    };
    let (x_range, y_range) = axis_ranges(&x, &y, &curve);

    let root = BitMapBackend::new(&chart.path, (chart.width, chart.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut ctx = ChartBuilder::on(&root)
        .caption(&chart.title, ("sans-serif", 20))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)?;

    ctx.configure_mesh()
        .x_desc(&chart.x_label)
        .y_desc(&chart.y_label)
        .draw()?;

    ctx.draw_series(LineSeries::new(
        x.iter().copied().zip(y.iter().copied()),
        &BLUE,
    ))?
    .label(fit.equation.clone())
    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

    if !curve.is_empty() {
        ctx.draw_series(LineSeries::new(curve, &RED))?
            .label("least-squares fit")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));
    }

    ctx.configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// The unrounded fit sampled evenly over `[from, to]`.
fn fit_curve(fit: &FitReport, from: f64, to: f64) -> Vec<(f64, f64)> {
    let step = (to - from) / CURVE_STEPS as f64;
    (0..=CURVE_STEPS)
        .map(|i| {
            let x = from + step * i as f64;
            (x, fit.polynomial.evaluate(x))
        })
        .collect()
}

/// Data bounds with a 5% margin on each side, never empty.
fn axis_ranges(x: &[f64], y: &[f64], curve: &[(f64, f64)]) -> (Range<f64>, Range<f64>) {
    let ys = y.iter().copied().chain(curve.iter().map(|&(_, v)| v));
    (padded(x.iter().copied()), padded(ys))
}

fn padded(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return 0.0..1.0;
    }
    if lo == hi {
        return (lo - 1.0)..(hi + 1.0);
    }
    let margin = (hi - lo) * 0.05;
    (lo - margin)..(hi + margin)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("renderer panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("renderer panicked: {s}")
    } else {
        "renderer panicked".to_string()
    }
}
