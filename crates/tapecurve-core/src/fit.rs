//! Least-squares polynomial fitting.
//!
//! [`polyfit`] returns coefficients highest power first. It solves the
//! column-scaled Vandermonde system with nalgebra's SVD, which yields the
//! minimum-norm solution when there are fewer points than coefficients.

use std::fmt;

use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use thiserror::Error;

/// Singular values below `n * RCOND_FACTOR * max(σ)` are treated as zero.
const RCOND_FACTOR: f64 = f64::EPSILON;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FitError {
    #[error("no data points to fit")]
    Empty,
    #[error("x has {x} value(s) but y has {y}")]
    LengthMismatch { x: usize, y: usize },
    #[error("data contains a non-finite value")]
    NonFinite,
    #[error("least-squares solve failed: {0}")]
    Solver(&'static str),
}

// ---------------------------------------------------------------------------
// Polynomial
// ---------------------------------------------------------------------------

/// A polynomial with coefficients stored highest power first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

impl Polynomial {
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Horner evaluation.
    pub fn evaluate(&self, x: f64) -> f64 {
        self.coefficients.iter().fold(0.0, |acc, &c| acc * x + c)
    }

    /// Round every coefficient to `decimals` places, ties to even.
    pub fn rounded(&self, decimals: u32) -> Self {
        let factor = 10f64.powi(decimals as i32);
        Self {
            // `+ 0.0` turns a rounded -0.0 into 0.0.
            coefficients: self
                .coefficients
                .iter()
                .map(|&c| (c * factor).round_ties_even() / factor + 0.0)
                .collect(),
        }
    }

    /// Coefficients substituted into `a·x² + b·x + c` (or the analogue for
    /// other degrees), e.g. `1.0x² + -2.5x + 0.0`.
    pub fn equation(&self) -> String {
        let degree = self.degree();
        self.coefficients
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let power = degree - i;
                let coef = format_coefficient(c);
                match power {
                    0 => coef,
                    1 => format!("{coef}x"),
                    p => format!("{coef}x{}", superscript(p)),
                }
            })
            .collect::<Vec<_>>()
            .join(" + ")
    }

    /// Coefficient of determination against `(x, y)`.
    ///
    /// `None` when the lengths differ, the data is empty, or y is constant.
    pub fn r_squared(&self, x: &[f64], y: &[f64]) -> Option<f64> {
        if x.len() != y.len() || y.is_empty() {
            return None;
        }
        let mean = y.iter().sum::<f64>() / y.len() as f64;
        let ss_tot: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
        if ss_tot == 0.0 {
            return None;
        }
        let ss_res: f64 = x
            .iter()
            .zip(y)
            .map(|(&xi, &yi)| (yi - self.evaluate(xi)).powi(2))
            .sum();
        Some(1.0 - ss_res / ss_tot)
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.equation())
    }
}

/// Shortest round-trip form with a mandatory fraction or exponent:
/// `1.0`, `0.33333`, `1e-05`.
fn format_coefficient(value: f64) -> String {
    if value == 0.0 {
        return "0.0".to_string();
    }
    if !value.is_finite() {
        return format!("{value}");
    }
    let magnitude = value.abs();
    if !(1e-4..1e16).contains(&magnitude) {
        let formatted = format!("{value:e}");
        let (mantissa, exponent) = formatted.split_once('e').unwrap_or((&formatted, "0"));
        let (sign, digits) = match exponent.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exponent),
        };
        return format!("{mantissa}e{sign}{digits:0>2}");
    }
    let formatted = format!("{value}");
    if formatted.contains('.') {
        formatted
    } else {
        format!("{formatted}.0")
    }
}

fn superscript(power: usize) -> String {
    const DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];
    power
        .to_string()
        .chars()
        .filter_map(|d| d.to_digit(10).map(|d| DIGITS[d as usize]))
        .collect()
}

// ---------------------------------------------------------------------------
// Least squares
// ---------------------------------------------------------------------------

/// Fit a polynomial of `degree` to `(x, y)` by least squares.
///
/// Underdetermined or rank-deficient systems get the minimum-norm solution,
/// so a single point still yields a polynomial through it.
pub fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Result<Polynomial, FitError> {
    if x.len() != y.len() {
        return Err(FitError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    if x.is_empty() {
        return Err(FitError::Empty);
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite);
    }

    // Vandermonde matrix, highest power first.
    let n = x.len();
    let mut lhs = DMatrix::from_fn(n, degree + 1, |i, j| x[i].powi((degree - j) as i32));

    // Unit column norms; an all-zero column keeps scale 1 and solves to 0.
    let scale: Vec<f64> = lhs
        .column_iter()
        .map(|col| match col.norm() {
            norm if norm > 0.0 => norm,
            _ => 1.0,
        })
        .collect();
    for (mut col, &s) in lhs.column_iter_mut().zip(&scale) {
        col /= s;
    }

    let rhs = DVector::from_column_slice(y);
    let svd = lhs.svd(true, true);
    let cutoff = RCOND_FACTOR * n as f64 * svd.singular_values.max();
    let solution = svd.solve(&rhs, cutoff).map_err(FitError::Solver)?;

    let coefficients = solution
        .iter()
        .zip(&scale)
        .map(|(c, s)| c / s)
        .collect();
    Ok(Polynomial::new(coefficients))
}

// ---------------------------------------------------------------------------
// Sample fitting
// ---------------------------------------------------------------------------

/// Outcome of fitting a sample sequence.
#[derive(Debug, Clone, Serialize)]
pub struct FitReport {
    /// Unrounded least-squares solution.
    pub polynomial: Polynomial,
    pub rounded: Polynomial,
    /// Legend text, built from the rounded coefficients.
    pub equation: String,
    pub r_squared: Option<f64>,
}

/// Fit samples against their 1-based positions (`x = 1..=len`).
pub fn fit_samples(samples: &[i64], degree: usize, precision: u32) -> Result<FitReport, FitError> {
    let (x, y) = sample_points(samples);
    let polynomial = polyfit(&x, &y, degree)?;
    let rounded = polynomial.rounded(precision);
    let r_squared = polynomial.r_squared(&x, &y);
    let equation = rounded.equation();
    log::debug!(
        "fitted {} point(s): {} (r² = {:?})",
        samples.len(),
        equation,
        r_squared
    );
    Ok(FitReport {
        polynomial,
        rounded,
        equation,
        r_squared,
    })
}

/// `(1.0, y₁), (2.0, y₂), ...` as separate x and y vectors.
pub fn sample_points(samples: &[i64]) -> (Vec<f64>, Vec<f64>) {
    let x = (1..=samples.len()).map(|i| i as f64).collect();
    let y = samples.iter().map(|&v| v as f64).collect();
    (x, y)
}
