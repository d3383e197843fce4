use crate::calendar::encode;
use crate::linear::ordinary_least_squares;
use chrono::NaiveDate;
use configuration::AnalysisSettings;
use core_types::{ExponentialFit, FitError, FitResult, PricePoint, PriceSeries, Window};
use nalgebra::{Matrix2, Vector2};

/// Starting Levenberg-Marquardt damping factor.
const INITIAL_DAMPING: f64 = 1e-3;
const MIN_DAMPING: f64 = 1e-15;
const MAX_DAMPING: f64 = 1e16;

/// Fits `close = a * b^x` over one window of one security's history.
///
/// `x` is the encoded date minus the encoded window start, so every window
/// begins at zero and `b` is an annual growth multiplier. The fit is seeded by
/// a log-linear regression and refined with Levenberg-Marquardt on the direct
/// residuals `close - a * b^x`.
///
/// Never fails: insufficient data, solver exhaustion and non-finite
/// parameters are recorded in `FitResult::outcome`.
pub fn fit_exponential(
    series: &PriceSeries,
    window: &Window,
    settings: &AnalysisSettings,
) -> FitResult {
    let outcome = fit_window(series, window, settings);
    let realized = match outcome {
        Err(FitError::IncompleteCoverage { .. }) => None,
        _ => realized_growth(series, window),
    };

    match &outcome {
        Ok(fit) => tracing::debug!(
            ticker = series.ticker(),
            window = %window.label,
            a = fit.a,
            b = fit.b,
            r_squared = fit.r_squared,
            iterations = fit.iterations,
            "Exponential fit converged."
        ),
        Err(reason) => tracing::debug!(
            ticker = series.ticker(),
            window = %window.label,
            %reason,
            "Exponential fit unavailable."
        ),
    }

    FitResult {
        window: *window,
        outcome,
        realized,
    }
}

fn fit_window(
    series: &PriceSeries,
    window: &Window,
    settings: &AnalysisSettings,
) -> Result<ExponentialFit, FitError> {
    let required = settings.min_points.max(2);

    if settings.require_full_coverage {
        match series.first_date() {
            Some(first_date) if first_date > window.start => {
                return Err(FitError::IncompleteCoverage { first_date });
            }
            None => return Err(FitError::InsufficientData { required, actual: 0 }),
            Some(_) => {}
        }
    }

    // Non-positive closes are data-quality failures; drop them and re-check the count.
    let origin = encode(window.start);
    let (xs, ys): (Vec<f64>, Vec<f64>) = series
        .between(window.start, window.end)
        .iter()
        .filter(|p| p.close.is_finite() && p.close > 0.0)
        .map(|p| (encode(p.date) - origin, p.close))
        .unzip();

    if xs.len() < required {
        return Err(FitError::InsufficientData {
            required,
            actual: xs.len(),
        });
    }

    let seed = log_linear_seed(&xs, &ys).ok_or(FitError::InsufficientData {
        required,
        actual: xs.len(),
    })?;
    let solution = levenberg_marquardt(&xs, &ys, seed, settings)?;

    let (a, b) = (solution.params[0], solution.params[1]);
    if !(a.is_finite() && b.is_finite() && b > 0.0) {
        return Err(FitError::NonFinite);
    }

    let n = xs.len() as f64;
    let y_mean = ys.iter().sum::<f64>() / n;
    let ss_tot: f64 = ys.iter().map(|y| (y - y_mean).powi(2)).sum();
    let r_squared = if ss_tot > 0.0 {
        1.0 - solution.sse / ss_tot
    } else {
        1.0
    };

    Ok(ExponentialFit {
        a,
        b,
        r_squared,
        rmse: (solution.sse / n).sqrt(),
        points: xs.len(),
        iterations: solution.iterations,
    })
}

/// Solves `ln(close) = ln(a) + x * ln(b)` and returns `(a, b)`.
fn log_linear_seed(xs: &[f64], ys: &[f64]) -> Option<Vector2<f64>> {
    let log_ys: Vec<f64> = ys.iter().map(|y| y.ln()).collect();
    let line = ordinary_least_squares(xs, &log_ys)?;
    let seed = Vector2::new(line.intercept.exp(), line.slope.exp());
    if seed.iter().all(|v| v.is_finite() && *v > 0.0) {
        Some(seed)
    } else {
        None
    }
}

#[derive(Debug)]
struct Solution {
    params: Vector2<f64>,
    sse: f64,
    iterations: usize,
}

fn sum_squared_residuals(xs: &[f64], ys: &[f64], params: &Vector2<f64>) -> f64 {
    let (a, b) = (params[0], params[1]);
    xs.iter()
        .zip(ys)
        .map(|(&x, &y)| (y - a * b.powf(x)).powi(2))
        .sum()
}

/// Accumulates `JᵀJ` and `Jᵀr` for the model `a * b^x` at `params`.
fn normal_equations(xs: &[f64], ys: &[f64], params: &Vector2<f64>) -> (Matrix2<f64>, Vector2<f64>) {
    let (a, b) = (params[0], params[1]);
    let mut jtj = Matrix2::zeros();
    let mut jtr = Vector2::zeros();
    for (&x, &y) in xs.iter().zip(ys) {
        let growth = b.powf(x);
        let model = a * growth;
        // d/da = b^x, d/db = a * x * b^(x - 1)
        let gradient = Vector2::new(growth, model * x / b);
        jtj += gradient * gradient.transpose();
        jtr += gradient * (y - model);
    }
    (jtj, jtr)
}

/// Levenberg-Marquardt with multiplicative diagonal damping.
///
/// Each iteration tries one step. The iteration budget is a hard cap; running
/// out of it is `FitError::NonConvergence`.
fn levenberg_marquardt(
    xs: &[f64],
    ys: &[f64],
    seed: Vector2<f64>,
    settings: &AnalysisSettings,
) -> Result<Solution, FitError> {
    let tolerance = settings.tolerance;
    let mut params = seed;
    let mut sse = sum_squared_residuals(xs, ys, &params);
    if !sse.is_finite() {
        return Err(FitError::NonFinite);
    }
    if sse == 0.0 {
        return Ok(Solution {
            params,
            sse,
            iterations: 0,
        });
    }

    let mut damping = INITIAL_DAMPING;
    for iteration in 1..=settings.max_iterations {
        let (jtj, jtr) = normal_equations(xs, ys, &params);
        if jtj.iter().chain(jtr.iter()).any(|v| !v.is_finite()) {
            return Err(FitError::NonFinite);
        }

        let mut damped = jtj;
        damped[(0, 0)] += damping * jtj[(0, 0)];
        damped[(1, 1)] += damping * jtj[(1, 1)];

        let Some(step) = damped.lu().solve(&jtr) else {
            damping *= 10.0;
            if damping > MAX_DAMPING {
                return Err(FitError::NonConvergence {
                    iterations: iteration,
                });
            }
            continue;
        };

        let negligible_step = step.norm() <= tolerance * (params.norm() + tolerance);
        let candidate = params + step;
        let candidate_sse = if candidate[1] > 0.0 {
            sum_squared_residuals(xs, ys, &candidate)
        } else {
            f64::INFINITY
        };

        if candidate_sse.is_finite() && candidate_sse <= sse {
            let improvement = sse - candidate_sse;
            params = candidate;
            sse = candidate_sse;
            damping = (damping / 10.0).max(MIN_DAMPING);
            if negligible_step || improvement <= tolerance * sse {
                return Ok(Solution {
                    params,
                    sse,
                    iterations: iteration,
                });
            }
        } else {
            // A vanishing step that cannot lower the objective means we are at the minimum.
            if negligible_step {
                return Ok(Solution {
                    params,
                    sse,
                    iterations: iteration,
                });
            }
            damping *= 10.0;
            if damping > MAX_DAMPING {
                return Err(FitError::NonConvergence {
                    iterations: iteration,
                });
            }
        }
    }

    Err(FitError::NonConvergence {
        iterations: settings.max_iterations,
    })
}

/// Annualized simple growth between the history points nearest the window bounds.
///
/// `1 + (close_end / close_start - 1) / (encode(end) - encode(start))`.
pub fn realized_growth(series: &PriceSeries, window: &Window) -> Option<f64> {
    let start = nearest(series.points(), window.start)?;
    let end = nearest(series.points(), window.end)?;
    if start.date >= end.date || !(start.close > 0.0) || !end.close.is_finite() {
        return None;
    }
    let span = encode(end.date) - encode(start.date);
    let growth = 1.0 + (end.close / start.close - 1.0) / span;
    growth.is_finite().then_some(growth)
}

/// The point closest to `date`, preferring the earlier point on ties.
fn nearest(points: &[PricePoint], date: NaiveDate) -> Option<&PricePoint> {
    let idx = points.partition_point(|p| p.date < date);
    let before = idx.checked_sub(1).and_then(|i| points.get(i));
    let after = points.get(idx);
    match (before, after) {
        (Some(b), Some(a)) => {
            if date - b.date <= a.date - date {
                Some(b)
            } else {
                Some(a)
            }
        }
        (b, a) => b.or(a),
    }
}
