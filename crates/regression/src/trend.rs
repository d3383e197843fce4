use crate::calendar::encode;
use crate::linear::ordinary_least_squares;
use core_types::{FitResult, TrendResult};

/// Regresses a security's growth coefficients against the encoded window end-dates.
///
/// Only converged fits take part. Points are ordered by end date, then by
/// window label name, so windows sharing an end date (the trailing windows)
/// always enter the regression in the same order. Returns `None` with fewer
/// than two converged fits or when every converged window ends on the same date.
pub fn fit_trend(ticker: &str, fit_results: &[FitResult]) -> Option<TrendResult> {
    let mut points: Vec<(chrono::NaiveDate, &'static str, f64)> = fit_results
        .iter()
        .filter_map(|r| r.growth().map(|b| (r.window.end, r.window.label.as_str(), b)))
        .collect();
    if points.len() < 2 {
        return None;
    }
    points.sort_by(|l, r| l.0.cmp(&r.0).then(l.1.cmp(r.1)));

    let (xs, ys): (Vec<f64>, Vec<f64>) = points.iter().map(|&(end, _, b)| (encode(end), b)).unzip();
    let line = ordinary_least_squares(&xs, &ys)?;

    Some(TrendResult {
        ticker: ticker.to_string(),
        slope: line.slope,
        intercept: line.intercept,
        r_squared: line.r_squared,
        points: points.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::windows::generate_windows;
    use chrono::NaiveDate;
    use core_types::{ExponentialFit, FitError};

    fn results_with(growths: [Option<f64>; 5]) -> Vec<FitResult> {
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
        generate_windows(as_of)
            .unwrap()
            .into_iter()
            .zip(growths)
            .map(|(window, growth)| FitResult {
                window,
                outcome: match growth {
                    Some(b) => Ok(ExponentialFit {
                        a: 100.0,
                        b,
                        r_squared: 0.9,
                        rmse: 1.0,
                        points: 250,
                        iterations: 4,
                    }),
                    None => Err(FitError::NonConvergence { iterations: 200 }),
                },
                realized: None,
            })
            .collect()
    }

    // Window order: T1, T2, T3 (end 2024-06-14), PY2 (end 2022-12-31), PY3 (end 2021-12-31).

    #[test]
    fn rising_growth_has_positive_slope() {
        let results = results_with([Some(1.20), Some(1.20), Some(1.20), Some(1.10), Some(1.05)]);
        let trend = fit_trend("UP", &results).unwrap();
        assert!(trend.slope > 0.0);
        assert_eq!(trend.points, 5);
        assert_eq!(trend.ticker, "UP");
    }

    #[test]
    fn falling_growth_has_negative_slope() {
        let results = results_with([Some(0.90), Some(0.95), Some(0.92), Some(1.10), Some(1.20)]);
        assert!(fit_trend("DOWN", &results).unwrap().slope < 0.0);
    }

    #[test]
    fn constant_growth_is_flat() {
        let results = results_with([Some(1.07); 5]);
        let trend = fit_trend("FLAT", &results).unwrap();
        assert!(trend.slope.abs() < 1e-9);
    }

    #[test]
    fn failed_fits_are_excluded() {
        let results = results_with([Some(1.2), None, None, Some(1.0), None]);
        let trend = fit_trend("TWO", &results).unwrap();
        assert_eq!(trend.points, 2);
        assert!(trend.slope > 0.0);

        let results = results_with([Some(1.2), None, None, None, None]);
        assert!(fit_trend("ONE", &results).is_none());
    }

    #[test]
    fn shared_end_dates_alone_give_no_trend() {
        let results = results_with([Some(1.2), Some(1.1), Some(1.0), None, None]);
        assert!(fit_trend("SAME", &results).is_none());
    }

    #[test]
    fn input_order_does_not_matter() {
        let results = results_with([Some(1.3), Some(1.2), Some(1.25), Some(1.1), Some(0.9)]);
        let mut reversed = results.clone();
        reversed.reverse();
        assert_eq!(fit_trend("X", &results), fit_trend("X", &reversed));
    }
}
