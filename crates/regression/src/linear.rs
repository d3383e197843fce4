/// A fitted line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination. 1.0 when `y` has no variance.
    pub r_squared: f64,
}

/// Closed-form ordinary least squares on centered sums.
///
/// Returns `None` for mismatched lengths, fewer than two points, non-finite
/// input, or when every `x` is identical.
pub fn ordinary_least_squares(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    if xs.iter().chain(ys).any(|v| !v.is_finite()) {
        return None;
    }
    if xs.iter().all(|&x| x == xs[0]) {
        return None;
    }

    let n = xs.len() as f64;
    let x_mean = xs.iter().sum::<f64>() / n;
    let y_mean = ys.iter().sum::<f64>() / n;

    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - x_mean;
        let dy = y - y_mean;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    if sxx <= 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;
    let r_squared = if syy > 0.0 { (sxy * sxy) / (sxx * syy) } else { 1.0 };

    Some(LinearFit {
        slope,
        intercept,
        r_squared,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_exact_line() {
        let xs: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 3.0 + 2.0 * x).collect();
        let fit = ordinary_least_squares(&xs, &ys).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 3.0).abs() < 1e-12);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_y_has_zero_slope() {
        let xs = [2021.9, 2022.9, 2024.4];
        let ys = [1.05, 1.05, 1.05];
        let fit = ordinary_least_squares(&xs, &ys).unwrap();
        assert!(fit.slope.abs() < 1e-12);
        assert_eq!(fit.r_squared, 1.0);
    }

    #[test]
    fn degenerate_inputs_yield_none() {
        assert!(ordinary_least_squares(&[1.0], &[2.0]).is_none());
        assert!(ordinary_least_squares(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_none());
        assert!(ordinary_least_squares(&[1.0, 2.0], &[1.0]).is_none());
        assert!(ordinary_least_squares(&[1.0, f64::NAN], &[1.0, 2.0]).is_none());
    }
}
