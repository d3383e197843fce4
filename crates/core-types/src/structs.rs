use crate::enums::{Cap, Label, SecurityKind, WindowLabel};
use crate::error::{CoreError, FitError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single daily closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// The closing-price history of one ticker, ascending by date with unique dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    ticker: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series from externally supplied points.
    ///
    /// Points are sorted by date. When a date appears more than once the last
    /// supplied point for that date wins.
    pub fn new(ticker: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        points.reverse();
        points.dedup_by_key(|p| p.date);
        points.reverse();
        Self {
            ticker: ticker.into(),
            points,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    /// The points with `start <= date <= end`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> &[PricePoint] {
        let lo = self.points.partition_point(|p| p.date < start);
        let hi = self.points.partition_point(|p| p.date <= end);
        if lo >= hi {
            &[]
        } else {
            &self.points[lo..hi]
        }
    }
}

/// A labeled, inclusive date range over which one exponential fit is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Window {
    pub label: WindowLabel,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    /// Creates a window, rejecting empty or inverted ranges.
    pub fn new(label: WindowLabel, start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if start >= end {
            return Err(CoreError::InvalidInput(
                label.to_string(),
                format!("window start {start} must precede end {end}"),
            ));
        }
        Ok(Self { label, start, end })
    }
}

/// Classification of a security used only for grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Net assets or market capitalization. `None` when the collector could not
    /// determine it.
    pub assets: Option<f64>,
    pub cap: Cap,
    pub category: Label,
    pub family: Label,
    pub kind: SecurityKind,
}

impl Metadata {
    pub fn new(
        assets: Option<f64>,
        cap: Cap,
        category: Label,
        family: Label,
        kind: SecurityKind,
    ) -> Self {
        Self {
            assets,
            cap,
            category,
            family,
            kind,
        }
    }

    /// The metadata assumed for a ticker with no collected record.
    pub fn unknown() -> Self {
        Self::new(
            None,
            Cap::Unknown,
            Label::Unknown,
            Label::Unknown,
            SecurityKind::Unknown,
        )
    }
}

/// Coefficients of a converged `y = a * b^x` fit, with `x` in years from the window start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExponentialFit {
    pub a: f64,
    /// Annualized growth multiplier.
    pub b: f64,
    pub r_squared: f64,
    pub rmse: f64,
    pub points: usize,
    pub iterations: usize,
}

/// The outcome of fitting one security over one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub window: Window,
    pub outcome: Result<ExponentialFit, FitError>,
    /// Annualized start-to-end growth between the history dates nearest the
    /// window bounds. Independent of the regression outcome.
    pub realized: Option<f64>,
}

impl FitResult {
    pub fn converged(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn fit(&self) -> Option<&ExponentialFit> {
        self.outcome.as_ref().ok()
    }

    /// The growth coefficient `b`, only when the fit converged.
    pub fn growth(&self) -> Option<f64> {
        self.fit().map(|f| f.b)
    }
}

/// Linear trend of a security's growth coefficients across window end-dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub ticker: String,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub points: usize,
}

/// Everything computed for one ticker during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityRecord {
    pub ticker: String,
    pub metadata: Metadata,
    pub fit_results: Vec<FitResult>,
    pub trend: Option<TrendResult>,
}

impl SecurityRecord {
    pub fn fit_for(&self, label: WindowLabel) -> Option<&FitResult> {
        self.fit_results.iter().find(|r| r.window.label == label)
    }

    pub fn converged_count(&self) -> usize {
        self.fit_results.iter().filter(|r| r.converged()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn series_is_sorted_and_keeps_last_duplicate() {
        let series = PriceSeries::new(
            "ABC",
            vec![
                PricePoint::new(date(2024, 1, 3), 12.0),
                PricePoint::new(date(2024, 1, 2), 10.0),
                PricePoint::new(date(2024, 1, 3), 13.0),
            ],
        );
        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[0].date, date(2024, 1, 2));
        assert_eq!(series.points()[1].close, 13.0);
    }

    #[test]
    fn between_is_inclusive() {
        let points = (1..=10)
            .map(|d| PricePoint::new(date(2024, 1, d), d as f64))
            .collect();
        let series = PriceSeries::new("ABC", points);
        let slice = series.between(date(2024, 1, 3), date(2024, 1, 5));
        assert_eq!(slice.len(), 3);
        assert_eq!(slice[0].date, date(2024, 1, 3));
        assert_eq!(slice[2].date, date(2024, 1, 5));
        assert!(series.between(date(2025, 1, 1), date(2025, 2, 1)).is_empty());
    }

    #[test]
    fn window_rejects_inverted_range() {
        assert!(Window::new(WindowLabel::Trailing1Y, date(2024, 1, 1), date(2024, 1, 1)).is_err());
        assert!(Window::new(WindowLabel::Trailing1Y, date(2024, 1, 2), date(2024, 1, 1)).is_err());
        assert!(Window::new(WindowLabel::Trailing1Y, date(2023, 1, 1), date(2024, 1, 1)).is_ok());
    }

    #[test]
    fn failed_fit_exposes_no_growth() {
        let window =
            Window::new(WindowLabel::Trailing1Y, date(2023, 1, 1), date(2024, 1, 1)).unwrap();
        let result = FitResult {
            window,
            outcome: Err(FitError::InsufficientData {
                required: 5,
                actual: 1,
            }),
            realized: None,
        };
        assert!(!result.converged());
        assert_eq!(result.growth(), None);
    }
}
