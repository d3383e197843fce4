//! # Trendline Regression
//!
//! The numeric core of the analysis: every function here is pure and
//! deterministic, so a fixed as-of date and identical histories always produce
//! bit-identical coefficients.
//!
//! ## Pipeline
//!
//! 1. `calendar::encode` turns a date into a year fraction.
//! 2. `windows::generate_windows` derives the analysis windows from the as-of date.
//! 3. `exponential::fit_exponential` fits `y = a * b^x` per security per window.
//! 4. `trend::fit_trend` fits a line through a security's `b` values across windows.
//!
//! `linear` holds the closed-form least squares used by stages 3 and 4.

pub mod calendar;
pub mod exponential;
pub mod linear;
pub mod trend;
pub mod windows;

pub use calendar::encode;
pub use exponential::{fit_exponential, realized_growth};
pub use linear::{LinearFit, ordinary_least_squares};
pub use trend::fit_trend;
pub use windows::{generate_windows, most_recent_complete_year};
