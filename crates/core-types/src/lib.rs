//! # Trendline Core Types
//!
//! The shared vocabulary of the workspace: price histories, analysis windows,
//! security metadata, and the per-security fit results that flow from the
//! regression stage into the analyzer.
//!
//! This is a Layer 0 crate. It holds data only; every calculation lives in the
//! crates that depend on it.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Cap, Label, SecurityKind, WindowLabel};
pub use error::{CoreError, FitError};
pub use structs::{
    ExponentialFit, FitResult, Metadata, PricePoint, PriceSeries, SecurityRecord, TrendResult,
    Window,
};
