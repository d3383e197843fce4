use chrono::NaiveDate;
use configuration::AnalysisSettings;
use core_types::{CoreError, Metadata, PriceSeries, Window};
use regression::generate_windows;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Immutable state shared by every task of one run.
///
/// Built once from the caller-supplied as-of date; nothing in a run reads the
/// clock, so two contexts with the same date and settings are interchangeable.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    pub as_of: NaiveDate,
    pub windows: Vec<Window>,
    pub settings: AnalysisSettings,
}

impl AnalysisContext {
    pub fn new(as_of: NaiveDate, settings: AnalysisSettings) -> Result<Self, CoreError> {
        Ok(Self {
            as_of,
            windows: generate_windows(as_of)?,
            settings,
        })
    }
}

/// One security's history and metadata, as handed to the engine.
#[derive(Debug, Clone)]
pub struct SecurityInput {
    pub series: PriceSeries,
    pub metadata: Metadata,
}

impl SecurityInput {
    pub fn new(series: PriceSeries, metadata: Metadata) -> Self {
        Self { series, metadata }
    }
}

/// Cooperative cancellation, polled between securities.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
