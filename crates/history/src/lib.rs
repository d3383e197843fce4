//! Adapters between on-disk data and the engine's in-memory model.
//!
//! The engine never touches files; the binary loads each ticker through a
//! `HistorySource` and classifies it through a `MetadataSource`.

use core_types::{Metadata, PriceSeries};

pub mod error;
pub mod flat_file;
pub mod metadata;

pub use error::HistoryError;
pub use flat_file::{FlatFileHistory, parse_history};
pub use metadata::JsonMetadataStore;

/// A store of per-ticker daily closes.
pub trait HistorySource: Send + Sync {
    /// Every ticker the store holds, sorted.
    fn tickers(&self) -> Result<Vec<String>, HistoryError>;

    fn load(&self, ticker: &str) -> Result<PriceSeries, HistoryError>;
}

/// A store of per-ticker classification.
pub trait MetadataSource: Send + Sync {
    /// Never fails: a ticker without a record is `Metadata::unknown()`.
    fn metadata(&self, ticker: &str) -> Metadata;
}
