use crate::{HistoryError, MetadataSource};
use core_types::{Cap, Label, Metadata, SecurityKind};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// A metadata record as written by the collector. Every field may be absent.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMetadata {
    /// `-1` means unknown.
    assets: Option<f64>,
    cap: Option<Cap>,
    category: Option<String>,
    family: Option<String>,
    kind: Option<SecurityKind>,
}

impl From<RawMetadata> for Metadata {
    fn from(raw: RawMetadata) -> Self {
        let assets = raw.assets.filter(|a| a.is_finite() && *a >= 0.0);
        let cap = match raw.cap {
            Some(cap) if cap != Cap::Unknown => cap,
            _ => Cap::from_assets(assets),
        };
        Metadata::new(
            assets,
            cap,
            Label::from_raw(raw.category.as_deref().unwrap_or_default()),
            Label::from_raw(raw.family.as_deref().unwrap_or_default()),
            raw.kind.unwrap_or(SecurityKind::Unknown),
        )
    }
}

/// Metadata for a universe of tickers, loaded from one JSON object keyed by ticker.
#[derive(Debug, Clone, Default)]
pub struct JsonMetadataStore {
    records: HashMap<String, Metadata>,
}

impl JsonMetadataStore {
    pub fn open(path: &Path) -> Result<Self, HistoryError> {
        let text = fs::read_to_string(path).map_err(|source| HistoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_json(&text).map_err(|source| HistoryError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), records = store.len(), "Loaded metadata.");
        Ok(store)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let raw: HashMap<String, RawMetadata> = serde_json::from_str(text)?;
        let records = raw
            .into_iter()
            .map(|(ticker, record)| (ticker, Metadata::from(record)))
            .collect();
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl MetadataSource for JsonMetadataStore {
    fn metadata(&self, ticker: &str) -> Metadata {
        self.records
            .get(ticker)
            .cloned()
            .unwrap_or_else(Metadata::unknown)
    }
}
