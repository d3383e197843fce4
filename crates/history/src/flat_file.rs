use crate::{HistoryError, HistorySource};
use chrono::NaiveDate;
use core_types::{PricePoint, PriceSeries};
use std::fs;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "txt";

/// One `<TICKER>.txt` file per ticker in a single directory.
///
/// Each non-blank line is `YYYY-MM-DD close`, separated by whitespace.
#[derive(Debug, Clone)]
pub struct FlatFileHistory {
    dir: PathBuf,
}

impl FlatFileHistory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{ticker}.{EXTENSION}"))
    }
}

impl HistorySource for FlatFileHistory {
    fn tickers(&self) -> Result<Vec<String>, HistoryError> {
        let io_error = |source| HistoryError::Io {
            path: self.dir.clone(),
            source,
        };

        let mut tickers = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                tickers.push(stem.to_string());
            }
        }
        tickers.sort();
        tracing::debug!(dir = %self.dir.display(), count = tickers.len(), "Listed history files.");
        Ok(tickers)
    }

    fn load(&self, ticker: &str) -> Result<PriceSeries, HistoryError> {
        let path = self.path_for(ticker);
        let text = fs::read_to_string(&path).map_err(|source| HistoryError::Io {
            path: path.clone(),
            source,
        })?;
        parse_history(ticker, &path, &text)
    }
}

/// Parses the contents of one history file. `path` is only used in errors.
pub fn parse_history(ticker: &str, path: &Path, text: &str) -> Result<PriceSeries, HistoryError> {
    let parse_error = |line: usize, message: String| HistoryError::Parse {
        path: path.to_path_buf(),
        line,
        message,
    };

    let mut points = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let mut fields = raw.split_whitespace();
        let (Some(date), Some(close)) = (fields.next(), fields.next()) else {
            if raw.trim().is_empty() {
                continue;
            }
            return Err(parse_error(line, format!("expected `date close`, found `{raw}`")));
        };
        if let Some(extra) = fields.next() {
            return Err(parse_error(line, format!("unexpected field `{extra}`")));
        }

        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| parse_error(line, format!("invalid date `{date}`: {e}")))?;
        let close: f64 = close
            .parse()
            .map_err(|e| parse_error(line, format!("invalid close `{close}`: {e}")))?;
        points.push(PricePoint::new(date, close));
    }

    Ok(PriceSeries::new(ticker, points))
}
