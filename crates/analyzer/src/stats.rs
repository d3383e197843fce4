use crate::summary::RankedEntry;
use serde::{Deserialize, Serialize};

/// Summary statistics of a group, computed only over contributing securities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub count: usize,
    pub mean_b: f64,
    pub median_b: f64,
    /// Population standard deviation.
    pub std_dev_b: f64,
    pub min_b: f64,
    pub max_b: f64,
    /// Mean trend slope over the entries that have a trend.
    pub mean_trend_slope: Option<f64>,
    pub trend_count: usize,
}

impl GroupStats {
    /// Returns `None` for an empty group.
    pub fn from_entries(entries: &[RankedEntry]) -> Option<Self> {
        let mut values: Vec<f64> = entries.iter().map(|e| e.b).collect();
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);

        let count = values.len();
        let mean_b = mean(&values);
        let variance = values.iter().map(|v| (v - mean_b).powi(2)).sum::<f64>() / count as f64;

        let slopes: Vec<f64> = entries.iter().filter_map(|e| e.trend_slope).collect();

        Some(Self {
            count,
            mean_b,
            median_b: median(&values),
            std_dev_b: variance.sqrt(),
            min_b: values[0],
            max_b: values[count - 1],
            mean_trend_slope: (!slopes.is_empty()).then(|| mean(&slopes)),
            trend_count: slopes.len(),
        })
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median of an ascending, non-empty slice.
fn median(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
