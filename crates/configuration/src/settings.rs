use crate::error::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section is optional in `config.toml`; omitted sections take their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisSettings,
    pub ranking: RankingSettings,
    pub runtime: RuntimeSettings,
    pub data: DataSettings,
    pub logging: LoggingSettings,
}

impl Config {
    /// Rejects settings the engine cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analysis.validate()?;
        if self.ranking.top_n == 0 {
            return Err(ConfigError::ValidationError(
                "ranking.top_n must be at least 1".to_string(),
            ));
        }
        if self.runtime.workers == 0 {
            return Err(ConfigError::ValidationError(
                "runtime.workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parameters of the per-window exponential fit.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Minimum number of positive closes a window needs before it is fitted.
    pub min_points: usize,
    /// Hard cap on solver iterations for one fit.
    pub max_iterations: usize,
    /// Relative step / objective change below which the solver stops.
    pub tolerance: f64,
    /// Only fit a window when the history starts on or before the window start.
    pub require_full_coverage: bool,
}

impl AnalysisSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_points < 2 {
            return Err(ConfigError::ValidationError(format!(
                "analysis.min_points must be at least 2, got {}",
                self.min_points
            )));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "analysis.max_iterations must be at least 1".to_string(),
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "analysis.tolerance must be a positive number, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            min_points: 5,
            max_iterations: 200,
            tolerance: 1e-10,
            require_full_coverage: false,
        }
    }
}

/// Parameters for the ranked summary.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RankingSettings {
    /// Size of each (kind, cap) leaderboard, and of the tables the CLI prints.
    pub top_n: usize,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self { top_n: 10 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    /// Number of worker threads fitting securities in parallel.
    pub workers: usize,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
        }
    }
}

/// Where the collaborators' files live.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Directory of `<TICKER>.txt` closing-price histories.
    pub history_dir: PathBuf,
    /// JSON file of per-ticker metadata.
    pub metadata_file: PathBuf,
    /// Directory that receives the per-day JSON data file.
    pub output_dir: PathBuf,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            history_dir: PathBuf::from("history"),
            metadata_file: PathBuf::from("metadata.json"),
            output_dir: PathBuf::from("reports"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is not set.
    pub level: String,
    /// When set, logs go to a daily-rolling file in this directory instead of stderr.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}
