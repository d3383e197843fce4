use crate::error::EngineError;
use analyzer::{Analyzer, RankedSummary};
use chrono::NaiveDate;
use configuration::{Config, RankingSettings};
use core_types::SecurityRecord;
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

pub mod context;
pub mod error;

pub use context::{AnalysisContext, CancellationToken, SecurityInput};

/// Everything a completed run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    pub run_id: Uuid,
    pub as_of: NaiveDate,
    /// One record per input security, in input order.
    pub records: Vec<SecurityRecord>,
    pub summary: RankedSummary,
}

/// Fits every window for one security, then the trend across its windows.
pub fn analyze_security(context: &AnalysisContext, input: &SecurityInput) -> SecurityRecord {
    let ticker = input.series.ticker();
    let fit_results: Vec<_> = context
        .windows
        .iter()
        .map(|window| regression::fit_exponential(&input.series, window, &context.settings))
        .collect();
    let trend = regression::fit_trend(ticker, &fit_results);

    let record = SecurityRecord {
        ticker: ticker.to_string(),
        metadata: input.metadata.clone(),
        fit_results,
        trend,
    };
    if record.converged_count() == 0 {
        tracing::warn!(
            ticker,
            points = input.series.len(),
            "No window produced a converged fit."
        );
    }
    record
}

/// Runs the per-security fitting stage on a worker pool and aggregates the results.
pub struct AnalysisEngine {
    context: Arc<AnalysisContext>,
    ranking: RankingSettings,
    workers: usize,
    progress: Option<ProgressBar>,
}

impl AnalysisEngine {
    pub fn new(config: &Config, as_of: NaiveDate) -> Result<Self, EngineError> {
        let context = AnalysisContext::new(as_of, config.analysis.clone())?;
        Ok(Self {
            context: Arc::new(context),
            ranking: config.ranking.clone(),
            workers: config.runtime.workers,
            progress: None,
        })
    }

    /// Advances `progress` by one for every analyzed security.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn context(&self) -> &AnalysisContext {
        &self.context
    }

    /// Analyzes every input and ranks the results.
    ///
    /// Each security is one task; tasks share only the read-only context and
    /// write only their own slot. Cancellation is checked before each task
    /// starts, never mid-fit.
    pub fn run(
        &self,
        inputs: &[SecurityInput],
        cancel: &CancellationToken,
    ) -> Result<RunOutput, EngineError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("run", %run_id, as_of = %self.context.as_of);
        let _entered = span.enter();

        let total = inputs.len();
        tracing::info!(securities = total, workers = self.workers, "Starting analysis run.");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("trendline-worker-{i}"))
            .build()?;

        let context = Arc::clone(&self.context);
        let slots: Vec<Option<SecurityRecord>> = pool.install(|| {
            inputs
                .par_iter()
                .map(|input| {
                    if cancel.is_cancelled() {
                        return None;
                    }
                    let record = span.in_scope(|| analyze_security(&context, input));
                    if let Some(progress) = &self.progress {
                        progress.inc(1);
                    }
                    Some(record)
                })
                .collect()
        });

        let completed = slots.iter().filter(|slot| slot.is_some()).count();
        if completed < total {
            tracing::warn!(completed, total, "Run cancelled.");
            return Err(EngineError::Cancelled { completed, total });
        }
        let records: Vec<SecurityRecord> = slots.into_iter().flatten().collect();

        let converged: usize = records.iter().map(|r| r.converged_count()).sum();
        let trends = records.iter().filter(|r| r.trend.is_some()).count();
        tracing::info!(converged, trends, "Fitting complete. Aggregating.");

        let summary = Analyzer::new(self.ranking.clone()).aggregate(
            self.context.as_of,
            &self.context.windows,
            &records,
        );

        Ok(RunOutput {
            run_id,
            as_of: self.context.as_of,
            records,
            summary,
        })
    }
}
