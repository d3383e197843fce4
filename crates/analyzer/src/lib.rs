//! Turns per-security fit results into ranked, grouped summaries.
//!
//! Ranking is by growth coefficient `b`, descending, with ties broken by
//! ticker so identical input always yields identical output. A security only
//! appears in a window's groups if its fit for that window converged.

use chrono::NaiveDate;
use configuration::RankingSettings;
use core_types::{Cap, SecurityRecord, Window, WindowLabel};
use itertools::Itertools;
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub mod stats;
pub mod summary;

pub use stats::GroupStats;
pub use summary::{
    GroupKey, GroupRanking, LeaderEntry, Leaderboard, RankedEntry, RankedSummary, WindowRanking,
};

/// The aggregation stage of a run.
pub struct Analyzer {
    settings: RankingSettings,
}

impl Analyzer {
    pub fn new(settings: RankingSettings) -> Self {
        Self { settings }
    }

    /// Ranks every window's converged fits within each metadata group and
    /// builds the realized-growth leaderboards.
    ///
    /// An empty `records` slice yields an empty summary, not an error.
    pub fn aggregate(
        &self,
        as_of: NaiveDate,
        windows: &[Window],
        records: &[SecurityRecord],
    ) -> RankedSummary {
        let unmapped: Vec<&str> = records
            .iter()
            .filter(|r| {
                let m = &r.metadata;
                m.category.is_unknown() || m.family.is_unknown() || m.cap == Cap::Unknown
            })
            .map(|r| r.ticker.as_str())
            .collect();
        if !unmapped.is_empty() {
            tracing::warn!(
                count = unmapped.len(),
                tickers = %unmapped.join(","),
                "Securities with unmapped metadata are grouped as UNKNOWN."
            );
        }

        let windows: Vec<WindowRanking> = windows
            .iter()
            .map(|window| rank_window(window, records))
            .collect();
        for ranking in &windows {
            let ranked = ranking
                .group(&GroupKey::All)
                .map_or(0, |g| g.entries.len());
            tracing::info!(
                window = %ranking.window.label,
                ranked,
                groups = ranking.groups.len(),
                "Window ranked."
            );
        }

        RankedSummary {
            as_of,
            windows,
            leaders: self.leaderboards(records),
        }
    }

    fn leaderboards(&self, records: &[SecurityRecord]) -> Vec<Leaderboard> {
        records
            .iter()
            .filter_map(|record| {
                let realized = record.fit_for(WindowLabel::Trailing1Y)?.realized?;
                let key = (record.metadata.kind, record.metadata.cap);
                Some((
                    key,
                    LeaderEntry {
                        ticker: record.ticker.clone(),
                        realized,
                        category: record.metadata.category.clone(),
                    },
                ))
            })
            .into_group_map()
            .into_iter()
            .sorted_by_key(|(key, _)| *key)
            .map(|((kind, cap), mut entries)| {
                entries.sort_by(|l, r| {
                    r.realized
                        .total_cmp(&l.realized)
                        .then_with(|| l.ticker.cmp(&r.ticker))
                });
                entries.truncate(self.settings.top_n);
                Leaderboard { kind, cap, entries }
            })
            .collect()
    }
}

fn rank_window(window: &Window, records: &[SecurityRecord]) -> WindowRanking {
    let mut groups: BTreeMap<GroupKey, Vec<RankedEntry>> = BTreeMap::new();

    for record in records {
        let Some(result) = record.fit_for(window.label) else {
            continue;
        };
        let Some(fit) = result.fit() else {
            continue;
        };
        let entry = RankedEntry {
            ticker: record.ticker.clone(),
            b: fit.b,
            r_squared: fit.r_squared,
            trend_slope: record.trend.as_ref().map(|t| t.slope),
            realized: result.realized,
        };
        for key in GroupKey::memberships(&record.metadata) {
            groups.entry(key).or_default().push(entry.clone());
        }
    }

    let groups = groups
        .into_iter()
        .filter_map(|(group, mut entries)| {
            entries.sort_by(by_growth_then_ticker);
            let stats = GroupStats::from_entries(&entries)?;
            Some(GroupRanking {
                group,
                entries,
                stats,
            })
        })
        .collect();

    WindowRanking {
        window: *window,
        groups,
    }
}

fn by_growth_then_ticker(l: &RankedEntry, r: &RankedEntry) -> Ordering {
    r.b.total_cmp(&l.b).then_with(|| l.ticker.cmp(&r.ticker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{
        ExponentialFit, FitError, FitResult, Label, Metadata, SecurityKind, TrendResult,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn windows() -> Vec<Window> {
        vec![
            Window::new(WindowLabel::Trailing1Y, date(2023, 6, 14), date(2024, 6, 14)).unwrap(),
            Window::new(WindowLabel::PriorYear2, date(2022, 1, 1), date(2022, 12, 31)).unwrap(),
        ]
    }

    fn converged(window: Window, b: f64, realized: Option<f64>) -> FitResult {
        FitResult {
            window,
            outcome: Ok(ExponentialFit {
                a: 10.0,
                b,
                r_squared: 0.95,
                rmse: 0.1,
                points: 250,
                iterations: 3,
            }),
            realized,
        }
    }

    fn failed(window: Window) -> FitResult {
        FitResult {
            window,
            outcome: Err(FitError::InsufficientData {
                required: 5,
                actual: 1,
            }),
            realized: None,
        }
    }

    fn metadata(cap: Cap, category: &str, kind: SecurityKind) -> Metadata {
        Metadata::new(
            None,
            cap,
            Label::from_raw(category),
            Label::from_raw("Vanguard"),
            kind,
        )
    }

    fn record(ticker: &str, metadata: Metadata, fit_results: Vec<FitResult>) -> SecurityRecord {
        SecurityRecord {
            ticker: ticker.to_string(),
            metadata,
            fit_results,
            trend: None,
        }
    }

    fn analyzer(top_n: usize) -> Analyzer {
        Analyzer::new(RankingSettings { top_n })
    }

    fn tickers(group: &GroupRanking) -> Vec<&str> {
        group.entries.iter().map(|e| e.ticker.as_str()).collect()
    }

    #[test]
    fn equal_growth_breaks_ties_by_ticker() {
        let [t1, py2] = [windows()[0], windows()[1]];
        let meta = metadata(Cap::Large, "Tech", SecurityKind::Stock);
        let records = vec![
            record("ZZZ", meta.clone(), vec![converged(t1, 1.2, None), failed(py2)]),
            record("AAA", meta.clone(), vec![converged(t1, 1.2, None), failed(py2)]),
            record("MMM", meta, vec![converged(t1, 1.5, None), failed(py2)]),
        ];

        let first = analyzer(10).aggregate(date(2024, 6, 14), &windows(), &records);
        let all = first
            .window(WindowLabel::Trailing1Y)
            .unwrap()
            .group(&GroupKey::All)
            .unwrap();
        assert_eq!(tickers(all), ["MMM", "AAA", "ZZZ"]);

        let mut reversed = records.clone();
        reversed.reverse();
        let second = analyzer(10).aggregate(date(2024, 6, 14), &windows(), &reversed);
        assert_eq!(first, second);
    }

    #[test]
    fn every_contributor_lands_in_one_group_per_dimension() {
        let [t1, py2] = [windows()[0], windows()[1]];
        let records = vec![
            record(
                "A",
                metadata(Cap::Large, "Tech", SecurityKind::Stock),
                vec![converged(t1, 1.1, None), converged(py2, 1.0, None)],
            ),
            record(
                "B",
                metadata(Cap::Small, "--", SecurityKind::Etf),
                vec![converged(t1, 1.3, None), failed(py2)],
            ),
        ];
        let summary = analyzer(10).aggregate(date(2024, 6, 14), &windows(), &records);

        let t1_ranking = summary.window(WindowLabel::Trailing1Y).unwrap();
        for ticker in ["A", "B"] {
            let containing: Vec<&GroupKey> = t1_ranking
                .groups
                .iter()
                .filter(|g| g.entries.iter().any(|e| e.ticker == ticker))
                .map(|g| &g.group)
                .collect();
            assert_eq!(containing.len(), 5, "{ticker} in {containing:?}");
            assert_eq!(containing.iter().filter(|k| ***k == GroupKey::All).count(), 1);
            assert_eq!(
                containing.iter().filter(|k| matches!(k, GroupKey::Cap(_))).count(),
                1
            );
            assert_eq!(
                containing.iter().filter(|k| matches!(k, GroupKey::Category(_))).count(),
                1
            );
        }

        // "--" category is kept as its own UNKNOWN group.
        let unknown = t1_ranking
            .group(&GroupKey::Category(Label::Unknown))
            .unwrap();
        assert_eq!(tickers(unknown), ["B"]);

        // B failed PriorYear2 and is absent there rather than ranked as zero.
        let py2_all = summary
            .window(WindowLabel::PriorYear2)
            .unwrap()
            .group(&GroupKey::All)
            .unwrap();
        assert_eq!(tickers(py2_all), ["A"]);
        assert_eq!(py2_all.stats.count, 1);
        assert!(summary
            .window(WindowLabel::PriorYear2)
            .unwrap()
            .group(&GroupKey::Cap(Cap::Small))
            .is_none());
    }

    #[test]
    fn group_stats_include_trends_of_contributors_only() {
        let [t1, py2] = [windows()[0], windows()[1]];
        let meta = metadata(Cap::Mid, "Bonds", SecurityKind::Fund);
        let mut with_trend = record("T", meta.clone(), vec![converged(t1, 1.0, None), converged(py2, 0.9, None)]);
        with_trend.trend = Some(TrendResult {
            ticker: "T".to_string(),
            slope: 0.04,
            intercept: -80.0,
            r_squared: 1.0,
            points: 2,
        });
        let records = vec![
            with_trend,
            record("U", meta, vec![converged(t1, 1.2, None), failed(py2)]),
        ];
        let summary = analyzer(10).aggregate(date(2024, 6, 14), &windows(), &records);
        let stats = &summary
            .window(WindowLabel::Trailing1Y)
            .unwrap()
            .group(&GroupKey::Cap(Cap::Mid))
            .unwrap()
            .stats;
        assert_eq!(stats.count, 2);
        assert!((stats.mean_b - 1.1).abs() < 1e-12);
        assert_eq!(stats.trend_count, 1);
        assert_eq!(stats.mean_trend_slope, Some(0.04));
    }

    #[test]
    fn leaderboards_rank_realized_growth_per_kind_and_cap() {
        let [t1, py2] = [windows()[0], windows()[1]];
        let stock_large = metadata(Cap::Large, "Tech", SecurityKind::Stock);
        let records = vec![
            record("A", stock_large.clone(), vec![failed(t1), failed(py2)]),
            record("B", stock_large.clone(), vec![converged(t1, 1.0, Some(1.30)), failed(py2)]),
            record("C", stock_large.clone(), vec![failed(t1), failed(py2)]),
            record("D", stock_large, vec![converged(t1, 1.0, Some(1.10)), failed(py2)]),
            record(
                "E",
                metadata(Cap::Small, "Tech", SecurityKind::Etf),
                vec![converged(t1, 1.0, Some(0.90)), failed(py2)],
            ),
        ];
        // Realized growth is independent of convergence.
        let mut records = records;
        records[0].fit_results[0].realized = Some(1.20);

        let summary = analyzer(2).aggregate(date(2024, 6, 14), &windows(), &records);
        assert_eq!(summary.leaders.len(), 2);

        let stocks = &summary.leaders[0];
        assert_eq!((stocks.kind, stocks.cap), (SecurityKind::Stock, Cap::Large));
        let ranked: Vec<&str> = stocks.entries.iter().map(|e| e.ticker.as_str()).collect();
        assert_eq!(ranked, ["B", "A"]);

        let etfs = &summary.leaders[1];
        assert_eq!((etfs.kind, etfs.cap), (SecurityKind::Etf, Cap::Small));
        assert_eq!(etfs.entries.len(), 1);
    }

    #[test]
    fn empty_input_gives_empty_summary() {
        let summary = analyzer(10).aggregate(date(2024, 6, 14), &windows(), &[]);
        assert!(summary.is_empty());
        assert!(summary.leaders.is_empty());
    }

    #[test]
    fn no_converged_fits_gives_empty_summary() {
        let [t1, py2] = [windows()[0], windows()[1]];
        let records = vec![record(
            "X",
            Metadata::unknown(),
            vec![failed(t1), failed(py2)],
        )];
        let summary = analyzer(10).aggregate(date(2024, 6, 14), &windows(), &records);
        assert!(summary.is_empty());
    }
}
