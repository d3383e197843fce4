use crate::stats::GroupStats;
use chrono::NaiveDate;
use core_types::{Cap, Label, Metadata, SecurityKind, Window, WindowLabel};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A metadata partition used for ranking. `All` contains every security.
///
/// Unknown metadata values are groups of their own (`Cap(Cap::Unknown)`,
/// `Category(Label::Unknown)`, ...), never dropped.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "dimension", content = "value", rename_all = "lowercase")]
pub enum GroupKey {
    All,
    Kind(SecurityKind),
    Cap(Cap),
    Category(Label),
    Family(Label),
}

impl GroupKey {
    /// The groups a security with `metadata` belongs to: exactly one per dimension.
    pub fn memberships(metadata: &Metadata) -> [GroupKey; 5] {
        [
            GroupKey::All,
            GroupKey::Kind(metadata.kind),
            GroupKey::Cap(metadata.cap),
            GroupKey::Category(metadata.category.clone()),
            GroupKey::Family(metadata.family.clone()),
        ]
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::All => f.write_str("ALL"),
            GroupKey::Kind(kind) => write!(f, "kind:{kind}"),
            GroupKey::Cap(cap) => write!(f, "cap:{cap}"),
            GroupKey::Category(label) => write!(f, "category:{label}"),
            GroupKey::Family(label) => write!(f, "family:{label}"),
        }
    }
}

/// One security's converged fit within a ranked group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub ticker: String,
    pub b: f64,
    pub r_squared: f64,
    pub trend_slope: Option<f64>,
    pub realized: Option<f64>,
}

/// A group's securities, best growth first, with the group's statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRanking {
    pub group: GroupKey,
    pub entries: Vec<RankedEntry>,
    pub stats: GroupStats,
}

/// Every non-empty group for one window, in `GroupKey` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowRanking {
    pub window: Window,
    pub groups: Vec<GroupRanking>,
}

impl WindowRanking {
    pub fn group(&self, key: &GroupKey) -> Option<&GroupRanking> {
        self.groups.iter().find(|g| &g.group == key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderEntry {
    pub ticker: String,
    /// Realized annualized growth over the trailing year.
    pub realized: f64,
    pub category: Label,
}

/// Top performers of one (kind, cap) bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub kind: SecurityKind,
    pub cap: Cap,
    pub entries: Vec<LeaderEntry>,
}

/// The output of aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSummary {
    pub as_of: NaiveDate,
    pub windows: Vec<WindowRanking>,
    pub leaders: Vec<Leaderboard>,
}

impl RankedSummary {
    /// True when no security contributed to any window or leaderboard.
    pub fn is_empty(&self) -> bool {
        self.windows.iter().all(|w| w.groups.is_empty()) && self.leaders.is_empty()
    }

    pub fn window(&self, label: WindowLabel) -> Option<&WindowRanking> {
        self.windows.iter().find(|w| w.window.label == label)
    }
}
