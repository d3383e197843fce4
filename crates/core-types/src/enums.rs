use serde::{Deserialize, Serialize};
use std::fmt;

/// The text written for any unmapped metadata value.
pub const UNKNOWN: &str = "UNKNOWN";

/// Market-capitalization (or net-assets) bucket of a security.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cap {
    Large,
    Mid,
    Small,
    #[serde(alias = "UNKNOWN")]
    Unknown,
}

impl Cap {
    /// Upper bound (exclusive) of the small-cap bucket.
    pub const SMALL_CEILING: f64 = 2_000_000_000.0;
    /// Upper bound (exclusive) of the mid-cap bucket.
    pub const MID_CEILING: f64 = 10_000_000_000.0;

    /// Buckets net assets or market capitalization.
    ///
    /// Unknown, negative, or non-finite assets map to `Cap::Unknown`.
    pub fn from_assets(assets: Option<f64>) -> Self {
        match assets {
            Some(value) if value.is_finite() && value >= 0.0 => {
                if value < Self::SMALL_CEILING {
                    Cap::Small
                } else if value < Self::MID_CEILING {
                    Cap::Mid
                } else {
                    Cap::Large
                }
            }
            _ => Cap::Unknown,
        }
    }
}

impl fmt::Display for Cap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Cap::Large => "large",
            Cap::Mid => "mid",
            Cap::Small => "small",
            Cap::Unknown => UNKNOWN,
        };
        f.write_str(name)
    }
}

/// The kind of instrument a ticker represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityKind {
    Stock,
    Etf,
    #[serde(alias = "mutual_fund")]
    Fund,
    #[serde(alias = "UNKNOWN")]
    Unknown,
}

impl fmt::Display for SecurityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SecurityKind::Stock => "stock",
            SecurityKind::Etf => "etf",
            SecurityKind::Fund => "fund",
            SecurityKind::Unknown => UNKNOWN,
        };
        f.write_str(name)
    }
}

/// Identifies one of the analysis windows generated for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WindowLabel {
    Trailing1Y,
    Trailing2Y,
    Trailing3Y,
    PriorYear2,
    PriorYear3,
}

impl WindowLabel {
    /// Every label, in the order windows are generated and reported.
    pub const ALL: [WindowLabel; 5] = [
        WindowLabel::Trailing1Y,
        WindowLabel::Trailing2Y,
        WindowLabel::Trailing3Y,
        WindowLabel::PriorYear2,
        WindowLabel::PriorYear3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WindowLabel::Trailing1Y => "Trailing1Y",
            WindowLabel::Trailing2Y => "Trailing2Y",
            WindowLabel::Trailing3Y => "Trailing3Y",
            WindowLabel::PriorYear2 => "PriorYear2",
            WindowLabel::PriorYear3 => "PriorYear3",
        }
    }

    /// Number of calendar years a trailing window reaches back, if it is one.
    pub fn trailing_years(&self) -> Option<u32> {
        match self {
            WindowLabel::Trailing1Y => Some(1),
            WindowLabel::Trailing2Y => Some(2),
            WindowLabel::Trailing3Y => Some(3),
            WindowLabel::PriorYear2 | WindowLabel::PriorYear3 => None,
        }
    }
}

impl fmt::Display for WindowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metadata value that is either a mapped name or explicitly unknown.
///
/// Serialized as a plain string, with `Unknown` written as `"UNKNOWN"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Label {
    Known(String),
    Unknown,
}

impl Label {
    /// Interprets a raw collected value.
    ///
    /// Blank strings, `"--"`, and `"UNKNOWN"` (any case) are all unknown.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "--" || trimmed.eq_ignore_ascii_case(UNKNOWN) {
            Label::Unknown
        } else {
            Label::Known(trimmed.to_string())
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Label::Unknown)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Label::Known(name) => name,
            Label::Unknown => UNKNOWN,
        }
    }
}

impl From<String> for Label {
    fn from(raw: String) -> Self {
        Label::from_raw(&raw)
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        match label {
            Label::Known(name) => name,
            Label::Unknown => UNKNOWN.to_string(),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cap_thresholds() {
        assert_eq!(Cap::from_assets(None), Cap::Unknown);
        assert_eq!(Cap::from_assets(Some(-1.0)), Cap::Unknown);
        assert_eq!(Cap::from_assets(Some(0.0)), Cap::Small);
        assert_eq!(Cap::from_assets(Some(1_999_999_999.0)), Cap::Small);
        assert_eq!(Cap::from_assets(Some(2_000_000_000.0)), Cap::Mid);
        assert_eq!(Cap::from_assets(Some(10_000_000_000.0)), Cap::Large);
        assert_eq!(Cap::from_assets(Some(f64::NAN)), Cap::Unknown);
    }

    #[test]
    fn raw_labels_map_sentinels_to_unknown() {
        assert_eq!(Label::from_raw(""), Label::Unknown);
        assert_eq!(Label::from_raw("  --  "), Label::Unknown);
        assert_eq!(Label::from_raw("unknown"), Label::Unknown);
        assert_eq!(
            Label::from_raw(" Large Growth "),
            Label::Known("Large Growth".to_string())
        );
    }

    #[test]
    fn label_serializes_as_plain_string() {
        let json = serde_json::to_string(&Label::Unknown).unwrap();
        assert_eq!(json, "\"UNKNOWN\"");
        let parsed: Label = serde_json::from_str("\"Technology\"").unwrap();
        assert_eq!(parsed, Label::Known("Technology".to_string()));
    }

    #[test]
    fn cap_accepts_upper_case_sentinel() {
        let cap: Cap = serde_json::from_str("\"UNKNOWN\"").unwrap();
        assert_eq!(cap, Cap::Unknown);
    }
}
