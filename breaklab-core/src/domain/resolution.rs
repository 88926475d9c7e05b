//! Time resolutions and calendar-aligned period bucketing.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named time granularity for bars.
///
/// `Min5` is the default base resolution of the feed; the rest are derived
/// from it by the aggregator. Period boundaries are aligned to calendar
/// units in UTC (quarter-hours, hours, four-hour blocks, days).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    #[serde(rename = "5m")]
    Min5,
    #[serde(rename = "15m")]
    Min15,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "1d")]
    Day1,
}

impl Resolution {
    /// Width of one period in seconds.
    pub fn as_secs(&self) -> i64 {
        match self {
            Resolution::Min5 => 300,
            Resolution::Min15 => 900,
            Resolution::Hour1 => 3_600,
            Resolution::Hour4 => 14_400,
            Resolution::Day1 => 86_400,
        }
    }

    /// Index of the period containing `ts`, counted from the unix epoch.
    ///
    /// The epoch is aligned to midnight UTC, so integer division yields
    /// calendar-aligned buckets for every supported width.
    pub fn period_index(&self, ts: DateTime<Utc>) -> i64 {
        ts.timestamp().div_euclid(self.as_secs())
    }

    /// Start instant of the period with the given index.
    pub fn period_start(&self, index: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(index * self.as_secs(), 0).unwrap()
    }

    /// All resolutions coarser than the 5-minute base.
    pub fn coarser() -> &'static [Resolution] {
        &[
            Resolution::Min15,
            Resolution::Hour1,
            Resolution::Hour4,
            Resolution::Day1,
        ]
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Resolution::Min5 => "5m",
            Resolution::Min15 => "15m",
            Resolution::Hour1 => "1h",
            Resolution::Hour4 => "4h",
            Resolution::Day1 => "1d",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "5m" | "5min" => Ok(Resolution::Min5),
            "15m" | "15min" => Ok(Resolution::Min15),
            "1h" | "h1" | "hour" => Ok(Resolution::Hour1),
            "4h" | "h4" => Ok(Resolution::Hour4),
            "1d" | "d1" | "day" | "daily" => Ok(Resolution::Day1),
            _ => Err(format!("unknown resolution: {}", s)),
        }
    }
}
