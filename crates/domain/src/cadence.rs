//! Sampling cadence of a price history, derived from its timestamps.

use chrono::{DateTime, NaiveDateTime};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_YEAR: i64 = 365 * SECONDS_PER_DAY;

/// Samples per day assumed when timestamps cannot establish a cadence.
pub const DEFAULT_SAMPLES_PER_DAY: u32 = 3;

/// How many samples a history carries per year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingCadence {
    samples_per_year: Decimal,
}

impl Default for SamplingCadence {
    fn default() -> Self {
        Self::from_samples_per_day(DEFAULT_SAMPLES_PER_DAY)
    }
}

impl SamplingCadence {
    #[must_use]
    pub fn from_samples_per_day(samples_per_day: u32) -> Self {
        Self {
            samples_per_year: Decimal::from(samples_per_day.max(1)) * Decimal::from(365),
        }
    }

    /// Derives the cadence from chronological timestamps using the median positive gap.
    ///
    /// Falls back to [`DEFAULT_SAMPLES_PER_DAY`] when fewer than two timestamps parse.
    #[must_use]
    pub fn from_timestamps(timestamps: &[u64]) -> Self {
        let seconds: Vec<i64> = timestamps
            .iter()
            .filter_map(|ts| parse_timestamp(*ts))
            .map(|dt| dt.and_utc().timestamp())
            .collect();

        let mut gaps: Vec<i64> = seconds
            .windows(2)
            .map(|w| w[1] - w[0])
            .filter(|gap| *gap > 0)
            .collect();
        if gaps.is_empty() {
            return Self::default();
        }
        gaps.sort_unstable();
        let median = gaps[gaps.len() / 2];

        Self {
            samples_per_year: Decimal::from(SECONDS_PER_YEAR) / Decimal::from(median),
        }
    }

    #[must_use]
    pub fn samples_per_year(&self) -> Decimal {
        self.samples_per_year
    }

    /// Whole samples per day, at least one.
    #[must_use]
    pub fn samples_per_day(&self) -> usize {
        (self.samples_per_year / Decimal::from(365))
            .round()
            .to_usize()
            .unwrap_or(DEFAULT_SAMPLES_PER_DAY as usize)
            .max(1)
    }

    /// Samples spanning `days`, rounded up so a sparse history still covers the span.
    ///
    /// Zero days is zero samples; any positive span is at least one sample.
    #[must_use]
    pub fn samples_for_days(&self, days: u32) -> usize {
        if days == 0 {
            return 0;
        }
        (self.samples_per_year * Decimal::from(days) / Decimal::from(365))
            .round_dp(9)
            .ceil()
            .to_usize()
            .unwrap_or(usize::MAX)
            .max(1)
    }
}

/// Parses a feed timestamp.
///
/// Accepts a `YYYYMMDDHHMMSS` literal, unix milliseconds (13 digits) or unix seconds.
pub fn parse_timestamp(raw: u64) -> Option<NaiveDateTime> {
    let digits = raw.to_string();
    match digits.len() {
        14 => NaiveDateTime::parse_from_str(&digits, "%Y%m%d%H%M%S").ok(),
        13 => DateTime::from_timestamp_millis(i64::try_from(raw).ok()?).map(|dt| dt.naive_utc()),
        _ => DateTime::from_timestamp(i64::try_from(raw).ok()?, 0).map(|dt| dt.naive_utc()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_literal_timestamp() {
        let dt = parse_timestamp(20240131160000).unwrap();
        assert_eq!(dt.to_string(), "2024-01-31 16:00:00");
        assert!(parse_timestamp(20241399000000).is_none());
    }

    #[test]
    fn test_cadence_from_eight_hour_literals() {
        let ts = [
            20240101000000,
            20240101080000,
            20240101160000,
            20240102000000,
            20240102080000,
        ];
        let cadence = SamplingCadence::from_timestamps(&ts);
        assert_eq!(cadence.samples_per_year(), dec!(1095));
        assert_eq!(cadence.samples_per_day(), 3);
        assert_eq!(cadence.samples_for_days(7), 21);
    }

    #[test]
    fn test_cadence_from_hourly_unix_seconds() {
        let ts: Vec<u64> = (0..48).map(|i| 1_700_000_000 + i * 3600).collect();
        let cadence = SamplingCadence::from_timestamps(&ts);
        assert_eq!(cadence.samples_per_year(), dec!(8760));
        assert_eq!(cadence.samples_per_day(), 24);
    }

    #[test]
    fn test_cadence_median_ignores_gaps() {
        // one missing sample does not change the cadence
        let ts = [
            1_700_000_000,
            1_700_086_400,
            1_700_172_800,
            1_700_345_600,
            1_700_432_000,
        ];
        assert_eq!(SamplingCadence::from_timestamps(&ts).samples_per_day(), 1);
    }

    #[test]
    fn test_weekly_cadence_window_spans_days() {
        let week = 7 * 86_400;
        let ts: Vec<u64> = (0..20).map(|i| 1_700_000_000 + i * week).collect();
        let cadence = SamplingCadence::from_timestamps(&ts);
        assert_eq!(cadence.samples_per_day(), 1);
        // 30 days of weekly samples is five readings, not thirty
        assert_eq!(cadence.samples_for_days(30), 5);
        assert_eq!(cadence.samples_for_days(7), 1);
        assert_eq!(cadence.samples_for_days(1), 1);
        assert_eq!(cadence.samples_for_days(0), 0);
    }

    #[test]
    fn test_cadence_fallback() {
        assert_eq!(SamplingCadence::from_timestamps(&[]), SamplingCadence::default());
        assert_eq!(SamplingCadence::from_timestamps(&[5, 5, 5]).samples_per_day(), 3);
    }
}
