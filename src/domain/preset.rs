// Quick range presets and granularity availability rules
use chrono::{DateTime, Months, TimeDelta, TimeZone, Timelike};
use std::fmt;

/// Longest range that may still be requested at minute granularity.
pub const MAX_MINUTE_RANGE_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePreset {
    Hours(u32),
    Months(u32),
    Years(u32),
    Custom,
}

impl RangePreset {
    /// Map a preset control value: `3h 6h 12h 24h 7d 30d 6m 1y 5y 10y custom`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "3h" => Some(RangePreset::Hours(3)),
            "6h" => Some(RangePreset::Hours(6)),
            "12h" => Some(RangePreset::Hours(12)),
            "24h" => Some(RangePreset::Hours(24)),
            "7d" => Some(RangePreset::Hours(24 * 7)),
            "30d" => Some(RangePreset::Hours(24 * 30)),
            "6m" => Some(RangePreset::Months(6)),
            "1y" => Some(RangePreset::Years(1)),
            "5y" => Some(RangePreset::Years(5)),
            "10y" => Some(RangePreset::Years(10)),
            "custom" => Some(RangePreset::Custom),
            _ => None,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, RangePreset::Custom)
    }

    /// Start and end of the preset window ending at `now`, at minute precision.
    /// Month and year presets step back by calendar months.
    pub fn range<Tz: TimeZone>(&self, now: DateTime<Tz>) -> Option<(DateTime<Tz>, DateTime<Tz>)> {
        let end = truncate_to_minute(now)?;
        let start = match *self {
            RangePreset::Hours(hours) => end.clone() - TimeDelta::hours(i64::from(hours)),
            RangePreset::Months(months) => end.clone().checked_sub_months(Months::new(months))?,
            RangePreset::Years(years) => end.clone().checked_sub_months(Months::new(years * 12))?,
            RangePreset::Custom => return None,
        };
        Some((start, end))
    }
}

impl Default for RangePreset {
    fn default() -> Self {
        RangePreset::Hours(24 * 7)
    }
}

impl fmt::Display for RangePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            RangePreset::Hours(hours) if hours % 24 == 0 && hours > 24 => write!(f, "{}d", hours / 24),
            RangePreset::Hours(hours) => write!(f, "{}h", hours),
            RangePreset::Months(months) => write!(f, "{}m", months),
            RangePreset::Years(years) => write!(f, "{}y", years),
            RangePreset::Custom => f.write_str("custom"),
        }
    }
}

/// Minute buckets are only offered when the range is open-ended or spans at
/// most thirty days.
pub fn minute_granularity_allowed<Tz: TimeZone>(
    start: Option<&DateTime<Tz>>,
    end: Option<&DateTime<Tz>>,
) -> bool {
    match (start, end) {
        (Some(start), Some(end)) => {
            end.clone().signed_duration_since(start.clone()) <= TimeDelta::days(MAX_MINUTE_RANGE_DAYS)
        }
        _ => true,
    }
}

fn truncate_to_minute<Tz: TimeZone>(ts: DateTime<Tz>) -> Option<DateTime<Tz>> {
    ts.with_second(0)?.with_nanosecond(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_parse_round_trips_control_values() {
        for value in ["3h", "6h", "12h", "24h", "7d", "30d", "6m", "1y", "5y", "10y", "custom"] {
            let preset = RangePreset::parse(value).unwrap();
            assert_eq!(preset.to_string(), value);
        }
        assert_eq!(RangePreset::parse("2w"), None);
    }

    #[test]
    fn test_hour_presets_drop_seconds() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 30, 45).unwrap();
        let (start, end) = RangePreset::parse("7d").unwrap().range(now).unwrap();

        assert_eq!(end, Utc.with_ymd_and_hms(2024, 5, 10, 12, 30, 0).unwrap());
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 5, 3, 12, 30, 0).unwrap());
    }

    #[test]
    fn test_month_and_year_presets_use_calendar() {
        let now = Utc.with_ymd_and_hms(2024, 8, 15, 9, 0, 0).unwrap();

        let (start, _) = RangePreset::Months(6).range(now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 2, 15, 9, 0, 0).unwrap());

        let (start, _) = RangePreset::Years(5).range(now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2019, 8, 15, 9, 0, 0).unwrap());

        assert!(RangePreset::Custom.range(now).is_none());
    }

    #[test]
    fn test_minute_granularity_window() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let exactly = start + TimeDelta::days(30);
        let over = exactly + TimeDelta::minutes(1);

        assert!(minute_granularity_allowed(Some(&start), Some(&exactly)));
        assert!(!minute_granularity_allowed(Some(&start), Some(&over)));
        assert!(minute_granularity_allowed(Some(&start), None));
        assert!(minute_granularity_allowed::<Utc>(None, None));
    }
}
