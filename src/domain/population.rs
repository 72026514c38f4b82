// Population data domain models
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

const DEFAULT_BORDER_WIDTH: u8 = 2;

/// One observation of the online player count, as returned by `/api/history`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Sample {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_count")]
    pub count: u64,
}

impl Sample {
    #[cfg(test)]
    pub fn new(timestamp: DateTime<Utc>, count: u64) -> Self {
        Self { timestamp, count }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub time_ms: i64,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(time_ms: i64, value: f64) -> Self {
        Self { time_ms, value }
    }
}

impl From<&Sample> for SeriesPoint {
    fn from(sample: &Sample) -> Self {
        Self::new(sample.timestamp.timestamp_millis(), sample.count as f64)
    }
}

/// A named line ready for rendering. Points keep the order the server sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub color: String,
    pub fill_color: Option<String>,
    pub border_width: u8,
    pub points: Vec<SeriesPoint>,
}

impl Series {
    pub fn new(label: String, color: String, points: Vec<SeriesPoint>) -> Self {
        Self {
            label,
            color,
            fill_color: None,
            border_width: DEFAULT_BORDER_WIDTH,
            points,
        }
    }

    pub fn from_samples(label: impl Into<String>, color: impl Into<String>, samples: &[Sample]) -> Self {
        let points = samples.iter().map(SeriesPoint::from).collect();
        Self::new(label.into(), color.into(), points)
    }

    pub fn with_fill(mut self, fill_color: impl Into<String>) -> Self {
        self.fill_color = Some(fill_color.into());
        self
    }

    pub fn with_border_width(mut self, border_width: u8) -> Self {
        self.border_width = border_width;
        self
    }
}

/// Payload of `/api/latest`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LatestSnapshot {
    #[serde(deserialize_with = "deserialize_count")]
    pub count: u64,
    #[serde(default)]
    pub f2p_count: Option<u64>,
    #[serde(default)]
    pub members_count: Option<u64>,
    #[serde(default)]
    pub breakdown_timestamp: Option<String>,
    pub timestamp: String,
}

impl LatestSnapshot {
    /// Both halves of the membership split, when the server sent them.
    pub fn breakdown(&self) -> Option<(u64, u64)> {
        match (self.f2p_count, self.members_count) {
            (Some(f2p), Some(members)) => Some((f2p, members)),
            _ => None,
        }
    }
}

/// Parse the timestamp shapes the history endpoint emits.
///
/// Depending on the aggregation unit the server returns RFC 3339, naive ISO
/// date-times, SQL `YYYY-MM-DD HH:MM:SS` strings or bare dates. Values without
/// an offset are UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    let naive = raw.trim_end_matches('Z');
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(ts.and_utc());
        }
    }

    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognized timestamp: {}", raw)))
}

// `agg=avg` comes back as ROUND(AVG(...)), which is a float on the wire.
fn deserialize_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() || value < 0.0 {
        return Err(serde::de::Error::custom(format!("invalid player count: {}", value)));
    }
    Ok(value.round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timestamp_shapes() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();

        assert_eq!(parse_timestamp("2024-05-01T10:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01T10:00:00+00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01T10:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01T10:00:00.000000"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01 10:00:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-05-01"),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_sample_accepts_float_counts() {
        let samples: Vec<Sample> = serde_json::from_str(
            r#"[{"timestamp":"2024-05-01T10:00:00Z","count":120345},
                {"timestamp":"2024-05-01T11:00:00Z","count":120411.0}]"#,
        )
        .unwrap();

        assert_eq!(samples[0].count, 120345);
        assert_eq!(samples[1].count, 120411);
    }

    #[test]
    fn test_sample_rejects_negative_count() {
        let result: Result<Sample, _> =
            serde_json::from_str(r#"{"timestamp":"2024-05-01T10:00:00Z","count":-4}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_series_from_samples_keeps_order() {
        let samples = vec![
            Sample::new(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(), 10),
            Sample::new(Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap(), 12),
        ];
        let series = Series::from_samples("Online Players", "#ffff00", &samples);

        assert_eq!(series.points.len(), 2);
        assert_eq!(series.points[0].value, 10.0);
        assert_eq!(series.points[1].time_ms, samples[1].timestamp.timestamp_millis());
        assert_eq!(series.fill_color, None);
        assert_eq!(series.border_width, 2);
    }

    #[test]
    fn test_latest_breakdown_requires_both_counts() {
        let full: LatestSnapshot = serde_json::from_str(
            r#"{"count":100,"f2p_count":30,"members_count":70,"timestamp":"2024-05-01T10:00:00"}"#,
        )
        .unwrap();
        assert_eq!(full.breakdown(), Some((30, 70)));

        let partial: LatestSnapshot =
            serde_json::from_str(r#"{"count":100,"f2p_count":30,"timestamp":"2024-05-01T10:00:00"}"#)
                .unwrap();
        assert_eq!(partial.breakdown(), None);
    }
}
