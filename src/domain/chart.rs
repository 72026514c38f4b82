// Chart configuration domain models
use super::filter::{Granularity, GranularityUnit};
use super::population::SeriesPoint;

pub const TRANSPARENT: &str = "rgba(0,0,0,0)";
pub const PEAK_COLOR: &str = "rgba(255, 0, 0, 0.8)";
pub const DECIMATION_SAMPLES: usize = 1000;

/// Highest point across every series of a render.
#[derive(Debug, Clone, PartialEq)]
pub struct Peak {
    pub series_index: usize,
    pub label: String,
    pub time_ms: i64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineDataset {
    pub label: String,
    pub border_color: String,
    pub background_color: String,
    pub fill: bool,
    pub border_width: u8,
    pub points: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeakAnnotation {
    pub time_ms: i64,
    pub content: String,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeAxis {
    pub unit: GranularityUnit,
    pub step: Option<u32>,
}

impl TimeAxis {
    pub fn new(granularity: &Granularity) -> Self {
        Self {
            unit: granularity.unit,
            step: granularity.step,
        }
    }
}

/// Tick label format for a granularity unit.
pub fn display_format(unit: GranularityUnit) -> &'static str {
    match unit {
        GranularityUnit::Minute | GranularityUnit::Hour => "HH:mm",
        GranularityUnit::Day | GranularityUnit::Week => "MMM d",
        GranularityUnit::Month => "MMM yyyy",
    }
}

/// Largest-triangle-three-buckets downsampling applied by the chart library.
/// Dataset points are untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decimation {
    pub samples: usize,
}

impl Default for Decimation {
    fn default() -> Self {
        Self {
            samples: DECIMATION_SAMPLES,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    pub datasets: Vec<LineDataset>,
    pub peak: Option<Peak>,
    pub annotation: Option<PeakAnnotation>,
    pub x_axis: TimeAxis,
    pub decimation: Decimation,
}

/// Format a count with thousands separators: 123456 -> "123,456".
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(123456), "123,456");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_display_format_per_unit() {
        assert_eq!(display_format(GranularityUnit::Minute), "HH:mm");
        assert_eq!(display_format(GranularityUnit::Week), "MMM d");
        assert_eq!(display_format(GranularityUnit::Month), "MMM yyyy");

        let axis = TimeAxis::new(&Granularity::minutes(5));
        assert_eq!(axis.unit, GranularityUnit::Minute);
        assert_eq!(axis.step, Some(5));
    }
}
