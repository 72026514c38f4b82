// Chart renderer - Turns series into a line chart configuration
use crate::domain::chart::{
    format_count, ChartConfig, Decimation, LineDataset, Peak, PeakAnnotation, TimeAxis, PEAK_COLOR,
    TRANSPARENT,
};
use crate::domain::filter::Granularity;
use crate::domain::population::Series;

/// Find the highest point across all series.
///
/// Scans series in order, then points in order; the first maximum wins.
pub fn find_peak(series: &[Series]) -> Option<Peak> {
    let mut peak: Option<Peak> = None;

    for (series_index, s) in series.iter().enumerate() {
        for point in &s.points {
            let is_higher = peak.as_ref().is_none_or(|p| point.value > p.value);
            if is_higher {
                peak = Some(Peak {
                    series_index,
                    label: s.label.clone(),
                    time_ms: point.time_ms,
                    value: point.value,
                });
            }
        }
    }

    peak
}

pub fn render(series: &[Series], granularity: &Granularity) -> ChartConfig {
    let peak = find_peak(series);
    let annotation = peak.as_ref().map(|p| PeakAnnotation {
        time_ms: p.time_ms,
        content: format!("Peak: {}", format_count(p.value.round() as u64)),
        color: PEAK_COLOR.to_string(),
    });

    if let Some(p) = &peak {
        tracing::debug!("Peak {} on {:?} at {}", p.value, p.label, p.time_ms);
    }

    ChartConfig {
        datasets: series.iter().map(to_dataset).collect(),
        peak,
        annotation,
        x_axis: TimeAxis::new(granularity),
        decimation: Decimation::default(),
    }
}

fn to_dataset(series: &Series) -> LineDataset {
    LineDataset {
        label: series.label.clone(),
        border_color: series.color.clone(),
        background_color: series
            .fill_color
            .clone()
            .unwrap_or_else(|| TRANSPARENT.to_string()),
        fill: series.fill_color.is_some(),
        border_width: series.border_width,
        points: series.points.clone(),
    }
}
