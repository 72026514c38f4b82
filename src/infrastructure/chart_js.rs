// Mapper to convert chart domain models to the Chart.js configuration schema
use crate::domain::chart::{display_format, ChartConfig, LineDataset, PeakAnnotation};
use crate::domain::filter::GranularityUnit;
use serde_json::{json, Map, Value};

const FONT_FAMILY: &str = "RuneScape";
const GRID_COLOR: &str = "#4e453a";
const TICK_COLOR: &str = "#d4d4d4";
const LINE_TENSION: f64 = 0.25;

const ALL_UNITS: [GranularityUnit; 5] = [
    GranularityUnit::Minute,
    GranularityUnit::Hour,
    GranularityUnit::Day,
    GranularityUnit::Week,
    GranularityUnit::Month,
];

pub fn to_chart_js(config: &ChartConfig) -> Value {
    let datasets: Vec<Value> = config.datasets.iter().map(dataset_to_chart_js).collect();

    let annotations = match &config.annotation {
        Some(annotation) => json!({ "peakLine": annotation_to_chart_js(annotation) }),
        None => json!({}),
    };

    let display_formats: Map<String, Value> = ALL_UNITS
        .iter()
        .map(|unit| (unit.as_str().to_string(), json!(display_format(*unit))))
        .collect();

    let mut x_ticks = json!({ "color": TICK_COLOR, "font": { "family": FONT_FAMILY } });
    if let Some(step) = config.x_axis.step {
        x_ticks["stepSize"] = json!(step);
    }

    json!({
        "type": "line",
        "data": { "datasets": datasets },
        "options": {
            "responsive": true,
            "interaction": { "intersect": false, "mode": "index" },
            "plugins": {
                "decimation": {
                    "enabled": true,
                    "algorithm": "lttb",
                    "samples": config.decimation.samples,
                },
                "zoom": {
                    "pan": { "enabled": true, "mode": "x" },
                    "zoom": {
                        "wheel": { "enabled": true },
                        "pinch": { "enabled": true },
                        "mode": "x",
                    },
                },
                "annotation": { "annotations": annotations },
                "tooltip": {
                    "backgroundColor": "#5b4a3c",
                    "titleColor": "#ff981f",
                    "bodyColor": "#ffff00",
                    "borderColor": "#383023",
                    "borderWidth": 2,
                    "titleFont": { "family": FONT_FAMILY },
                    "bodyFont": { "family": FONT_FAMILY },
                },
            },
            "scales": {
                "x": {
                    "type": "time",
                    "time": {
                        "unit": config.x_axis.unit.as_str(),
                        "tooltipFormat": "DD T",
                        "displayFormats": display_formats,
                    },
                    "grid": { "color": GRID_COLOR },
                    "ticks": x_ticks,
                },
                "y": {
                    "beginAtZero": true,
                    "grid": { "color": GRID_COLOR },
                    "ticks": { "color": TICK_COLOR, "font": { "family": FONT_FAMILY } },
                },
            },
        },
    })
}

fn dataset_to_chart_js(dataset: &LineDataset) -> Value {
    let data: Vec<Value> = dataset
        .points
        .iter()
        .map(|p| json!({ "x": p.time_ms, "y": p.value }))
        .collect();

    json!({
        "label": dataset.label,
        "data": data,
        "borderColor": dataset.border_color,
        "backgroundColor": dataset.background_color,
        "borderWidth": dataset.border_width,
        "pointRadius": 0,
        "fill": dataset.fill,
        "tension": LINE_TENSION,
    })
}

fn annotation_to_chart_js(annotation: &PeakAnnotation) -> Value {
    json!({
        "type": "line",
        "xMin": annotation.time_ms,
        "xMax": annotation.time_ms,
        "borderColor": annotation.color,
        "borderWidth": 2,
        "borderDash": [5, 5],
        "label": {
            "display": true,
            "content": annotation.content,
            "position": "20%",
            "backgroundColor": annotation.color,
            "color": "white",
            "font": { "size": 12, "family": FONT_FAMILY },
        },
    })
}
