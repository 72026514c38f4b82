// Console rendering of the dashboard view state
use crate::application::dashboard_session::{ControlState, ViewState};
use crate::domain::metadata::Metadata;
use crate::domain::population::Sample;

const HISTORY_TAIL: usize = 5;

/// Text block for the headline, breakdown and status lines.
pub fn format_view(view: &ViewState) -> String {
    let mut lines = vec![format!("Players online: {}", view.player_count)];

    if let Some(breakdown) = &view.breakdown {
        lines.push(format!(
            "  Free-to-Play: {}  Members: {}",
            breakdown.f2p, breakdown.members
        ));
        if let Some(updated) = &breakdown.updated {
            lines.push(format!("  {}", updated));
        }
    }
    if let Some(last_updated) = &view.last_updated {
        lines.push(last_updated.clone());
    }
    lines.push(view.timezone_label.clone());
    if let Some(error) = &view.error_banner {
        lines.push(format!("Error: {}", error));
    }

    lines.join("\n")
}

pub fn print_view(view: &ViewState) {
    println!("{}", format_view(view));
}

pub fn print_filter_options(metadata: &Metadata) {
    let worlds: Vec<String> = metadata.world_options().into_iter().map(|w| w.name).collect();
    let locations: Vec<&str> = metadata.locations.iter().map(|l| l.name.as_str()).collect();

    let activities: Vec<String> = metadata
        .activities
        .iter()
        .map(|a| format!("{} ({})", a.description, a.id))
        .collect();

    println!("Worlds: {}", worlds.join(", "));
    println!("Locations: {}", locations.join(", "));
    if !activities.is_empty() {
        println!("Activities: {}", activities.join(", "));
    }
}

/// One line per control value plus whether a chart is currently drawn.
pub fn format_controls(controls: &ControlState, chart_live: bool) -> String {
    let or_all = |value: Option<String>| value.unwrap_or_else(|| "all".to_string());
    let membership = match controls.is_f2p {
        Some(true) => "f2p",
        Some(false) => "members",
        None => "all",
    };
    let minute_note = if controls.minute_granularity_enabled {
        ""
    } else {
        " (minute buckets unavailable for this range)"
    };

    [
        format!("Preset: {}", controls.preset),
        format!(
            "Range: {} .. {}",
            or_all(controls.start.map(|ts| ts.format("%Y-%m-%dT%H:%M").to_string())),
            or_all(controls.end.map(|ts| ts.format("%Y-%m-%dT%H:%M").to_string()))
        ),
        format!("Granularity: {}{}", controls.granularity, minute_note),
        format!("Aggregation: {}", controls.aggregation),
        format!("World: {}", or_all(controls.world_id.map(|id| id.to_string()))),
        format!("Location: {}", or_all(controls.location_id.map(|id| id.to_string()))),
        format!("Membership: {}", membership),
        format!("Compare: {}", controls.compare),
        format!("Chart: {}", if chart_live { "drawn" } else { "none" }),
    ]
    .join("\n")
}

pub fn print_controls(controls: &ControlState, chart_live: bool) {
    println!("{}", format_controls(controls, chart_live));
}

/// Size of the last raw history response and its most recent samples.
pub fn format_history(samples: &[Sample]) -> String {
    let mut lines = vec![format!("Last history response: {} samples", samples.len())];
    let tail = samples.len().saturating_sub(HISTORY_TAIL);
    for sample in &samples[tail..] {
        lines.push(format!("  {}  {}", sample.timestamp.to_rfc3339(), sample.count));
    }
    lines.join("\n")
}

pub fn print_history(samples: &[Sample]) {
    println!("{}", format_history(samples));
}
