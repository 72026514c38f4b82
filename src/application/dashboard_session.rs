// Dashboard session - Control surface state and the render cycle it drives
use crate::application::chart_renderer::render;
use crate::application::chart_surface::{ChartSlot, ChartSurface};
use crate::application::comparison_service::ComparisonService;
use crate::application::population_repository::PopulationRepository;
use crate::domain::chart::format_count;
use crate::domain::filter::{CompareMode, FilterDescriptor, Granularity};
use crate::domain::metadata::Metadata;
use crate::domain::population::{parse_timestamp, LatestSnapshot, Sample};
use crate::domain::preset::{minute_granularity_allowed, RangePreset};
use crate::infrastructure::config::ViewDefaults;
use chrono::{DateTime, Local, Utc};
use std::sync::Arc;

pub const OFFLINE: &str = "Offline";
const FALLBACK_ERROR: &str = "Failed to load data";

/// A change on one of the dashboard controls.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    Apply,
    PresetSelected(RangePreset),
    GranularitySelected(Granularity),
    AggregationSelected(String),
    WorldSelected(Option<u32>),
    LocationSelected(Option<i64>),
    MembershipSelected(Option<bool>),
    CompareSelected(CompareMode),
    StartEdited(Option<DateTime<Local>>),
    EndEdited(Option<DateTime<Local>>),
    ResetZoom,
    RefreshTick,
}

/// Current values of the form controls.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlState {
    pub preset: RangePreset,
    pub start: Option<DateTime<Local>>,
    pub end: Option<DateTime<Local>>,
    pub granularity: Granularity,
    pub minute_granularity_enabled: bool,
    pub aggregation: String,
    pub world_id: Option<u32>,
    pub location_id: Option<i64>,
    pub is_f2p: Option<bool>,
    pub compare: CompareMode,
}

impl ControlState {
    pub fn from_defaults(defaults: &ViewDefaults) -> Self {
        let preset = RangePreset::parse(&defaults.preset).unwrap_or_else(|| {
            tracing::warn!("Unknown preset {:?}, using last 7 days", defaults.preset);
            RangePreset::default()
        });
        let granularity = Granularity::parse(&defaults.granularity).unwrap_or_else(|| {
            tracing::warn!("Unknown granularity {:?}, using hour", defaults.granularity);
            Granularity::default()
        });

        Self {
            preset,
            granularity,
            aggregation: defaults.aggregation.clone(),
            compare: CompareMode::parse(&defaults.compare),
            ..Self::default()
        }
    }

    /// Request descriptor for the current control values.
    pub fn descriptor(&self) -> FilterDescriptor {
        FilterDescriptor {
            start: self.start.map(|ts| ts.with_timezone(&Utc)),
            end: self.end.map(|ts| ts.with_timezone(&Utc)),
            aggregation: Some(self.aggregation.clone()),
            world_id: self.world_id,
            location_id: self.location_id,
            is_f2p: self.is_f2p,
            ..FilterDescriptor::new(self.granularity)
        }
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            preset: RangePreset::default(),
            start: None,
            end: None,
            granularity: Granularity::default(),
            minute_granularity_enabled: true,
            aggregation: "max".to_string(),
            world_id: None,
            location_id: None,
            is_f2p: None,
            compare: CompareMode::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Breakdown {
    pub f2p: String,
    pub members: String,
    pub updated: Option<String>,
}

/// Everything the page shows besides the chart itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub player_count: String,
    pub breakdown: Option<Breakdown>,
    pub last_updated: Option<String>,
    pub error_banner: Option<String>,
    pub loading: bool,
    pub controls_enabled: bool,
    pub timezone_label: String,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            player_count: "...".to_string(),
            breakdown: None,
            last_updated: None,
            error_banner: None,
            loading: false,
            controls_enabled: true,
            timezone_label: format!("Times shown in: UTC{}", Local::now().format("%:z")),
        }
    }
}

impl ViewState {
    fn show_latest(&mut self, latest: &LatestSnapshot) {
        self.player_count = format_count(latest.count);

        if let Some((f2p, members)) = latest.breakdown() {
            let updated = latest
                .breakdown_timestamp
                .as_deref()
                .and_then(parse_timestamp)
                .map(|ts| format!("(Breakdown updated: {})", format_local(ts)));
            self.breakdown = Some(Breakdown {
                f2p: format_count(f2p),
                members: format_count(members),
                updated,
            });
        }

        let shown = parse_timestamp(&latest.timestamp)
            .map(format_local)
            .unwrap_or_else(|| latest.timestamp.clone());
        self.last_updated = Some(format!("Last updated: {}", shown));
    }
}

/// Session-scoped dashboard context: created at startup, fed control events,
/// dropped on shutdown.
pub struct DashboardSession<S: ChartSurface> {
    repository: Arc<dyn PopulationRepository>,
    comparison: ComparisonService,
    metadata: Metadata,
    controls: ControlState,
    view: ViewState,
    chart: ChartSlot<S>,
}

impl<S: ChartSurface> DashboardSession<S> {
    pub fn new(repository: Arc<dyn PopulationRepository>, surface: S, controls: ControlState) -> Self {
        Self {
            comparison: ComparisonService::new(repository.clone()),
            repository,
            metadata: Metadata::default(),
            controls,
            view: ViewState::default(),
            chart: ChartSlot::new(surface),
        }
    }

    pub fn controls(&self) -> &ControlState {
        &self.controls
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn chart(&self) -> &ChartSlot<S> {
        &self.chart
    }

    pub fn last_raw_history(&self) -> Vec<Sample> {
        self.comparison.last_raw_history()
    }

    /// Apply the default range, load metadata and the latest count, then
    /// draw the first chart.
    pub async fn initialize(&mut self) {
        self.apply_preset();
        self.update_granularity_availability();

        match self.repository.fetch_metadata().await {
            Ok(metadata) => {
                tracing::info!(
                    "Loaded metadata: {} worlds, {} locations",
                    metadata.worlds.len(),
                    metadata.locations.len()
                );
                self.metadata = metadata;
            }
            Err(e) => tracing::warn!("Error fetching metadata: {}", e),
        }

        self.refresh_latest().await;
        self.update_chart().await;
    }

    pub async fn handle(&mut self, event: ControlEvent) {
        tracing::debug!("Control event: {:?}", event);

        match event {
            ControlEvent::Apply => self.update_chart().await,
            ControlEvent::PresetSelected(preset) => {
                self.controls.preset = preset;
                self.apply_preset();
                self.update_granularity_availability();
                self.update_chart().await;
            }
            ControlEvent::GranularitySelected(granularity) => {
                self.controls.granularity = granularity;
                self.update_granularity_availability();
                self.update_chart().await;
            }
            ControlEvent::AggregationSelected(aggregation) => {
                self.controls.aggregation = aggregation;
                self.update_chart().await;
            }
            ControlEvent::WorldSelected(world_id) => {
                self.controls.world_id = world_id;
                // A single world already pins location and membership.
                if world_id.is_some() {
                    self.controls.location_id = None;
                    self.controls.is_f2p = None;
                    self.controls.compare = CompareMode::None;
                }
                self.update_chart().await;
            }
            ControlEvent::LocationSelected(location_id) => {
                self.controls.location_id = location_id;
                self.update_chart().await;
            }
            ControlEvent::MembershipSelected(is_f2p) => {
                self.controls.is_f2p = is_f2p;
                self.update_chart().await;
            }
            ControlEvent::CompareSelected(compare) => {
                self.controls.compare = compare;
                self.update_chart().await;
            }
            ControlEvent::StartEdited(start) => {
                self.controls.start = start;
                self.controls.preset = RangePreset::Custom;
                self.update_granularity_availability();
            }
            ControlEvent::EndEdited(end) => {
                self.controls.end = end;
                self.controls.preset = RangePreset::Custom;
                self.update_granularity_availability();
            }
            ControlEvent::ResetZoom => self.chart.reset_zoom(),
            ControlEvent::RefreshTick => {
                self.refresh_latest().await;
                // Presets follow "now"; a custom range stays put.
                if !self.controls.preset.is_custom() {
                    self.apply_preset();
                    self.update_granularity_availability();
                    self.update_chart().await;
                }
            }
        }
    }

    async fn refresh_latest(&mut self) {
        match self.repository.fetch_latest().await {
            Ok(latest) => self.view.show_latest(&latest),
            Err(e) => {
                tracing::warn!("Error fetching latest: {}", e);
                self.view.player_count = OFFLINE.to_string();
            }
        }
    }

    async fn update_chart(&mut self) {
        self.view.controls_enabled = false;
        self.view.loading = true;
        self.view.error_banner = None;

        let mode = self.controls.compare.clone();
        let descriptor = self.controls.descriptor();

        let outcome = match self
            .comparison
            .build_datasets(&mode, &descriptor, &self.metadata)
            .await
        {
            Ok(series) => {
                let config = render(&series, &descriptor.granularity);
                self.chart.replace(&config).map_err(|e| e.to_string())
            }
            Err(e) => Err(e.to_string()),
        };

        if let Err(message) = outcome {
            tracing::error!("Update failed: {}", message);
            let message = if message.is_empty() {
                FALLBACK_ERROR.to_string()
            } else {
                message
            };
            self.view.error_banner = Some(message);
        }

        self.view.loading = false;
        self.view.controls_enabled = true;
    }

    fn apply_preset(&mut self) {
        if let Some((start, end)) = self.controls.preset.range(Local::now()) {
            self.controls.start = Some(start);
            self.controls.end = Some(end);
        }
    }

    fn update_granularity_availability(&mut self) {
        let allowed =
            minute_granularity_allowed(self.controls.start.as_ref(), self.controls.end.as_ref());
        self.controls.minute_granularity_enabled = allowed;

        if !allowed && self.controls.granularity.is_minute() {
            tracing::debug!("Range exceeds minute limit, switching to hourly buckets");
            self.controls.granularity = Granularity::default();
        }
    }
}

fn format_local(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local)
        .format("%b %-d, %Y, %I:%M:%S %p UTC%:z")
        .to_string()
}
