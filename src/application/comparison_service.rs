// Comparison service - Fans history requests out per compare mode
use crate::application::population_repository::{PopulationRepository, RequestError};
use crate::domain::filter::{CompareMode, FilterDescriptor};
use crate::domain::metadata::{Location, Metadata, World};
use crate::domain::population::{Sample, Series};
use futures::future::{join, join_all};
use std::sync::{Arc, RwLock};

pub const ONLINE_PLAYERS_LABEL: &str = "Online Players";
pub const FREE_TO_PLAY_LABEL: &str = "Free-to-Play";
pub const MEMBERS_LABEL: &str = "Members";

const GOLD: &str = "#ffff00";
const GOLD_FILL: &str = "rgba(255, 255, 0, 0.1)";
const SILVER: &str = "#aaaaaa";
const SILVER_FILL: &str = "rgba(170, 170, 170, 0.1)";
const WORLD_BORDER_WIDTH: u8 = 1;

/// Line colors for multi-series comparisons, assigned by position.
pub const PALETTE: [&str; 8] = [
    "#ffff00", "#00ff00", "#00ffff", "#ff00ff", "#ff981f", "#ff0000", "#ffffff", "#aaaaaa",
];

pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

#[derive(Clone)]
pub struct ComparisonService {
    repository: Arc<dyn PopulationRepository>,
    last_raw_history: Arc<RwLock<Vec<Sample>>>,
}

impl ComparisonService {
    pub fn new(repository: Arc<dyn PopulationRepository>) -> Self {
        Self {
            repository,
            last_raw_history: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Build the series for one render.
    ///
    /// Membership and location comparisons fail as a whole when any request
    /// fails. World comparisons drop worlds whose request failed or came back
    /// empty.
    pub async fn build_datasets(
        &self,
        mode: &CompareMode,
        base: &FilterDescriptor,
        metadata: &Metadata,
    ) -> Result<Vec<Series>, RequestError> {
        match mode {
            CompareMode::None => self.single(base).await,
            CompareMode::ByMembershipType => self.by_membership_type(base).await,
            CompareMode::ByLocation => self.by_location(base, &metadata.locations).await,
            CompareMode::ByWorld => Ok(self.by_world(base, &metadata.worlds).await),
            CompareMode::Unrecognized(value) => {
                tracing::warn!("Unrecognized compare mode {:?}, nothing to render", value);
                Ok(Vec::new())
            }
        }
    }

    /// Samples from the most recent successful history request.
    pub fn last_raw_history(&self) -> Vec<Sample> {
        self.last_raw_history
            .read()
            .map(|cache| cache.clone())
            .unwrap_or_default()
    }

    async fn single(&self, base: &FilterDescriptor) -> Result<Vec<Series>, RequestError> {
        let samples = self.fetch(base).await?;
        Ok(vec![
            Series::from_samples(ONLINE_PLAYERS_LABEL, GOLD, &samples).with_fill(GOLD_FILL),
        ])
    }

    async fn by_membership_type(&self, base: &FilterDescriptor) -> Result<Vec<Series>, RequestError> {
        let f2p_filter = base.with_f2p(true);
        let members_filter = base.with_f2p(false);

        let (f2p, members) = join(self.fetch(&f2p_filter), self.fetch(&members_filter)).await;
        let (f2p, members) = (f2p?, members?);

        Ok(vec![
            Series::from_samples(FREE_TO_PLAY_LABEL, SILVER, &f2p).with_fill(SILVER_FILL),
            Series::from_samples(MEMBERS_LABEL, GOLD, &members).with_fill(GOLD_FILL),
        ])
    }

    async fn by_location(
        &self,
        base: &FilterDescriptor,
        locations: &[Location],
    ) -> Result<Vec<Series>, RequestError> {
        let filters: Vec<FilterDescriptor> = locations
            .iter()
            .map(|location| base.with_location(location.id))
            .collect();
        let results = join_all(filters.iter().map(|filter| self.fetch(filter))).await;

        let mut series = Vec::with_capacity(results.len());
        for (idx, (location, result)) in locations.iter().zip(results).enumerate() {
            let samples = result?;
            series.push(Series::from_samples(
                location.name.clone(),
                palette_color(idx),
                &samples,
            ));
        }

        Ok(series)
    }

    async fn by_world(&self, base: &FilterDescriptor, worlds: &[u32]) -> Vec<Series> {
        let filters: Vec<FilterDescriptor> = worlds.iter().map(|&id| base.with_world(id)).collect();
        let results = join_all(filters.iter().map(|filter| self.fetch(filter))).await;

        let surviving: Vec<(World, Vec<Sample>)> = worlds
            .iter()
            .zip(results)
            .filter_map(|(&id, result)| match result {
                Ok(samples) if !samples.is_empty() => Some((World::new(id), samples)),
                Ok(_) => {
                    tracing::debug!("World {} has no data under the active filters", id);
                    None
                }
                Err(e) => {
                    tracing::debug!("Dropping world {} from comparison: {}", id, e);
                    None
                }
            })
            .collect();

        tracing::debug!("World comparison kept {} of {} worlds", surviving.len(), worlds.len());

        surviving
            .into_iter()
            .enumerate()
            .map(|(idx, (world, samples))| {
                Series::from_samples(world.name, palette_color(idx), &samples)
                    .with_border_width(WORLD_BORDER_WIDTH)
            })
            .collect()
    }

    async fn fetch(&self, descriptor: &FilterDescriptor) -> Result<Vec<Sample>, RequestError> {
        let samples = self.repository.fetch_history(descriptor).await?;
        if let Ok(mut cache) = self.last_raw_history.write() {
            *cache = samples.clone();
        }
        Ok(samples)
    }
}
