// Repository trait for population data access
use crate::domain::filter::FilterDescriptor;
use crate::domain::metadata::Metadata;
use crate::domain::population::{LatestSnapshot, Sample};
use async_trait::async_trait;
use thiserror::Error;

/// Failure of a single API request. Displays as the bare message so it can be
/// shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("{0}")]
    Network(String),
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("{0}")]
    Parse(String),
}

#[async_trait]
pub trait PopulationRepository: Send + Sync {
    /// Worlds, locations and activities available for filtering
    async fn fetch_metadata(&self) -> Result<Metadata, RequestError>;

    /// Most recent global count with the membership breakdown
    async fn fetch_latest(&self) -> Result<LatestSnapshot, RequestError>;

    /// Time series for one filter descriptor
    async fn fetch_history(&self, descriptor: &FilterDescriptor) -> Result<Vec<Sample>, RequestError>;
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::sync::Mutex;

    type HistoryFn = Box<dyn Fn(&FilterDescriptor) -> Result<Vec<Sample>, RequestError> + Send + Sync>;

    /// In-memory repository that answers history requests from a closure and
    /// records every descriptor it was asked for.
    pub struct FakeRepository {
        metadata: Result<Metadata, RequestError>,
        latest: Result<LatestSnapshot, RequestError>,
        history: HistoryFn,
        requests: Mutex<Vec<FilterDescriptor>>,
    }

    impl FakeRepository {
        pub fn new<F>(history: F) -> Self
        where
            F: Fn(&FilterDescriptor) -> Result<Vec<Sample>, RequestError> + Send + Sync + 'static,
        {
            Self {
                metadata: Ok(Metadata::default()),
                latest: Err(RequestError::Network("no latest configured".to_string())),
                history: Box::new(history),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn with_metadata(mut self, metadata: Metadata) -> Self {
            self.metadata = Ok(metadata);
            self
        }

        pub fn with_latest(mut self, latest: Result<LatestSnapshot, RequestError>) -> Self {
            self.latest = latest;
            self
        }

        pub fn requests(&self) -> Vec<FilterDescriptor> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PopulationRepository for FakeRepository {
        async fn fetch_metadata(&self) -> Result<Metadata, RequestError> {
            self.metadata.clone()
        }

        async fn fetch_latest(&self) -> Result<LatestSnapshot, RequestError> {
            self.latest.clone()
        }

        async fn fetch_history(&self, descriptor: &FilterDescriptor) -> Result<Vec<Sample>, RequestError> {
            self.requests.lock().unwrap().push(descriptor.clone());
            (self.history)(descriptor)
        }
    }
}
