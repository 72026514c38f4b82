// Filter and comparison descriptors for history requests
use chrono::{DateTime, Utc};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GranularityUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl GranularityUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            GranularityUnit::Minute => "minute",
            GranularityUnit::Hour => "hour",
            GranularityUnit::Day => "day",
            GranularityUnit::Week => "week",
            GranularityUnit::Month => "month",
        }
    }
}

impl fmt::Display for GranularityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time-bucket size requested from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Granularity {
    pub unit: GranularityUnit,
    /// Bucket size in minutes; only meaningful for the minute unit.
    pub step: Option<u32>,
}

impl Granularity {
    pub fn new(unit: GranularityUnit) -> Self {
        Self { unit, step: None }
    }

    pub fn minutes(step: u32) -> Self {
        Self {
            unit: GranularityUnit::Minute,
            step: Some(step),
        }
    }

    /// Parse a granularity control value: `hour`, `day`, `week`, `month`
    /// or `<N>m` for N-minute buckets.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        match value {
            "minute" => Some(Self::new(GranularityUnit::Minute)),
            "hour" => Some(Self::new(GranularityUnit::Hour)),
            "day" => Some(Self::new(GranularityUnit::Day)),
            "week" => Some(Self::new(GranularityUnit::Week)),
            "month" => Some(Self::new(GranularityUnit::Month)),
            _ => {
                let step = value.strip_suffix('m')?.parse::<u32>().ok()?;
                (step > 0).then(|| Self::minutes(step))
            }
        }
    }

    pub fn is_minute(&self) -> bool {
        self.unit == GranularityUnit::Minute
    }
}

impl Default for Granularity {
    fn default() -> Self {
        Self::new(GranularityUnit::Hour)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.unit, self.step) {
            (GranularityUnit::Minute, Some(step)) => write!(f, "{}m", step),
            (unit, _) => f.write_str(unit.as_str()),
        }
    }
}

/// Everything one `/api/history` request can say. `None` means server default.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterDescriptor {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub granularity: Granularity,
    pub limit: Option<u32>,
    pub aggregation: Option<String>,
    pub world_id: Option<u32>,
    pub location_id: Option<i64>,
    pub is_f2p: Option<bool>,
}

impl FilterDescriptor {
    pub fn new(granularity: Granularity) -> Self {
        Self {
            granularity,
            ..Self::default()
        }
    }

    pub fn with_world(&self, world_id: u32) -> Self {
        Self {
            world_id: Some(world_id),
            ..self.clone()
        }
    }

    pub fn with_location(&self, location_id: i64) -> Self {
        Self {
            location_id: Some(location_id),
            ..self.clone()
        }
    }

    pub fn with_f2p(&self, is_f2p: bool) -> Self {
        Self {
            is_f2p: Some(is_f2p),
            ..self.clone()
        }
    }
}

/// How many series a render produces and which filter field varies between them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CompareMode {
    #[default]
    None,
    ByMembershipType,
    ByLocation,
    ByWorld,
    Unrecognized(String),
}

impl CompareMode {
    /// Map a compare control value (`none`, `type`, `location`, `worlds`).
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" | "none" => CompareMode::None,
            "type" => CompareMode::ByMembershipType,
            "location" => CompareMode::ByLocation,
            "worlds" => CompareMode::ByWorld,
            other => CompareMode::Unrecognized(other.to_string()),
        }
    }
}

impl fmt::Display for CompareMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareMode::None => f.write_str("none"),
            CompareMode::ByMembershipType => f.write_str("type"),
            CompareMode::ByLocation => f.write_str("location"),
            CompareMode::ByWorld => f.write_str("worlds"),
            CompareMode::Unrecognized(other) => f.write_str(other),
        }
    }
}
