// Filter metadata domain models
use serde::Deserialize;

/// Offset between the ids the API uses and the world numbers players see.
pub const WORLD_NUMBER_OFFSET: u32 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub description: String,
}

/// Payload of `/api/metadata`, loaded once per session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub worlds: Vec<u32>,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub activities: Vec<Activity>,
}

impl Metadata {
    pub fn world_options(&self) -> Vec<World> {
        self.worlds.iter().copied().map(World::new).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct World {
    pub id: u32,
    pub name: String,
}

impl World {
    pub fn new(id: u32) -> Self {
        let name = Self::format_name(id);
        Self { id, name }
    }

    fn format_name(id: u32) -> String {
        // 2 -> "World 302"
        format!("World {}", u64::from(id) + u64::from(WORLD_NUMBER_OFFSET))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_name() {
        assert_eq!(World::new(2).name, "World 302");
        assert_eq!(World::new(186).name, "World 486");
        assert_eq!(World::new(u32::MAX).name, "World 4294967595");
    }

    #[test]
    fn test_metadata_payload() {
        let metadata: Metadata = serde_json::from_str(
            r#"{"worlds":[1,2,5],
                "locations":[{"id":1,"name":"Australia"},{"id":2,"name":"Germany"}],
                "activities":[{"id":7,"description":"Trade"}]}"#,
        )
        .unwrap();

        assert_eq!(metadata.worlds, vec![1, 2, 5]);
        assert_eq!(metadata.locations[1].name, "Germany");
        assert_eq!(metadata.world_options()[2].name, "World 305");
        assert_eq!(metadata.activities.len(), 1);
    }
}
