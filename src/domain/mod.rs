// Domain layer - Population data, filters and control vocabulary
pub mod chart;
pub mod filter;
pub mod metadata;
pub mod population;
pub mod preset;
