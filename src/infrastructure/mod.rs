// Infrastructure layer - External dependencies and adapters
pub mod chart_js;
pub mod config;
pub mod http_population_api;
