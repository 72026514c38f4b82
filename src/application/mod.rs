// Application layer - Use cases driving the dashboard pipeline
pub mod chart_renderer;
pub mod chart_surface;
pub mod comparison_service;
pub mod dashboard_session;
pub mod population_repository;
