// Presentation layer - Where the session's chart and view state end up
pub mod commands;
pub mod console;
pub mod json_surface;
