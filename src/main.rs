// Main entry point - Dependency injection, the refresh loop and console commands
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_session::{ControlEvent, ControlState, DashboardSession};
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::http_population_api::HttpPopulationApi;
use crate::presentation::commands::{parse_command, Command, HELP};
use crate::presentation::console::{print_controls, print_filter_options, print_history, print_view};
use crate::presentation::json_surface::JsonFileSurface;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_dashboard_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(HttpPopulationApi::new(
        config.api.base_url.clone(),
        config.api.timeout(),
    )?);

    // Create session (application layer) drawing onto a JSON file (presentation layer)
    let surface = JsonFileSurface::new(config.output.chart_path.clone());
    let controls = ControlState::from_defaults(&config.view);
    let mut session = DashboardSession::new(repository, surface, controls);

    tracing::info!(
        "Starting player-count dashboard against {} (chart -> {})",
        config.api.base_url,
        session.chart().surface().path().display()
    );

    session.initialize().await;
    print_filter_options(session.metadata());
    print_view(session.view());

    let mut ticker = tokio::time::interval(config.refresh.interval());
    // The first tick completes immediately; initialize already rendered.
    ticker.tick().await;

    // Control commands arrive one per line on stdin.
    let mut commands = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                session.handle(ControlEvent::RefreshTick).await;
                print_view(session.view());
            }
            line = commands.next_line(), if stdin_open => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        tracing::info!("Input closed; refreshing until interrupted");
                        stdin_open = false;
                        continue;
                    }
                    Err(e) => {
                        tracing::warn!("Error reading command input: {}", e);
                        stdin_open = false;
                        continue;
                    }
                };

                match parse_command(&line) {
                    Ok(None) => {}
                    Ok(Some(Command::Control(event))) => {
                        session.handle(event).await;
                        print_view(session.view());
                    }
                    Ok(Some(Command::Status)) => {
                        print_controls(session.controls(), session.chart().live().is_some());
                    }
                    Ok(Some(Command::History)) => print_history(&session.last_raw_history()),
                    Ok(Some(Command::Help)) => println!("{}", HELP),
                    Ok(Some(Command::Quit)) => {
                        tracing::info!("Shutting down");
                        break;
                    }
                    Err(e) => println!("{}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                break;
            }
        }
    }

    Ok(())
}
