use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

mod cards;
mod config;
mod db;
mod import;
mod league;
mod predict;
mod upcoming;
mod web;

use config::Config;
use db::Database;
use import::{AiSpreadRow, HistorySeason};
use upcoming::{eastern_today, FileSchedule, HttpSchedule, ScheduleProvider, UpcomingTracker};
use web::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    // Open database
    let db = Database::open(&config.database_path)?;
    info!("Database opened: {}", config.database_path);

    league::seed_teams(&db)?;

    if let Some(path) = &config.history_file {
        let seasons: Vec<HistorySeason> = import::read_json(path).await?;
        let summary = import::replay_history(&db, &seasons)?;
        info!(
            "History replayed from {}: {} seasons, {} games ({} seasons already stored)",
            path, summary.seasons, summary.games, summary.skipped_seasons
        );
    }

    if let Some(path) = &config.ai_spreads_file {
        let rows: Vec<AiSpreadRow> = import::read_json(path).await?;
        import::import_ai_spreads(&db, &rows)?;
    }

    // Build the schedule source, if any
    let provider: Option<Arc<dyn ScheduleProvider>> = match (&config.schedule_url, &config.schedule_file) {
        (Some(url), _) => Some(Arc::new(HttpSchedule::new(url)?)),
        (None, Some(path)) => Some(Arc::new(FileSchedule::new(path))),
        (None, None) => None,
    };

    let tracker = match provider {
        Some(provider) => {
            info!(
                "Tracking season {} from {}",
                config.season,
                provider.name()
            );
            Some(Arc::new(Mutex::new(UpcomingTracker::new(
                db.clone(),
                provider,
                config.season,
                config.roll_season,
            ))))
        }
        None => {
            warn!("No schedule source configured; upcoming games are disabled");
            None
        }
    };

    // Keep the upcoming week current in the background so page loads stay fast
    if let Some(tracker) = tracker.clone() {
        if config.refresh_interval_secs > 0 {
            let period = Duration::from_secs(config.refresh_interval_secs);
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
                loop {
                    interval.tick().await;
                    let mut tracker = tracker.lock().await;
                    match tracker.refresh(eastern_today()).await {
                        Ok(games) => info!(
                            "Upcoming week {} refreshed ({} games)",
                            tracker
                                .current_week()
                                .map(|w| w.to_string())
                                .unwrap_or_default(),
                            games.len()
                        ),
                        Err(e) => warn!("Upcoming refresh failed: {:#}", e),
                    }
                }
            });
        }
    }

    let app = web::router(AppState { db, tracker }, &config.assets_dir);
    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Run server (blocks until shutdown)
    axum::serve(listener, app).await?;

    Ok(())
}
