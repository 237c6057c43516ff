//! Rebuild ratings by replaying past seasons game by game.

use anyhow::Result;
use serde::Deserialize;
use tracing::{info, warn};

use crate::db::models::{Season, Week, REGULAR_SEASON_WEEKS};
use crate::db::Database;
use crate::predict::elo::{self, MEAN_RATING};
use crate::upcoming::record_row;
use crate::upcoming::schedule::ScheduleRow;

/// One season of schedule rows, keyed by the year it starts in.
#[derive(Debug, Clone, Deserialize)]
pub struct HistorySeason {
    pub year: i32,
    pub games: Vec<ScheduleRow>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub seasons: usize,
    pub games: usize,
    pub skipped_seasons: usize,
}

/// Replay seasons oldest first. The first season on an empty database
/// starts every team at the league mean; later ones regress to preseason
/// ratings. Seasons not newer than the latest stored one are skipped so a
/// replay never rewinds ratings that are already current.
pub fn replay_history(db: &Database, seasons: &[HistorySeason]) -> Result<ReplaySummary> {
    let mut ordered: Vec<&HistorySeason> = seasons.iter().collect();
    ordered.sort_by_key(|s| s.year);

    let mut summary = ReplaySummary::default();
    for season in ordered {
        let name = Season::name_for_year(season.year);
        let latest = db.latest_season()?;
        if let Some(latest) = latest.as_ref().filter(|l| l.season >= name) {
            warn!(
                "Skipping season {}: database already holds {}",
                name, latest.season
            );
            summary.skipped_seasons += 1;
            continue;
        }

        for team in db.list_teams()? {
            let rating = match latest {
                None => MEAN_RATING,
                Some(_) => elo::preseason_elo(team.elo),
            };
            db.set_team_elo(&team.name, rating)?;
        }

        let length = season
            .games
            .iter()
            .filter_map(|g| match g.week_num {
                Week::Regular(n) => Some(n),
                _ => None,
            })
            .max()
            .unwrap_or(REGULAR_SEASON_WEEKS);
        db.insert_season(&name, i32::from(length))?;

        let mut rows: Vec<&ScheduleRow> = season.games.iter().collect();
        rows.sort_by_key(|r| (r.week_num, r.game_date));
        let mut stored = 0;
        for row in rows {
            if record_row(db, &name, row.week_num, row)? {
                stored += 1;
            }
        }
        info!("Replayed season {}: {} games", name, stored);
        summary.seasons += 1;
        summary.games += stored;
    }
    Ok(summary)
}
