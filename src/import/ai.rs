//! Attach the AI model's spreads to stored games.

use anyhow::Result;
use serde::Deserialize;
use tracing::{info, warn};

use crate::db::models::Week;
use crate::db::Database;
use crate::predict::elo;

/// One model output, home-relative (negative favors home).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AiSpreadRow {
    pub season: String,
    pub week: Week,
    pub home_team: String,
    pub away_team: String,
    pub ai_spread: f64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AiImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Store each spread against its game, alongside the Elo spread implied by
/// the game's pregame ratings. Rows naming no stored game are skipped.
pub fn import_ai_spreads(db: &Database, rows: &[AiSpreadRow]) -> Result<AiImportSummary> {
    let mut summary = AiImportSummary::default();
    for row in rows {
        if !row.ai_spread.is_finite() {
            warn!(
                "Non-finite AI spread for {} vs {} ({} week {}), skipping",
                row.home_team, row.away_team, row.season, row.week
            );
            summary.skipped += 1;
            continue;
        }
        let game = db.find_game(&row.season, row.week, &row.home_team, &row.away_team)?;
        let Some((id, game)) = game.and_then(|g| g.id.map(|id| (id, g))) else {
            warn!(
                "No stored game {} vs {} ({} week {}), skipping AI spread",
                row.home_team, row.away_team, row.season, row.week
            );
            summary.skipped += 1;
            continue;
        };
        let elo_spread = elo::elo_spread(game.home_rating, game.away_rating);
        db.upsert_ai_prediction(id, elo_spread, row.ai_spread)?;
        summary.imported += 1;
    }
    info!(
        "Imported {} AI spreads ({} skipped)",
        summary.imported, summary.skipped
    );
    Ok(summary)
}
