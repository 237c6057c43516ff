//! Game cards: a game's teams and scores alongside its spread prediction.
//!
//! Builders turn stored or upcoming games into [`GameCard`]s. A game whose
//! inputs the predictor rejects is logged and left off the page.

pub mod html;

pub use html::{render_cards, season_options, week_header, week_options};

use serde::Serialize;
use tracing::warn;

use crate::db::models::{AiGameRecord, GameRecord};
use crate::predict::{predict_from_ai_spread, predict_from_ratings, AccuracySummary, PredictionResult};
use crate::upcoming::UpcomingGame;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameCard {
    pub home_team: String,
    pub away_team: String,
    pub home_points: Option<i32>,
    pub away_points: Option<i32>,
    pub prediction: PredictionResult,
}

/// Cards graded against the pregame Elo ratings.
pub fn elo_cards(games: &[GameRecord]) -> Vec<GameCard> {
    games
        .iter()
        .filter_map(|g| {
            match predict_from_ratings(g.home_rating, g.away_rating, g.home_points, g.away_points) {
                Ok(prediction) => Some(card(&g.home_team, &g.away_team, g.home_points, g.away_points, prediction)),
                Err(e) => {
                    warn!("Skipping {} vs {} ({} week {}): {}", g.home_team, g.away_team, g.season, g.week, e);
                    None
                }
            }
        })
        .collect()
}

/// Cards graded against the AI model's spread.
pub fn ai_cards(games: &[AiGameRecord]) -> Vec<GameCard> {
    games
        .iter()
        .filter_map(|g| match predict_from_ai_spread(g.ai_spread, g.home_points, g.away_points) {
            Ok(prediction) => Some(card(&g.home_team, &g.away_team, g.home_points, g.away_points, prediction)),
            Err(e) => {
                warn!("Skipping AI game {} ({} vs {}): {}", g.game_id, g.home_team, g.away_team, e);
                None
            }
        })
        .collect()
}

/// Cards for the current week. The Elo line is home-relative, so it is
/// labelled the same way as the AI spread; no outcome is graded.
pub fn upcoming_cards(games: &[UpcomingGame]) -> Vec<GameCard> {
    games
        .iter()
        .filter_map(|g| match predict_from_ai_spread(g.home_spread, None, None) {
            Ok(prediction) => Some(card(&g.home_team, &g.away_team, g.home_points, g.away_points, prediction)),
            Err(e) => {
                warn!("Skipping upcoming {} vs {}: {}", g.home_team, g.away_team, e);
                None
            }
        })
        .collect()
}

pub fn summarize(cards: &[GameCard]) -> AccuracySummary {
    cards.iter().map(|c| &c.prediction).collect()
}

fn card(
    home_team: &str,
    away_team: &str,
    home_points: Option<i32>,
    away_points: Option<i32>,
    prediction: PredictionResult,
) -> GameCard {
    GameCard {
        home_team: home_team.to_string(),
        away_team: away_team.to_string(),
        home_points,
        away_points,
        prediction,
    }
}
