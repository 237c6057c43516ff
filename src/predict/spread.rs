//! Point-spread predictions and their graded outcome.
//!
//! Two independent sign conventions live here and must stay apart:
//!
//! - **Rating lines** ([`predict_from_ratings`]): the higher-rated side is
//!   favored; an exact tie falls to the away side.
//! - **Home-relative spreads** ([`predict_from_ai_spread`]): a spread quoted
//!   with respect to the home team, where `<= 0` favors home. The AI model
//!   and the upcoming-week Elo line both quote spreads this way.
//!
//! Historical outcome grading depends on each convention as-is, so they are
//! not unified.

use serde::Serialize;
use thiserror::Error;

/// Rating points per point of spread.
pub const RATING_POINTS_PER_SPREAD_POINT: f64 = 25.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error("invalid {field}: {value}")]
    InvalidInput { field: &'static str, value: String },
}

/// Which side of the game the prediction favors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

/// Labels and grading for a single game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// `"- X.Y"` when home is favored, `"+X.Y"` otherwise
    pub home_spread_label: String,
    pub away_spread_label: String,
    /// Unrounded spread magnitude used for grading
    pub magnitude: f64,
    pub favored: Side,
    /// `None` until both final scores are known
    pub outcome_correct: Option<bool>,
}

/// Round half away from zero to one decimal place.
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Predict from a pair of pregame ratings.
pub fn predict_from_ratings(
    home_rating: f64,
    away_rating: f64,
    home_points: Option<i32>,
    away_points: Option<i32>,
) -> Result<PredictionResult, PredictError> {
    check_finite("home_rating", home_rating)?;
    check_finite("away_rating", away_rating)?;
    let scores = final_scores(home_points, away_points)?;

    let magnitude = (home_rating - away_rating).abs() / RATING_POINTS_PER_SPREAD_POINT;
    let favored = if home_rating > away_rating {
        Side::Home
    } else {
        Side::Away
    };
    check_finite("spread", magnitude)?;

    Ok(build(magnitude, favored, scores))
}

/// Predict from a home-relative spread (negative or zero favors home).
pub fn predict_from_ai_spread(
    ai_spread: f64,
    home_points: Option<i32>,
    away_points: Option<i32>,
) -> Result<PredictionResult, PredictError> {
    check_finite("ai_spread", ai_spread)?;
    let scores = final_scores(home_points, away_points)?;

    let favored = if ai_spread <= 0.0 { Side::Home } else { Side::Away };

    Ok(build(ai_spread.abs(), favored, scores))
}

fn build(magnitude: f64, favored: Side, scores: Option<(i32, i32)>) -> PredictionResult {
    let shown = round1(magnitude);
    let (favored_label, underdog_label) = (format!("- {:.1}", shown), format!("+{:.1}", shown));
    let (home_spread_label, away_spread_label) = match favored {
        Side::Home => (favored_label, underdog_label),
        Side::Away => (underdog_label, favored_label),
    };

    // Meeting the spread exactly is not a correct call.
    let outcome_correct = scores.map(|(home, away)| {
        let margin = match favored {
            Side::Home => home - away,
            Side::Away => away - home,
        };
        f64::from(margin) > magnitude
    });

    PredictionResult {
        home_spread_label,
        away_spread_label,
        magnitude,
        favored,
        outcome_correct,
    }
}

fn check_finite(field: &'static str, value: f64) -> Result<(), PredictError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PredictError::InvalidInput {
            field,
            value: value.to_string(),
        })
    }
}

fn final_scores(
    home_points: Option<i32>,
    away_points: Option<i32>,
) -> Result<Option<(i32, i32)>, PredictError> {
    for (field, points) in [("home_points", home_points), ("away_points", away_points)] {
        if let Some(p) = points {
            if p < 0 {
                return Err(PredictError::InvalidInput {
                    field,
                    value: p.to_string(),
                });
            }
        }
    }
    Ok(home_points.zip(away_points))
}
