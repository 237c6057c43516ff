//! Elo rating arithmetic for NFL teams.
//!
//! Follows the FiveThirtyEight NFL model: travel-adjusted pregame ratings,
//! a logistic win probability, a margin-of-victory weighted post-game shift
//! and regression toward the mean between seasons.
//!
//! Every rounding step here is half-to-even so that ratings rebuilt from
//! history match the stored ones point for point.

use super::spread::RATING_POINTS_PER_SPREAD_POINT;

/// Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6378.137;
const KM_PER_MILE: f64 = 1.609;

/// Home-field advantage in rating points, split evenly between the teams.
const HOME_FIELD_ADVANTAGE: f64 = 48.0;
/// Rating points per mile travelled.
const TRAVEL_POINTS_PER_MILE: f64 = 0.004;

const K_FACTOR: f64 = 20.0;
const PLAYOFF_MULTIPLIER: f64 = 1.2;
/// Margin-of-victory multiplier applied to a tied game.
const TIE_MOV_MULTIPLIER: f64 = 1.525;

/// League-mean rating new seasons regress toward.
pub const MEAN_RATING: f64 = 1505.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        GeoPoint {
            latitude,
            longitude,
        }
    }
}

/// Great-circle distance in miles (haversine).
pub fn haversine_miles(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let long_a = a.longitude.to_radians();
    let long_b = b.longitude.to_radians();

    let h = ((lat_b - lat_a) / 2.0).sin().powi(2)
        + (1.0 - ((lat_a - lat_b) / 2.0).sin().powi(2) - ((lat_a + lat_b) / 2.0).sin().powi(2))
            * ((long_b - long_a) / 2.0).sin().powi(2);
    let km = 2.0 * EARTH_RADIUS_KM * h.sqrt().asin();
    km / KM_PER_MILE
}

/// Rating points to move from the away team to the home team before kickoff.
///
/// At a neutral site neither team gets home-field advantage and both are
/// penalised for their own travel, so the shift is negative.
pub fn pregame_shift(home: GeoPoint, away: GeoPoint, neutral: Option<GeoPoint>) -> f64 {
    match neutral {
        Some(site) => {
            let home_travel = (haversine_miles(home, site) * TRAVEL_POINTS_PER_MILE).round_ties_even();
            let away_travel = (haversine_miles(away, site) * TRAVEL_POINTS_PER_MILE).round_ties_even();
            -(home_travel + away_travel)
        }
        None => {
            let distance = haversine_miles(home, away);
            HOME_FIELD_ADVANTAGE / 2.0
                + (distance * TRAVEL_POINTS_PER_MILE / 2.0).round_ties_even()
        }
    }
}

/// Probability that the home team wins given `home - away` rating difference.
pub fn win_probability(elo_diff: f64) -> f64 {
    1.0 / (10f64.powf(-elo_diff / 400.0) + 1.0)
}

/// Rating points to move from the away team to the home team after the game.
/// Positive favors home.
pub fn postgame_shift(
    home_pregame_elo: f64,
    away_pregame_elo: f64,
    home_points: i32,
    away_points: i32,
    playoffs: bool,
) -> i32 {
    let mut elo_diff = home_pregame_elo - away_pregame_elo;
    if playoffs {
        elo_diff *= PLAYOFF_MULTIPLIER;
    }

    let p_home = win_probability(elo_diff);
    let actual = match home_points.cmp(&away_points) {
        std::cmp::Ordering::Greater => 1.0,
        std::cmp::Ordering::Equal => 0.5,
        std::cmp::Ordering::Less => 0.0,
    };
    let forecast_delta = actual - p_home;

    let point_diff = home_points - away_points;
    let mov = if point_diff == 0 {
        // A favorite that only ties still gives up rating.
        TIE_MOV_MULTIPLIER
    } else {
        // Autocorrelation term is taken from the winner's perspective.
        let winner_diff = if point_diff < 0 { -elo_diff } else { elo_diff };
        (f64::from(point_diff.abs()) + 1.0).ln() * (2.2 / (winner_diff * 0.001 + 2.2))
    };

    (K_FACTOR * forecast_delta * mov).round_ties_even() as i32
}

/// Regress an end-of-season rating a third of the way back to the mean.
pub fn preseason_elo(elo: f64) -> f64 {
    (elo - (elo - MEAN_RATING) / 3.0).round_ties_even()
}

/// Home-relative spread implied by two ratings (negative favors home).
pub fn elo_spread(home_elo: f64, away_elo: f64) -> f64 {
    (away_elo - home_elo) / RATING_POINTS_PER_SPREAD_POINT
}
