//! Static league data: franchises with their stadium coordinates and the
//! host stadium of each Super Bowl.

use anyhow::Result;
use tracing::info;

use crate::db::models::Team;
use crate::db::Database;
use crate::predict::elo::MEAN_RATING;

/// (name, ticker, latitude, longitude)
pub const FRANCHISES: &[(&str, &str, f64, f64)] = &[
    ("Kansas City Chiefs", "KC", 39.099789, -94.578560),
    ("Houston Texans", "HOU", 29.760427, -95.369804),
    ("Seattle Seahawks", "SEA", 47.603230, -122.330276),
    ("Atlanta Falcons", "ATL", 33.748997, -84.387985),
    ("Buffalo Bills", "BUF", 42.887691, -78.879372),
    ("New York Jets", "NYJ", 40.814947462026176, -74.07665577312015),
    ("Las Vegas Raiders", "LV", 36.13138384905654, -115.13169451756163),
    ("Carolina Panthers", "CAR", 35.25251233973856, -80.84120226587098),
    ("Chicago Bears", "CHI", 41.84754487986402, -87.67153913855199),
    ("Detroit Lions", "DET", 42.36480313066512, -83.08960351424362),
    ("Baltimore Ravens", "BAL", 39.308003294731584, -76.6205088127477),
    ("Cleveland Browns", "CLE", 41.46606790678101, -81.67222601665915),
    ("Jacksonville Jaguars", "JAC", 30.373130908558224, -81.68590701566833),
    ("Indianapolis Colts", "IND", 39.82165042217416, -86.14927731202125),
    ("Green Bay Packers", "GB", 44.52030015455375, -88.02808200465094),
    ("Minnesota Vikings", "MIN", 44.95461717252483, -93.16928759979443),
    ("New England Patriots", "NE", 42.09250215474584, -71.2639840458412),
    ("Miami Dolphins", "MIA", 25.958159412628838, -80.23881748795804),
    ("Washington Commanders", "WAS", 38.907843649151665, -76.86454540290117),
    ("Philadelphia Eagles", "PHI", 39.90153409172584, -75.1675215028637),
    ("Los Angeles Chargers", "LAC", 33.95369646674758, -118.33909324725614),
    ("Cincinnati Bengals", "CIN", 39.095483938138024, -84.51594106292978),
    ("Arizona Cardinals", "ARI", 33.52738095014831, -112.26238094759978),
    ("San Francisco 49ers", "SF", 37.4032482976688, -121.96987092942953),
    ("New Orleans Saints", "NO", 29.95130267822774, -90.08121201668786),
    ("Tampa Bay Buccaneers", "TB", 27.976153335923133, -82.50335586092449),
    ("Los Angeles Rams", "LAR", 33.95369646674758, -118.33909324725614),
    ("Dallas Cowboys", "DAL", 32.7480062696302, -97.09303478136525),
    ("Pittsburgh Steelers", "PIT", 40.4470587094102, -80.01595342189762),
    ("New York Giants", "NYG", 40.814947462026176, -74.07665577312015),
    ("Tennessee Titans", "TEN", 36.16623854753519, -86.77101512830522),
    ("Denver Broncos", "DEN", 39.74381523382964, -105.02021669123351),
    // Relocated franchises still appear in older schedules
    ("St. Louis Rams", "STL", 38.627003, -90.199402),
    ("San Diego Chargers", "SD", 32.71533, -117.15726),
    ("Oakland Raiders", "OAK", 37.804363, -122.271111),
];

/// Calendar year of the game → ticker of the team whose stadium hosted it.
const SUPER_BOWL_HOSTS: &[(i32, &str)] = &[
    (2011, "DAL"),
    (2012, "IND"),
    (2013, "NO"),
    (2014, "NYG"),
    (2015, "ARI"),
    (2016, "SF"),
    (2017, "HOU"),
    (2018, "MIN"),
    (2019, "ATL"),
    (2020, "MIA"),
    (2021, "TB"),
    (2022, "LAR"),
    (2023, "ARI"),
    (2024, "LV"),
    (2025, "NO"),
];

/// Ticker of the Super Bowl host stadium for a game played in `year`.
pub fn super_bowl_host(year: i32) -> Option<&'static str> {
    SUPER_BOWL_HOSTS
        .iter()
        .find(|(y, _)| *y == year)
        .map(|(_, ticker)| *ticker)
}

/// Add every franchise missing from the database at the league-mean rating.
/// Existing teams keep their ratings. Returns the number added.
pub fn seed_teams(db: &Database) -> Result<usize> {
    let mut added = 0;
    for &(name, ticker, latitude, longitude) in FRANCHISES {
        if db.get_team(name)?.is_some() {
            continue;
        }
        db.upsert_team(&Team {
            name: name.to_string(),
            ticker: ticker.to_string(),
            latitude,
            longitude,
            elo: MEAN_RATING,
        })?;
        added += 1;
    }
    if added > 0 {
        info!("Seeded {} teams at rating {}", added, MEAN_RATING);
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tickers_are_unique() {
        let tickers: HashSet<&str> = FRANCHISES.iter().map(|f| f.1).collect();
        assert_eq!(tickers.len(), FRANCHISES.len());
    }

    #[test]
    fn every_host_is_a_franchise() {
        for (_, host) in SUPER_BOWL_HOSTS {
            assert!(FRANCHISES.iter().any(|f| f.1 == *host), "{} missing", host);
        }
        assert_eq!(super_bowl_host(2023), Some("ARI"));
        assert_eq!(super_bowl_host(1990), None);
    }

    #[test]
    fn seeding_keeps_existing_ratings() {
        let db = Database::in_memory().unwrap();
        assert_eq!(seed_teams(&db).unwrap(), FRANCHISES.len());
        db.set_team_elo("Kansas City Chiefs", 1720.0).unwrap();

        assert_eq!(seed_teams(&db).unwrap(), 0);
        assert_eq!(db.get_team("Kansas City Chiefs").unwrap().unwrap().elo, 1720.0);
        assert_eq!(db.get_team("Buffalo Bills").unwrap().unwrap().elo, MEAN_RATING);
        assert_eq!(db.list_teams().unwrap().len(), FRANCHISES.len());
    }
}
