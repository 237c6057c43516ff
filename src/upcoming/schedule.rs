use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::models::Week;

/// One row of the season schedule table.
///
/// Rows name the winner and loser rather than home and away; for games not
/// yet played the "winner" column simply holds the listed visitor or host.
/// Statistic columns are text and empty until the game is played.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    #[serde(alias = "week")]
    pub week_num: Week,
    #[serde(default)]
    pub game_day_of_week: String,
    pub game_date: NaiveDate,
    #[serde(default)]
    pub gametime: String,
    pub winner: String,
    /// `"@"` when the winner was the visitor, `"N"` at a neutral site,
    /// empty when the winner was at home
    #[serde(default)]
    pub game_location: String,
    pub loser: String,
    #[serde(default)]
    pub pts_win: String,
    #[serde(default)]
    pub pts_lose: String,
    #[serde(default)]
    pub yards_win: String,
    #[serde(default)]
    pub to_win: String,
    #[serde(default)]
    pub yards_lose: String,
    #[serde(default)]
    pub to_lose: String,
}

/// Per-side statistics of a schedule row, oriented home/away.
#[derive(Debug, Clone, PartialEq)]
pub struct Sides {
    pub home_team: String,
    pub away_team: String,
    pub home_points: Option<i32>,
    pub away_points: Option<i32>,
    pub home_yards: Option<i32>,
    pub away_yards: Option<i32>,
    pub home_turnovers: Option<i32>,
    pub away_turnovers: Option<i32>,
    pub neutral_site: bool,
}

impl ScheduleRow {
    /// Whether the loser column holds the home team.
    pub fn loser_is_home(&self) -> bool {
        matches!(self.game_location.trim(), "@" | "N")
    }

    pub fn sides(&self) -> Sides {
        let winner = (
            &self.winner,
            parse_stat(&self.pts_win),
            parse_stat(&self.yards_win),
            parse_stat(&self.to_win),
        );
        let loser = (
            &self.loser,
            parse_stat(&self.pts_lose),
            parse_stat(&self.yards_lose),
            parse_stat(&self.to_lose),
        );
        let (home, away) = if self.loser_is_home() {
            (loser, winner)
        } else {
            (winner, loser)
        };
        Sides {
            home_team: home.0.clone(),
            away_team: away.0.clone(),
            home_points: home.1,
            away_points: away.1,
            home_yards: home.2,
            away_yards: away.2,
            home_turnovers: home.3,
            away_turnovers: away.3,
            neutral_site: self.game_location.trim() == "N",
        }
    }
}

fn parse_stat(s: &str) -> Option<i32> {
    s.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(location: &str, pts_win: &str, pts_lose: &str) -> ScheduleRow {
        serde_json::from_value(serde_json::json!({
            "week_num": 5,
            "game_day_of_week": "Thu",
            "game_date": "2023-10-05",
            "gametime": "8:15PM",
            "winner": "Chicago Bears",
            "game_location": location,
            "loser": "Washington Commanders",
            "pts_win": pts_win,
            "pts_lose": pts_lose,
            "yards_win": "",
            "to_win": "",
            "yards_lose": "",
            "to_lose": ""
        }))
        .unwrap()
    }

    #[test]
    fn visitor_winner_puts_loser_at_home() {
        let s = row("@", "40", "20").sides();
        assert_eq!(s.home_team, "Washington Commanders");
        assert_eq!(s.away_team, "Chicago Bears");
        assert_eq!(s.home_points, Some(20));
        assert_eq!(s.away_points, Some(40));
        assert!(!s.neutral_site);
    }

    #[test]
    fn empty_location_puts_winner_at_home() {
        let s = row("", "27", "3").sides();
        assert_eq!(s.home_team, "Chicago Bears");
        assert_eq!(s.home_points, Some(27));
        assert_eq!(s.away_points, Some(3));
    }

    #[test]
    fn neutral_site_lists_loser_as_home() {
        let s = row("N", "", "").sides();
        assert_eq!(s.home_team, "Washington Commanders");
        assert!(s.neutral_site);
    }

    #[test]
    fn unplayed_stats_are_none() {
        let s = row("@", "", "").sides();
        assert_eq!(s.home_points, None);
        assert_eq!(s.away_yards, None);
    }

    #[test]
    fn week_alias_and_playoff_names() {
        let r: ScheduleRow = serde_json::from_value(serde_json::json!({
            "week": "WildCard",
            "game_date": "2024-01-13",
            "winner": "Houston Texans",
            "loser": "Cleveland Browns"
        }))
        .unwrap();
        assert_eq!(r.week_num, Week::WildCard);
        assert_eq!(r.game_location, "");
    }
}
