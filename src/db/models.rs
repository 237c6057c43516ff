use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of regular-season weeks.
pub const REGULAR_SEASON_WEEKS: u8 = 18;

/// A week of the NFL season, regular or playoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Week {
    Regular(u8),
    WildCard,
    Division,
    ConfChamp,
    SuperBowl,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown week '{0}'")]
pub struct WeekParseError(pub String);

impl Week {
    pub const PLAYOFFS: [Week; 4] = [
        Week::WildCard,
        Week::Division,
        Week::ConfChamp,
        Week::SuperBowl,
    ];

    /// Every week in season order.
    pub fn all() -> impl Iterator<Item = Week> {
        (1..=REGULAR_SEASON_WEEKS)
            .map(Week::Regular)
            .chain(Week::PLAYOFFS)
    }

    pub fn is_playoff(&self) -> bool {
        !matches!(self, Week::Regular(_))
    }

    /// The following week, or `None` after the Super Bowl.
    pub fn next(&self) -> Option<Week> {
        match *self {
            Week::Regular(n) if n < REGULAR_SEASON_WEEKS => Some(Week::Regular(n + 1)),
            Week::Regular(_) => Some(Week::WildCard),
            Week::WildCard => Some(Week::Division),
            Week::Division => Some(Week::ConfChamp),
            Week::ConfChamp => Some(Week::SuperBowl),
            Week::SuperBowl => None,
        }
    }
}

impl fmt::Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Week::Regular(n) => write!(f, "{}", n),
            Week::WildCard => f.write_str("WildCard"),
            Week::Division => f.write_str("Division"),
            Week::ConfChamp => f.write_str("ConfChamp"),
            Week::SuperBowl => f.write_str("SuperBowl"),
        }
    }
}

impl FromStr for Week {
    type Err = WeekParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "WildCard" => Ok(Week::WildCard),
            "Division" => Ok(Week::Division),
            "ConfChamp" => Ok(Week::ConfChamp),
            "SuperBowl" => Ok(Week::SuperBowl),
            _ => match s.parse::<u8>() {
                Ok(n) if (1..=REGULAR_SEASON_WEEKS).contains(&n) => Ok(Week::Regular(n)),
                _ => Err(WeekParseError(s.to_string())),
            },
        }
    }
}

impl Serialize for Week {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Week {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Regular weeks may arrive as JSON numbers
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(u64),
            Text(String),
        }
        let text = match Raw::deserialize(deserializer)? {
            Raw::Num(n) => n.to_string(),
            Raw::Text(s) => s,
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}

impl ToSql for Week {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for Week {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Integer(n) => n
                .to_string()
                .parse()
                .map_err(|e| FromSqlError::Other(Box::new(e))),
            _ => value
                .as_str()?
                .parse()
                .map_err(|e| FromSqlError::Other(Box::new(e))),
        }
    }
}

/// A season such as `"2023-2024"` with its regular-season length in weeks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub id: Option<i64>,
    pub season: String,
    pub length: i32,
}

impl Season {
    /// Name of the season starting in `year`, e.g. `2023` → `"2023-2024"`.
    pub fn name_for_year(year: i32) -> String {
        format!("{}-{}", year, year + 1)
    }
}

/// An NFL franchise with its home stadium and current rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    /// Short code such as "KC"; neutral-site games reference it
    pub ticker: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elo: f64,
}

/// A game as stored, with the pregame ratings that drive the Elo line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: Option<i64>,
    pub season: String,
    pub week: Week,
    pub home_team: String,
    pub away_team: String,
    /// `None` until the game is played
    pub home_points: Option<i32>,
    pub away_points: Option<i32>,
    pub home_yards: Option<i32>,
    pub away_yards: Option<i32>,
    pub home_turnovers: Option<i32>,
    pub away_turnovers: Option<i32>,
    pub home_rating: f64,
    pub away_rating: f64,
    pub playoffs: bool,
    /// Ticker of the host stadium's team for neutral-site games
    pub neutral_destination: Option<String>,
}

/// A game joined with the AI model's spread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiGameRecord {
    pub game_id: i64,
    pub home_team: String,
    pub away_team: String,
    pub home_points: Option<i32>,
    pub away_points: Option<i32>,
    /// Home-relative Elo spread fed to the model
    pub elo_spread: f64,
    /// Home-relative model output (negative favors home)
    pub ai_spread: f64,
}
