//! Tracks the current week of the season.
//!
//! The tracker caches the week's schedule with pregame Elo lines. Once every
//! game of the cached week is in the past it pulls the final scores, stores
//! the games, applies the post-game rating shifts and moves on to the next
//! week. A game is recorded at most once, so a restarted tracker resumes
//! after the last stored week without moving ratings a second time.

pub mod provider;
pub mod schedule;

pub use provider::{FileSchedule, HttpSchedule, ScheduleProvider};

use anyhow::Result;
use chrono::{Datelike, FixedOffset, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::db::models::{GameRecord, Season, Team, Week, REGULAR_SEASON_WEEKS};
use crate::db::Database;
use crate::league;
use crate::predict::elo::{self, GeoPoint};
use schedule::{ScheduleRow, Sides};

/// Eastern standard time, the schedule's reference clock.
const EASTERN_OFFSET_SECS: i32 = 5 * 3600;

/// Today's date on the US east coast.
pub fn eastern_today() -> NaiveDate {
    match FixedOffset::west_opt(EASTERN_OFFSET_SECS) {
        Some(tz) => Utc::now().with_timezone(&tz).date_naive(),
        None => Utc::now().date_naive(),
    }
}

/// An upcoming game with its pregame Elo line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpcomingGame {
    pub week: Week,
    pub game_date: NaiveDate,
    pub gametime: String,
    pub home_team: String,
    pub away_team: String,
    pub home_points: Option<i32>,
    pub away_points: Option<i32>,
    pub home_pregame_elo: f64,
    pub away_pregame_elo: f64,
    /// Home-relative Elo spread (negative favors home)
    pub home_spread: f64,
    pub away_spread: f64,
    pub playoffs: bool,
    pub neutral_site: bool,
}

pub struct UpcomingTracker {
    db: Database,
    provider: Arc<dyn ScheduleProvider>,
    season_year: i32,
    /// Regress ratings when opening a season not yet in the database
    regress_on_new_season: bool,
    week: Option<Week>,
    games: Vec<UpcomingGame>,
}

impl UpcomingTracker {
    pub fn new(
        db: Database,
        provider: Arc<dyn ScheduleProvider>,
        season_year: i32,
        regress_on_new_season: bool,
    ) -> Self {
        UpcomingTracker {
            db,
            provider,
            season_year,
            regress_on_new_season,
            week: None,
            games: Vec::new(),
        }
    }

    pub fn season_name(&self) -> String {
        Season::name_for_year(self.season_year)
    }

    pub fn current_week(&self) -> Option<Week> {
        self.week
    }

    /// Bring the cached week up to date with `today` and return its games.
    pub async fn refresh(&mut self, today: NaiveDate) -> Result<Vec<UpcomingGame>> {
        let mut week = match self.week {
            Some(w) if !self.games.is_empty() => w,
            Some(w) => {
                // Nothing usable yet, the schedule may not be published
                self.load_week(w).await?;
                w
            }
            None => {
                self.open_season()?;
                let start = self.resume_week()?;
                self.load_week(start).await?;
                start
            }
        };

        while let Some(last) = last_game_date(&self.games) {
            if today <= last {
                break;
            }
            let Some(next) = week.next() else {
                info!("Season {} is complete", self.season_name());
                break;
            };
            self.archive_week(week).await?;
            self.load_week(next).await?;
            week = next;
        }

        Ok(self.games.clone())
    }

    /// Make sure the season exists, regressing ratings if it is new.
    fn open_season(&self) -> Result<()> {
        let name = self.season_name();
        let is_new = self
            .db
            .latest_season()?
            .map_or(true, |latest| latest.season < name);
        self.db
            .insert_season(&name, i32::from(REGULAR_SEASON_WEEKS))?;
        if is_new && self.regress_on_new_season {
            for team in self.db.list_teams()? {
                let elo = elo::preseason_elo(team.elo);
                self.db.set_team_elo(&team.name, elo)?;
            }
            info!("Opened season {} with preseason ratings", name);
        }
        Ok(())
    }

    /// Week after the last one already stored, so a restart picks up where
    /// the previous run left off.
    fn resume_week(&self) -> Result<Week> {
        let week = match self.db.latest_week(&self.season_name())? {
            Some(stored) => {
                info!("Resuming season {} after week {}", self.season_name(), stored);
                stored.next().unwrap_or(stored)
            }
            None => Week::Regular(1),
        };
        Ok(week)
    }

    async fn load_week(&mut self, week: Week) -> Result<()> {
        let rows = self.provider.fetch_week(self.season_year, week).await?;
        let mut games = Vec::with_capacity(rows.len());
        for row in &rows {
            let sides = row.sides();
            let Some(matchup) = Matchup::resolve(&self.db, week, row, &sides)? else {
                continue;
            };
            let home_spread = elo::elo_spread(matchup.home_elo, matchup.away_elo);
            games.push(UpcomingGame {
                week,
                game_date: row.game_date,
                gametime: row.gametime.clone(),
                home_team: sides.home_team,
                away_team: sides.away_team,
                home_points: sides.home_points,
                away_points: sides.away_points,
                home_pregame_elo: matchup.home_elo,
                away_pregame_elo: matchup.away_elo,
                home_spread,
                away_spread: -home_spread,
                playoffs: week.is_playoff(),
                neutral_site: sides.neutral_site,
            });
        }
        info!(
            "Loaded {} games for week {} from {}",
            games.len(),
            week,
            self.provider.name()
        );
        self.week = Some(week);
        self.games = games;
        Ok(())
    }

    /// Store a finished week's results and apply the rating shifts.
    async fn archive_week(&self, week: Week) -> Result<()> {
        let season = self.season_name();
        let rows = self.provider.fetch_week(self.season_year, week).await?;
        let mut stored = 0usize;
        for row in &rows {
            if record_row(&self.db, &season, week, row)? {
                stored += 1;
            }
        }
        info!("Archived {} games for week {} of {}", stored, week, season);
        Ok(())
    }
}

/// Both teams of a schedule row with their travel-adjusted pregame ratings.
struct Matchup {
    home: Team,
    away: Team,
    /// Host stadium's team for a neutral-site game
    host: Option<Team>,
    home_elo: f64,
    away_elo: f64,
}

impl Matchup {
    /// `None` when either team is unknown.
    fn resolve(db: &Database, week: Week, row: &ScheduleRow, sides: &Sides) -> Result<Option<Self>> {
        let (home, away) = match (db.get_team(&sides.home_team)?, db.get_team(&sides.away_team)?) {
            (Some(h), Some(a)) => (h, a),
            _ => {
                warn!(
                    "Unknown team in '{} vs {}', skipping game",
                    sides.home_team, sides.away_team
                );
                return Ok(None);
            }
        };
        let host = if sides.neutral_site {
            neutral_host(db, week, row.game_date)?
        } else {
            None
        };
        let shift = elo::pregame_shift(
            GeoPoint::new(home.latitude, home.longitude),
            GeoPoint::new(away.latitude, away.longitude),
            host.as_ref().map(|t| GeoPoint::new(t.latitude, t.longitude)),
        );
        Ok(Some(Matchup {
            home_elo: home.elo + shift,
            away_elo: away.elo - shift,
            home,
            away,
            host,
        }))
    }
}

/// Team hosting a neutral-site game. Only Super Bowl venues are known; other
/// neutral games are rated as ordinary home games.
fn neutral_host(db: &Database, week: Week, date: NaiveDate) -> Result<Option<Team>> {
    if week != Week::SuperBowl {
        debug!("No venue for neutral-site week {} game on {}", week, date);
        return Ok(None);
    }
    let Some(ticker) = league::super_bowl_host(date.year()) else {
        warn!("No Super Bowl host known for {}", date.year());
        return Ok(None);
    };
    let host = db.get_team_by_ticker(ticker)?;
    if host.is_none() {
        warn!("Super Bowl host {} is not in the teams table", ticker);
    }
    Ok(host)
}

/// Store one finished schedule row and apply its rating shift. Returns
/// whether the game was new; unplayed rows, unknown teams and games already
/// on record leave the ratings alone.
pub fn record_row(db: &Database, season: &str, week: Week, row: &ScheduleRow) -> Result<bool> {
    let sides = row.sides();
    let (Some(home_points), Some(away_points)) = (sides.home_points, sides.away_points) else {
        warn!(
            "No final score for {} vs {} in week {}, skipping",
            sides.home_team, sides.away_team, week
        );
        return Ok(false);
    };
    let Some(matchup) = Matchup::resolve(db, week, row, &sides)? else {
        return Ok(false);
    };

    let game = GameRecord {
        id: None,
        season: season.to_string(),
        week,
        home_team: matchup.home.name,
        away_team: matchup.away.name,
        home_points: Some(home_points),
        away_points: Some(away_points),
        home_yards: sides.home_yards,
        away_yards: sides.away_yards,
        home_turnovers: sides.home_turnovers,
        away_turnovers: sides.away_turnovers,
        home_rating: matchup.home_elo,
        away_rating: matchup.away_elo,
        playoffs: week.is_playoff(),
        neutral_destination: matchup.host.map(|t| t.ticker),
    };
    let shift = f64::from(elo::postgame_shift(
        matchup.home_elo,
        matchup.away_elo,
        home_points,
        away_points,
        week.is_playoff(),
    ));
    db.record_result(&game, shift)
}

/// Latest kickoff date among `games`.
pub fn last_game_date(games: &[UpcomingGame]) -> Option<NaiveDate> {
    games.iter().map(|g| g.game_date).max()
}
