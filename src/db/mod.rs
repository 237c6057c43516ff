use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

pub mod models;
use models::*;

/// Thread-safe SQLite connection pool (single connection with mutex)
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the SQLite database at the given path
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Self::from_connection(conn)
    }

    /// In-memory database, used by tests
    #[allow(dead_code)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Run schema migrations (idempotent)
    fn run_migrations(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database mutex poisoned"))
    }

    // ── Seasons ──────────────────────────────────────────────────────────────

    /// Insert a season if it is not already present; returns its id
    pub fn insert_season(&self, season: &str, length: i32) -> Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR IGNORE INTO seasons (season, length) VALUES (?1, ?2)",
            params![season, length],
        )?;
        let id = conn.query_row(
            "SELECT id FROM seasons WHERE season = ?1",
            params![season],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// All seasons, oldest first
    pub fn list_seasons(&self) -> Result<Vec<Season>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, season, length FROM seasons ORDER BY season")?;
        let seasons = stmt
            .query_map([], map_season)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(seasons)
    }

    /// Most recent season, if any
    pub fn latest_season(&self) -> Result<Option<Season>> {
        let conn = self.lock()?;
        let season = conn
            .query_row(
                "SELECT id, season, length FROM seasons ORDER BY season DESC LIMIT 1",
                [],
                map_season,
            )
            .optional()?;
        Ok(season)
    }

    // ── Teams ────────────────────────────────────────────────────────────────

    /// Insert or replace a team record
    pub fn upsert_team(&self, team: &Team) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO teams (name, ticker, latitude, longitude, elo)
             VALUES (?1,?2,?3,?4,?5)
             ON CONFLICT(name) DO UPDATE SET
                ticker=excluded.ticker,
                latitude=excluded.latitude,
                longitude=excluded.longitude,
                elo=excluded.elo",
            params![team.name, team.ticker, team.latitude, team.longitude, team.elo],
        )?;
        Ok(())
    }

    pub fn get_team(&self, name: &str) -> Result<Option<Team>> {
        let conn = self.lock()?;
        let team = conn
            .query_row(
                "SELECT name, ticker, latitude, longitude, elo FROM teams WHERE name = ?1",
                params![name],
                map_team,
            )
            .optional()?;
        Ok(team)
    }

    /// Team whose short code is `ticker`, e.g. `"ARI"`
    pub fn get_team_by_ticker(&self, ticker: &str) -> Result<Option<Team>> {
        let conn = self.lock()?;
        let team = conn
            .query_row(
                "SELECT name, ticker, latitude, longitude, elo FROM teams WHERE ticker = ?1",
                params![ticker],
                map_team,
            )
            .optional()?;
        Ok(team)
    }

    pub fn list_teams(&self) -> Result<Vec<Team>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT name, ticker, latitude, longitude, elo FROM teams ORDER BY name")?;
        let teams = stmt
            .query_map([], map_team)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(teams)
    }

    pub fn set_team_elo(&self, name: &str, elo: f64) -> Result<()> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE teams SET elo = ?1 WHERE name = ?2",
            params![elo, name],
        )?;
        if updated == 0 {
            anyhow::bail!("unknown team '{}'", name);
        }
        Ok(())
    }

    // ── Games ────────────────────────────────────────────────────────────────

    /// Insert a game; an existing game for the same season/week/teams is
    /// left untouched. Returns the stored game's id.
    pub fn insert_game(&self, game: &GameRecord) -> Result<i64> {
        let conn = self.lock()?;
        let (id, _) = insert_game_row(&conn, game)?;
        Ok(id)
    }

    /// Store a finished game and move `shift` rating points from the away
    /// team to the home team, atomically. A game already on record is left
    /// alone and the ratings are not touched; returns whether it was new.
    pub fn record_result(&self, game: &GameRecord, shift: f64) -> Result<bool> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let (_, inserted) = insert_game_row(&tx, game)?;
        if inserted {
            for (team, delta) in [(&game.home_team, shift), (&game.away_team, -shift)] {
                let updated = tx.execute(
                    "UPDATE teams SET elo = elo + ?1 WHERE name = ?2",
                    params![delta, team],
                )?;
                if updated == 0 {
                    anyhow::bail!("unknown team '{}'", team);
                }
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Look up a single stored game by its season, week and teams
    pub fn find_game(
        &self,
        season: &str,
        week: Week,
        home_team: &str,
        away_team: &str,
    ) -> Result<Option<GameRecord>> {
        let conn = self.lock()?;
        let game = conn
            .query_row(
                &format!(
                    "{} WHERE s.season = ?1 AND g.week = ?2 AND g.home_team = ?3 AND g.away_team = ?4",
                    GAME_SELECT
                ),
                params![season, week, home_team, away_team],
                map_game,
            )
            .optional()?;
        Ok(game)
    }

    /// Latest week of a season with at least one stored game
    pub fn latest_week(&self, season: &str) -> Result<Option<Week>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT g.week FROM games g JOIN seasons s ON g.season_id = s.id
             WHERE s.season = ?1",
        )?;
        let weeks = stmt
            .query_map(params![season], |row| row.get::<_, Week>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        // Weeks are stored as text, so order them here
        Ok(weeks.into_iter().max())
    }

    /// Games for one week of a season
    pub fn week_games(&self, season: &str, week: Week) -> Result<Vec<GameRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE s.season = ?1 AND g.week = ?2 ORDER BY g.id",
            GAME_SELECT
        ))?;
        let games = stmt
            .query_map(params![season, week], map_game)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(games)
    }

    /// Every game of a season
    pub fn season_games(&self, season: &str) -> Result<Vec<GameRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{} WHERE s.season = ?1 ORDER BY g.id", GAME_SELECT))?;
        let games = stmt
            .query_map(params![season], map_game)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(games)
    }

    // ── AI predictions ───────────────────────────────────────────────────────

    pub fn upsert_ai_prediction(&self, game_id: i64, elo_spread: f64, ai_spread: f64) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO ai_predictions (game_id, elo_spread, ai_spread)
             VALUES (?1,?2,?3)
             ON CONFLICT(game_id) DO UPDATE SET
                elo_spread=excluded.elo_spread,
                ai_spread=excluded.ai_spread",
            params![game_id, elo_spread, ai_spread],
        )?;
        Ok(())
    }

    /// Games for one week joined with the AI model's spread
    pub fn ai_week_games(&self, season: &str, week: Week) -> Result<Vec<AiGameRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE s.season = ?1 AND g.week = ?2 ORDER BY g.id",
            AI_GAME_SELECT
        ))?;
        let games = stmt
            .query_map(params![season, week], map_ai_game)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(games)
    }

    pub fn ai_season_games(&self, season: &str) -> Result<Vec<AiGameRecord>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare(&format!("{} WHERE s.season = ?1 ORDER BY g.id", AI_GAME_SELECT))?;
        let games = stmt
            .query_map(params![season], map_ai_game)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(games)
    }
}

// ── SQL helpers ────────────────────────────────────────────────────────────────

/// Insert a game unless it is already stored. Returns its id and whether a
/// row was written.
fn insert_game_row(conn: &Connection, game: &GameRecord) -> Result<(i64, bool)> {
    let season_id: i64 = conn
        .query_row(
            "SELECT id FROM seasons WHERE season = ?1",
            params![game.season],
            |row| row.get(0),
        )
        .optional()?
        .with_context(|| format!("unknown season '{}'", game.season))?;
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO games (
            season_id, week, home_team, away_team,
            home_points, away_points, home_yards, away_yards,
            home_turnovers, away_turnovers,
            home_pregame_elo, away_pregame_elo, playoffs, neutral_destination
         ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14)",
        params![
            season_id,
            game.week,
            game.home_team,
            game.away_team,
            game.home_points,
            game.away_points,
            game.home_yards,
            game.away_yards,
            game.home_turnovers,
            game.away_turnovers,
            game.home_rating,
            game.away_rating,
            game.playoffs,
            game.neutral_destination,
        ],
    )? == 1;
    let id = conn.query_row(
        "SELECT id FROM games
         WHERE season_id = ?1 AND week = ?2 AND home_team = ?3 AND away_team = ?4",
        params![season_id, game.week, game.home_team, game.away_team],
        |row| row.get(0),
    )?;
    Ok((id, inserted))
}

const GAME_SELECT: &str = "SELECT g.id, s.season, g.week, g.home_team, g.away_team,
        g.home_points, g.away_points, g.home_yards, g.away_yards,
        g.home_turnovers, g.away_turnovers,
        g.home_pregame_elo, g.away_pregame_elo, g.playoffs, g.neutral_destination
     FROM games g JOIN seasons s ON g.season_id = s.id";

const AI_GAME_SELECT: &str = "SELECT g.id, g.home_team, g.away_team,
        g.home_points, g.away_points, a.elo_spread, a.ai_spread
     FROM games g
     JOIN seasons s ON g.season_id = s.id
     JOIN ai_predictions a ON a.game_id = g.id";

fn map_season(row: &rusqlite::Row) -> rusqlite::Result<Season> {
    Ok(Season {
        id: row.get(0)?,
        season: row.get(1)?,
        length: row.get(2)?,
    })
}

fn map_team(row: &rusqlite::Row) -> rusqlite::Result<Team> {
    Ok(Team {
        name: row.get(0)?,
        ticker: row.get(1)?,
        latitude: row.get(2)?,
        longitude: row.get(3)?,
        elo: row.get(4)?,
    })
}

fn map_game(row: &rusqlite::Row) -> rusqlite::Result<GameRecord> {
    Ok(GameRecord {
        id: row.get(0)?,
        season: row.get(1)?,
        week: row.get(2)?,
        home_team: row.get(3)?,
        away_team: row.get(4)?,
        home_points: row.get(5)?,
        away_points: row.get(6)?,
        home_yards: row.get(7)?,
        away_yards: row.get(8)?,
        home_turnovers: row.get(9)?,
        away_turnovers: row.get(10)?,
        home_rating: row.get(11)?,
        away_rating: row.get(12)?,
        playoffs: row.get(13)?,
        neutral_destination: row.get(14)?,
    })
}

fn map_ai_game(row: &rusqlite::Row) -> rusqlite::Result<AiGameRecord> {
    Ok(AiGameRecord {
        game_id: row.get(0)?,
        home_team: row.get(1)?,
        away_team: row.get(2)?,
        home_points: row.get(3)?,
        away_points: row.get(4)?,
        elo_spread: row.get(5)?,
        ai_spread: row.get(6)?,
    })
}

/// SQLite schema (idempotent CREATE IF NOT EXISTS)
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS seasons (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    season  TEXT    NOT NULL UNIQUE,
    length  INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS teams (
    name       TEXT PRIMARY KEY,
    ticker     TEXT NOT NULL UNIQUE,
    latitude   REAL NOT NULL,
    longitude  REAL NOT NULL,
    elo        REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS games (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    season_id           INTEGER NOT NULL,
    week                TEXT    NOT NULL,
    home_team           TEXT    NOT NULL,
    away_team           TEXT    NOT NULL,
    home_points         INTEGER,
    away_points         INTEGER,
    home_yards          INTEGER,
    away_yards          INTEGER,
    home_turnovers      INTEGER,
    away_turnovers      INTEGER,
    home_pregame_elo    REAL    NOT NULL,
    away_pregame_elo    REAL    NOT NULL,
    playoffs            INTEGER NOT NULL DEFAULT 0,
    neutral_destination TEXT,
    UNIQUE (season_id, week, home_team, away_team),
    FOREIGN KEY (season_id) REFERENCES seasons(id)
);

CREATE TABLE IF NOT EXISTS ai_predictions (
    game_id     INTEGER PRIMARY KEY,
    elo_spread  REAL NOT NULL,
    ai_spread   REAL NOT NULL,
    FOREIGN KEY (game_id) REFERENCES games(id)
);

CREATE INDEX IF NOT EXISTS idx_games_season_week ON games(season_id, week);
"#;

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn team(name: &str, ticker: &str, lat: f64, long: f64, elo: f64) -> Team {
        Team {
            name: name.into(),
            ticker: ticker.into(),
            latitude: lat,
            longitude: long,
            elo,
        }
    }

    pub(crate) fn game(
        season: &str,
        week: Week,
        home: &str,
        away: &str,
        ratings: (f64, f64),
        points: Option<(i32, i32)>,
    ) -> GameRecord {
        GameRecord {
            id: None,
            season: season.into(),
            week,
            home_team: home.into(),
            away_team: away.into(),
            home_points: points.map(|p| p.0),
            away_points: points.map(|p| p.1),
            home_yards: None,
            away_yards: None,
            home_turnovers: None,
            away_turnovers: None,
            home_rating: ratings.0,
            away_rating: ratings.1,
            playoffs: week.is_playoff(),
            neutral_destination: None,
        }
    }

    #[test]
    fn seasons_are_unique_and_ordered() {
        let db = Database::in_memory().unwrap();
        let a = db.insert_season("2023-2024", 18).unwrap();
        db.insert_season("2022-2023", 18).unwrap();
        assert_eq!(db.insert_season("2023-2024", 18).unwrap(), a);

        let names: Vec<String> = db.list_seasons().unwrap().into_iter().map(|s| s.season).collect();
        assert_eq!(names, vec!["2022-2023", "2023-2024"]);
        assert_eq!(db.latest_season().unwrap().unwrap().season, "2023-2024");
    }

    #[test]
    fn team_upsert_and_elo_update() {
        let db = Database::in_memory().unwrap();
        db.upsert_team(&team("Kansas City Chiefs", "KC", 39.099789, -94.578560, 1505.0))
            .unwrap();
        db.set_team_elo("Kansas City Chiefs", 1560.0).unwrap();
        let kc = db.get_team("Kansas City Chiefs").unwrap().unwrap();
        assert_eq!(kc.elo, 1560.0);
        assert!(db.get_team("Nobody").unwrap().is_none());
        assert!(db.set_team_elo("Nobody", 1500.0).is_err());
    }

    #[test]
    fn week_games_round_trip() {
        let db = Database::in_memory().unwrap();
        db.insert_season("2022-2023", 18).unwrap();
        let played = game(
            "2022-2023",
            Week::Regular(1),
            "Kansas City Chiefs",
            "Houston Texans",
            (1600.0, 1500.0),
            Some((24, 17)),
        );
        let id = db.insert_game(&played).unwrap();
        // Duplicate insert keeps the original row
        assert_eq!(db.insert_game(&played).unwrap(), id);
        db.insert_game(&game(
            "2022-2023",
            Week::SuperBowl,
            "Philadelphia Eagles",
            "Kansas City Chiefs",
            (1650.0, 1640.0),
            None,
        ))
        .unwrap();

        let week1 = db.week_games("2022-2023", Week::Regular(1)).unwrap();
        assert_eq!(week1.len(), 1);
        assert_eq!(week1[0].id, Some(id));
        assert_eq!(week1[0].home_points, Some(24));
        assert_eq!(week1[0].home_rating, 1600.0);

        let sb = db.week_games("2022-2023", Week::SuperBowl).unwrap();
        assert_eq!(sb.len(), 1);
        assert!(sb[0].playoffs);
        assert_eq!(sb[0].home_points, None);

        assert_eq!(db.season_games("2022-2023").unwrap().len(), 2);
        assert!(db.week_games("2021-2022", Week::Regular(1)).unwrap().is_empty());
    }

    #[test]
    fn insert_game_requires_known_season() {
        let db = Database::in_memory().unwrap();
        let g = game("1999-2000", Week::Regular(1), "A", "B", (1500.0, 1500.0), None);
        assert!(db.insert_game(&g).is_err());
    }

    #[test]
    fn ai_predictions_join_games() {
        let db = Database::in_memory().unwrap();
        db.insert_season("2023-2024", 18).unwrap();
        let id = db
            .insert_game(&game(
                "2023-2024",
                Week::Regular(5),
                "Washington Commanders",
                "Chicago Bears",
                (1536.0, 1333.0),
                Some((20, 40)),
            ))
            .unwrap();
        db.upsert_ai_prediction(id, -8.12, -12.8).unwrap();
        db.upsert_ai_prediction(id, -8.12, -11.0).unwrap();

        let games = db.ai_week_games("2023-2024", Week::Regular(5)).unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].game_id, id);
        assert_eq!(games[0].ai_spread, -11.0);
        assert_eq!(games[0].away_points, Some(40));
        assert_eq!(db.ai_season_games("2023-2024").unwrap().len(), 1);
    }

    #[test]
    fn recording_a_result_twice_shifts_ratings_once() {
        let db = Database::in_memory().unwrap();
        db.insert_season("2023-2024", 18).unwrap();
        db.upsert_team(&team("Chicago Bears", "CHI", 41.8, -87.7, 1333.0)).unwrap();
        db.upsert_team(&team("Washington Commanders", "WAS", 38.9, -76.9, 1536.0))
            .unwrap();
        let played = game(
            "2023-2024",
            Week::Regular(5),
            "Washington Commanders",
            "Chicago Bears",
            (1560.0, 1309.0),
            Some((20, 40)),
        );

        assert!(db.record_result(&played, -38.0).unwrap());
        assert!(!db.record_result(&played, -38.0).unwrap());

        assert_eq!(db.get_team("Washington Commanders").unwrap().unwrap().elo, 1498.0);
        assert_eq!(db.get_team("Chicago Bears").unwrap().unwrap().elo, 1371.0);
        assert_eq!(db.week_games("2023-2024", Week::Regular(5)).unwrap().len(), 1);
    }

    #[test]
    fn failed_rating_update_rolls_back_the_game() {
        let db = Database::in_memory().unwrap();
        db.insert_season("2023-2024", 18).unwrap();
        db.upsert_team(&team("Chicago Bears", "CHI", 41.8, -87.7, 1333.0)).unwrap();
        let played = game(
            "2023-2024",
            Week::Regular(5),
            "Chicago Bears",
            "Nobody",
            (1350.0, 1500.0),
            Some((20, 10)),
        );
        assert!(db.record_result(&played, 10.0).is_err());
        assert!(db.season_games("2023-2024").unwrap().is_empty());
        assert_eq!(db.get_team("Chicago Bears").unwrap().unwrap().elo, 1333.0);
    }

    #[test]
    fn latest_week_orders_playoffs_after_regular_season() {
        let db = Database::in_memory().unwrap();
        db.insert_season("2022-2023", 18).unwrap();
        assert_eq!(db.latest_week("2022-2023").unwrap(), None);
        for week in [Week::Regular(9), Week::WildCard, Week::Regular(18)] {
            db.insert_game(&game("2022-2023", week, "A", "B", (1500.0, 1500.0), Some((1, 0))))
                .unwrap();
        }
        assert_eq!(db.latest_week("2022-2023").unwrap(), Some(Week::WildCard));
    }

    #[test]
    fn lookups_by_ticker_and_matchup() {
        let db = Database::in_memory().unwrap();
        db.insert_season("2022-2023", 18).unwrap();
        db.upsert_team(&team("Arizona Cardinals", "ARI", 33.5, -112.3, 1505.0)).unwrap();
        assert_eq!(db.get_team_by_ticker("ARI").unwrap().unwrap().name, "Arizona Cardinals");
        assert!(db.get_team_by_ticker("XXX").unwrap().is_none());

        let id = db
            .insert_game(&game("2022-2023", Week::SuperBowl, "A", "B", (1600.0, 1590.0), None))
            .unwrap();
        let found = db.find_game("2022-2023", Week::SuperBowl, "A", "B").unwrap().unwrap();
        assert_eq!(found.id, Some(id));
        assert!(db.find_game("2022-2023", Week::SuperBowl, "B", "A").unwrap().is_none());
    }
}
