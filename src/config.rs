use clap::Parser;
use std::net::SocketAddr;

/// NFL spread predictions and game-card pages
#[derive(Parser, Debug, Clone)]
#[command(name = "nfl-model", version, about)]
pub struct Config {
    /// HTTP listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "127.0.0.1:5000")]
    pub listen_addr: String,

    /// SQLite database path
    #[arg(long, env = "DATABASE_PATH", default_value = "nfl.db")]
    pub database_path: String,

    /// Directory served under /assets (result icons)
    #[arg(long, env = "ASSETS_DIR", default_value = "static/assets")]
    pub assets_dir: String,

    /// Year the tracked season starts in (2023 → "2023-2024")
    #[arg(long, env = "SEASON", default_value = "2023")]
    pub season: i32,

    /// Base URL of the schedule source; rows are read from {url}/{season}/games.json
    #[arg(long, env = "SCHEDULE_URL")]
    pub schedule_url: Option<String>,

    /// Local JSON schedule file, used instead of SCHEDULE_URL
    #[arg(long, env = "SCHEDULE_FILE")]
    pub schedule_file: Option<String>,

    /// Regress team ratings to preseason values when opening a new season
    #[arg(long, env = "ROLL_SEASON", default_value = "false")]
    pub roll_season: bool,

    /// JSON file of past seasons to replay into the ratings at startup
    #[arg(long, env = "HISTORY_FILE")]
    pub history_file: Option<String>,

    /// JSON file of AI model spreads to attach to stored games at startup
    #[arg(long, env = "AI_SPREADS_FILE")]
    pub ai_spreads_file: Option<String>,

    /// Background refresh interval for the upcoming week, in seconds (0 disables)
    #[arg(long, env = "REFRESH_INTERVAL_SECS", default_value = "3600")]
    pub refresh_interval_secs: u64,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.listen_addr
            .parse::<SocketAddr>()
            .map_err(|e| anyhow::anyhow!("invalid listen_addr '{}': {}", self.listen_addr, e))?;
        if self.schedule_url.is_some() && self.schedule_file.is_some() {
            anyhow::bail!("set only one of SCHEDULE_URL and SCHEDULE_FILE");
        }
        if !(1920..=2100).contains(&self.season) {
            anyhow::bail!("season must be between 1920 and 2100");
        }
        Ok(())
    }

    pub fn has_schedule_source(&self) -> bool {
        self.schedule_url.is_some() || self.schedule_file.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::parse_from(std::iter::once("nfl-model").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_are_valid() {
        let c = parse(&[]);
        assert!(c.validate().is_ok());
        assert_eq!(c.listen_addr, "127.0.0.1:5000");
        assert_eq!(c.season, 2023);
        assert!(!c.has_schedule_source());
    }

    #[test]
    fn rejects_two_schedule_sources() {
        let c = parse(&["--schedule-url", "http://x/", "--schedule-file", "s.json"]);
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_bad_listen_addr() {
        let c = parse(&["--listen-addr", "localhost"]);
        assert!(c.validate().is_err());
    }

    #[test]
    fn import_files_from_flags() {
        let c = parse(&["--history-file", "history.json", "--ai-spreads-file", "ai.json"]);
        assert!(c.validate().is_ok());
        assert_eq!(c.history_file.as_deref(), Some("history.json"));
        assert_eq!(c.ai_spreads_file.as_deref(), Some("ai.json"));
    }

    #[test]
    fn rejects_out_of_range_season() {
        let c = parse(&["--season", "1800"]);
        assert!(c.validate().is_err());
    }
}
