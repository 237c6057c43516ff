use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use tracing::debug;
use url::Url;

use super::schedule::ScheduleRow;
use crate::db::models::Week;

/// Trait that every season-schedule source must implement.
#[async_trait]
pub trait ScheduleProvider: Send + Sync {
    /// Rows for one week of the season starting in `season_year`.
    async fn fetch_week(&self, season_year: i32, week: Week) -> Result<Vec<ScheduleRow>>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

fn rows_for_week(rows: Vec<ScheduleRow>, week: Week) -> Vec<ScheduleRow> {
    rows.into_iter().filter(|r| r.week_num == week).collect()
}

/// Schedule served as a JSON array of rows at `{base}/{year}/games.json`.
pub struct HttpSchedule {
    http: Client,
    base_url: Url,
}

impl HttpSchedule {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        // Url::join replaces the last segment unless the base ends in '/'
        let mut base_url =
            Url::parse(base_url).with_context(|| format!("Invalid schedule URL '{}'", base_url))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(HttpSchedule { http, base_url })
    }

    fn season_url(&self, season_year: i32) -> Result<Url> {
        self.base_url
            .join(&format!("{}/games.json", season_year))
            .context("Failed to build schedule URL")
    }
}

#[async_trait]
impl ScheduleProvider for HttpSchedule {
    fn name(&self) -> &str {
        "http-schedule"
    }

    async fn fetch_week(&self, season_year: i32, week: Week) -> Result<Vec<ScheduleRow>> {
        let url = self.season_url(season_year)?;
        debug!("Fetching schedule from {}", url);

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .context("Schedule request failed")?;

        if !resp.status().is_success() {
            anyhow::bail!("Schedule source error: {}", resp.status());
        }

        let rows: Vec<ScheduleRow> = resp
            .json()
            .await
            .context("Failed to parse schedule response")?;
        Ok(rows_for_week(rows, week))
    }
}

/// Schedule read from a local JSON file, for offline runs.
pub struct FileSchedule {
    path: PathBuf,
}

impl FileSchedule {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSchedule { path: path.into() }
    }
}

#[async_trait]
impl ScheduleProvider for FileSchedule {
    fn name(&self) -> &str {
        "file-schedule"
    }

    async fn fetch_week(&self, _season_year: i32, week: Week) -> Result<Vec<ScheduleRow>> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read schedule file {}", self.path.display()))?;
        let rows: Vec<ScheduleRow> =
            serde_json::from_str(&text).context("Failed to parse schedule file")?;
        Ok(rows_for_week(rows, week))
    }
}
