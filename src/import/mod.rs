//! Offline data loads run at startup: historical seasons replayed through
//! the Elo model, and AI spreads produced by the external model.

pub mod ai;
pub mod history;

pub use ai::{import_ai_spreads, AiSpreadRow};
pub use history::{replay_history, HistorySeason};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Read and parse a JSON file.
pub async fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}
