use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::error;

mod pages;

use crate::cards::{self, GameCard};
use crate::db::models::Week;
use crate::db::Database;
use crate::predict::AccuracySummary;
use crate::upcoming::{eastern_today, UpcomingGame, UpcomingTracker};

type HandlerError = (StatusCode, String);

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// `None` when no schedule source is configured
    pub tracker: Option<Arc<Mutex<UpcomingTracker>>>,
}

/// Build the Axum router for the pages and JSON API.
pub fn router(state: AppState, assets_dir: &str) -> Router {
    Router::new()
        .route("/", get(|| async { Html(pages::HOME_HTML) }))
        .route("/past-games", get(|| async { Html(pages::PAST_GAMES_HTML) }))
        .route("/upcoming", get(|| async { Html(pages::UPCOMING_HTML) }))
        .route("/seasons", get(seasons_handler))
        .route("/games/:season/:week", get(games_handler))
        .route("/ai-games/:season/:week", get(ai_games_handler))
        .route("/team/:name", get(team_handler))
        .route("/get-upcoming-games", get(upcoming_handler))
        .route("/api/options", get(options_handler))
        .route("/api/cards/:season/:week", get(cards_handler))
        .route("/api/upcoming-cards", get(upcoming_cards_handler))
        .route("/api/accuracy/:season", get(accuracy_handler))
        .nest_service("/assets", ServeDir::new(assets_dir))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

fn internal(e: anyhow::Error) -> HandlerError {
    error!("Request failed: {:#}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

fn parse_week(week: &str) -> Result<Week, HandlerError> {
    week.parse()
        .map_err(|e: crate::db::models::WeekParseError| (StatusCode::BAD_REQUEST, e.to_string()))
}

/// GET /seasons
async fn seasons_handler(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, HandlerError> {
    state.db.list_seasons().map(Json).map_err(internal)
}

/// GET /games/{season}/{week}
async fn games_handler(
    State(state): State<Arc<AppState>>,
    Path((season, week)): Path<(String, String)>,
) -> Result<impl IntoResponse, HandlerError> {
    let week = parse_week(&week)?;
    state.db.week_games(&season, week).map(Json).map_err(internal)
}

/// GET /ai-games/{season}/{week}
async fn ai_games_handler(
    State(state): State<Arc<AppState>>,
    Path((season, week)): Path<(String, String)>,
) -> Result<impl IntoResponse, HandlerError> {
    let week = parse_week(&week)?;
    state.db.ai_week_games(&season, week).map(Json).map_err(internal)
}

/// GET /team/{name}
async fn team_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    match state.db.get_team(&name).map_err(internal)? {
        Some(team) => Ok(Json(team)),
        None => Err((StatusCode::NOT_FOUND, format!("unknown team '{}'", name))),
    }
}

async fn refresh_upcoming(state: &AppState) -> Result<(Vec<UpcomingGame>, Option<Week>), HandlerError> {
    let Some(tracker) = &state.tracker else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "no schedule source configured".to_string(),
        ));
    };
    let mut tracker = tracker.lock().await;
    let games = tracker.refresh(eastern_today()).await.map_err(internal)?;
    Ok((games, tracker.current_week()))
}

/// GET /get-upcoming-games
async fn upcoming_handler(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, HandlerError> {
    let (games, _) = refresh_upcoming(&state).await?;
    Ok(Json(games))
}

#[derive(Debug, Serialize)]
struct OptionsResponse {
    seasons: String,
    weeks: String,
}

/// GET /api/options: dropdown contents for the past-games page
async fn options_handler(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, HandlerError> {
    let seasons = state.db.list_seasons().map_err(internal)?;
    Ok(Json(OptionsResponse {
        seasons: cards::season_options(&seasons),
        weeks: cards::week_options(),
    }))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Model {
    #[default]
    Elo,
    Ai,
}

#[derive(Debug, Deserialize)]
struct CardsQuery {
    #[serde(default)]
    model: Model,
}

#[derive(Debug, Serialize)]
struct CardsResponse {
    header: String,
    html: String,
    summary: AccuracySummary,
}

impl CardsResponse {
    fn new(header: String, cards: &[GameCard]) -> Self {
        CardsResponse {
            header,
            html: cards::render_cards(cards),
            summary: cards::summarize(cards),
        }
    }
}

/// GET /api/cards/{season}/{week}?model=elo|ai
async fn cards_handler(
    State(state): State<Arc<AppState>>,
    Path((season, week)): Path<(String, String)>,
    Query(query): Query<CardsQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let week = parse_week(&week)?;
    let cards = match query.model {
        Model::Elo => cards::elo_cards(&state.db.week_games(&season, week).map_err(internal)?),
        Model::Ai => cards::ai_cards(&state.db.ai_week_games(&season, week).map_err(internal)?),
    };
    Ok(Json(CardsResponse::new(
        cards::week_header(week, Some(&season)),
        &cards,
    )))
}

/// GET /api/upcoming-cards
async fn upcoming_cards_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HandlerError> {
    let (games, week) = refresh_upcoming(&state).await?;
    let header = week
        .map(|w| cards::week_header(w, None))
        .unwrap_or_default();
    Ok(Json(CardsResponse::new(header, &cards::upcoming_cards(&games))))
}

#[derive(Debug, Serialize)]
struct AccuracyReport {
    season: String,
    elo: AccuracySummary,
    elo_hit_rate: Option<f64>,
    ai: AccuracySummary,
    ai_hit_rate: Option<f64>,
}

/// GET /api/accuracy/{season}
async fn accuracy_handler(
    State(state): State<Arc<AppState>>,
    Path(season): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let elo = cards::elo_cards(&state.db.season_games(&season).map_err(internal)?);
    let ai = cards::ai_cards(&state.db.ai_season_games(&season).map_err(internal)?);
    let (elo, ai) = (cards::summarize(&elo), cards::summarize(&ai));
    Ok(Json(AccuracyReport {
        season,
        elo,
        elo_hit_rate: elo.hit_rate(),
        ai,
        ai_hit_rate: ai.hit_rate(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::game;
    use crate::upcoming::tests::{row, seeded_db, StaticSchedule};
    use axum::response::Response;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn state_with_games() -> Arc<AppState> {
        let db = Database::in_memory().unwrap();
        db.insert_season("2022-2023", 18).unwrap();
        let id = db
            .insert_game(&game(
                "2022-2023",
                Week::Regular(1),
                "Kansas City Chiefs",
                "Arizona Cardinals",
                (1600.0, 1500.0),
                Some((44, 21)),
            ))
            .unwrap();
        db.insert_game(&game(
            "2022-2023",
            Week::Regular(1),
            "Dallas Cowboys",
            "Tampa Bay Buccaneers",
            (1550.0, 1550.0),
            Some((3, 19)),
        ))
        .unwrap();
        db.upsert_ai_prediction(id, -4.0, 6.5).unwrap();
        Arc::new(AppState { db, tracker: None })
    }

    #[tokio::test]
    async fn bad_week_is_rejected() {
        let state = state_with_games();
        let err = games_handler(State(state), Path(("2022-2023".into(), "Week1".into())))
            .await
            .err()
            .unwrap();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn elo_cards_for_a_week() {
        let state = state_with_games();
        let resp = cards_handler(
            State(state),
            Path(("2022-2023".into(), "1".into())),
            Query(CardsQuery { model: Model::Elo }),
        )
        .await
        .unwrap()
        .into_response();
        let body = body_json(resp).await;
        assert_eq!(body["header"], "Week 1 - 2022-2023");
        assert_eq!(body["summary"]["correct"], 2);
        assert_eq!(body["summary"]["incorrect"], 0);
        assert!(body["html"].as_str().unwrap().contains("- 4.0"));
    }

    #[tokio::test]
    async fn ai_cards_and_accuracy() {
        let state = state_with_games();
        let resp = cards_handler(
            State(state.clone()),
            Path(("2022-2023".into(), "1".into())),
            Query(CardsQuery { model: Model::Ai }),
        )
        .await
        .unwrap()
        .into_response();
        let body = body_json(resp).await;
        // Model picked the visitor by 6.5; home won by 23
        assert_eq!(body["summary"]["incorrect"], 1);
        assert!(body["html"].as_str().unwrap().contains("+6.5"));

        let resp = accuracy_handler(State(state), Path("2022-2023".into()))
            .await
            .unwrap()
            .into_response();
        let body = body_json(resp).await;
        assert_eq!(body["elo"]["correct"], 2);
        assert_eq!(body["ai"]["incorrect"], 1);
        assert_eq!(body["elo_hit_rate"], 1.0);
        assert_eq!(body["ai_hit_rate"], 0.0);
    }

    #[tokio::test]
    async fn unknown_team_is_not_found() {
        let state = state_with_games();
        let err = team_handler(State(state), Path("Nobody".into())).await.err().unwrap();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn upcoming_requires_schedule_source() {
        let state = state_with_games();
        let err = upcoming_handler(State(state)).await.err().unwrap();
        assert_eq!(err.0, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn upcoming_cards_use_tracker() {
        let db = seeded_db();
        // Far-future game keeps the tracker on week 1 regardless of today's date
        let provider = Arc::new(StaticSchedule {
            rows: vec![row(1, "2999-09-10", "Chicago Bears", "@", "Washington Commanders", ("", ""))],
            ..Default::default()
        });
        let tracker = UpcomingTracker::new(db.clone(), provider, 2023, false);
        let state = Arc::new(AppState {
            db,
            tracker: Some(Arc::new(Mutex::new(tracker))),
        });
        let resp = upcoming_cards_handler(State(state)).await.unwrap().into_response();
        let body = body_json(resp).await;
        assert_eq!(body["header"], "Week 1");
        assert_eq!(body["summary"]["pending"], 1);
        let html = body["html"].as_str().unwrap();
        assert!(html.contains("Washington Commanders"));
        assert!(!html.contains("<img"));
    }

    #[tokio::test]
    async fn options_list_seasons_and_weeks() {
        let state = state_with_games();
        let resp = options_handler(State(state)).await.unwrap().into_response();
        let body = body_json(resp).await;
        assert!(body["seasons"].as_str().unwrap().contains("2022-2023"));
        assert_eq!(body["weeks"].as_str().unwrap().matches("<option").count(), 22);
    }
}
