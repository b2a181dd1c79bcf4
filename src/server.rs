use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{info, warn};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::data::{Combination, Dataset};
use crate::error::Error;
use crate::filters::FilterConfig;
use crate::generator;
use crate::ingest::{self, RawCourse};
use crate::session::{RankedSchedules, RankingSession};
use crate::transport::Chunk;

type HandlerError = (StatusCode, String);

/// Shared by all handlers. The mutex serializes generation runs and
/// re-rankings against the single stored session.
#[derive(Clone)]
pub struct AppState {
    session: Arc<Mutex<Option<RankingSession>>>,
    chunk_size: usize,
}

impl AppState {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            session: Arc::new(Mutex::new(None)),
            chunk_size,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub dataset: Dataset,
    #[serde(default)]
    pub filters: FilterConfig,
}

fn error_response(e: Error) -> HandlerError {
    match e {
        Error::Config(_) => (StatusCode::BAD_REQUEST, e.to_string()),
        Error::Transport(_) | Error::Json(_) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

fn no_session() -> HandlerError {
    (
        StatusCode::CONFLICT,
        "No timetables generated yet".to_string(),
    )
}

async fn generate_handler(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<RankedSchedules>, HandlerError> {
    let mut stored = state.session.lock().await;
    let session = tokio::task::spawn_blocking(move || {
        RankingSession::generate(&request.dataset, request.filters)
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
    .map_err(error_response)?;

    let ranked = session.ranked();
    info!(
        "Generated {} feasible timetables out of {} candidates",
        ranked.report.feasible, ranked.report.candidates
    );
    *stored = Some(session);
    Ok(Json(ranked))
}

async fn combinations_handler(
    Json(dataset): Json<Dataset>,
) -> Result<Json<Vec<Combination>>, HandlerError> {
    let combinations = tokio::task::spawn_blocking(move || generator::enumerate_all(&dataset))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(combinations))
}

async fn priorities_handler(
    State(state): State<AppState>,
    Json(filters): Json<FilterConfig>,
) -> Result<Json<RankedSchedules>, HandlerError> {
    let mut stored = state.session.lock().await;
    let session = stored.as_mut().ok_or_else(no_session)?;
    session.reprioritize(filters).map_err(error_response)?;
    Ok(Json(session.ranked()))
}

async fn chunk_handler(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<Chunk>, HandlerError> {
    let mut stored = state.session.lock().await;
    let session = stored.as_mut().ok_or_else(no_session)?;
    let chunks = session.chunks(state.chunk_size).map_err(error_response)?;
    let total = chunks.len();
    chunks.get(index).cloned().map(Json).ok_or_else(|| {
        warn!("Chunk {} requested but only {} exist", index, total);
        (
            StatusCode::NOT_FOUND,
            format!("Chunk {index} is outside 0..{total}"),
        )
    })
}

async fn instructors_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, HandlerError> {
    let stored = state.session.lock().await;
    let session = stored.as_ref().ok_or_else(no_session)?;
    Ok(Json(session.instructors()))
}

async fn ingest_handler(Json(courses): Json<Vec<RawCourse>>) -> Json<Dataset> {
    Json(ingest::ingest(&courses))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/timetable/generate", post(generate_handler))
        .route("/v1/timetable/combinations", post(combinations_handler))
        .route("/v1/timetable/priorities", post(priorities_handler))
        .route("/v1/timetable/chunks/:index", get(chunk_handler))
        .route("/v1/timetable/instructors", get(instructors_handler))
        .route("/v1/courses/ingest", post(ingest_handler))
        .with_state(state)
}

pub async fn run_server(addr: &str, chunk_size: usize) -> std::io::Result<()> {
    let app = router(AppState::new(chunk_size));

    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await
}
