//! HTTP request handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use sonara_common::track::SearchResult;
use sonara_common::{RepeatMode, TrackDescriptor};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::server::AppContext;
use crate::catalog::Locale;
use crate::db::{search_history, settings};
use crate::error::Error;
use crate::native::NativeState;
use crate::playback::{PlayOutcome, PlaybackSession, QueueEntry, SkipPrevious};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

type ApiError = (StatusCode, Json<StatusResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

/// Session plus what the native player reports right now
#[derive(Debug, Serialize)]
pub struct PlayerStatus {
    session: PlaybackSession,
    native_state: Option<NativeState>,
    position: Option<f64>,
    duration: Option<f64>,
    volume: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct QueueResponse {
    context: String,
    entries: Vec<QueueEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SetQueueRequest {
    context: String,
    tracks: Vec<TrackDescriptor>,
}

#[derive(Debug, Serialize)]
pub struct PlayResponse {
    outcome: PlayOutcome,
}

/// `outcome` is null when there was nothing to skip to
#[derive(Debug, Serialize)]
pub struct SkipNextResponse {
    outcome: Option<PlayOutcome>,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    state: Option<NativeState>,
}

#[derive(Debug, Deserialize)]
pub struct SeekRequest {
    position: f64,
}

#[derive(Debug, Serialize)]
pub struct SeekResponse {
    position: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RepeatRequest {
    mode: RepeatMode,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShuffleBody {
    enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    queries: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ClearedResponse {
    removed: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SplashBody {
    shown: bool,
}

fn api_error(e: Error) -> ApiError {
    let status = match &e {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::BadRequest(_) | Error::Queue(_) => StatusCode::BAD_REQUEST,
        Error::Http(_) | Error::Resolution(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("Request failed: {}", e);
    } else {
        warn!("Request rejected: {}", e);
    }
    (
        status,
        Json(StatusResponse {
            status: format!("error: {}", e),
        }),
    )
}

// ============================================================================
// Health / Status
// ============================================================================

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "sonara_player".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /status
///
/// Native readings that fail are reported as null.
pub async fn status(State(ctx): State<AppContext>) -> Json<PlayerStatus> {
    let session = ctx.coordinator.snapshot().await;
    let player = ctx.coordinator.player();

    let native_state = player.state().await.ok();
    let progress = player.progress().await.ok();
    let volume = player.volume().await.ok();

    Json(PlayerStatus {
        session,
        native_state,
        position: progress.map(|p| p.position),
        duration: progress.map(|p| p.duration),
        volume,
    })
}

// ============================================================================
// Queue
// ============================================================================

/// GET /queue
pub async fn get_queue(State(ctx): State<AppContext>) -> Json<QueueResponse> {
    let queue = ctx.coordinator.queue().await;
    Json(QueueResponse {
        context: queue.context().to_string(),
        entries: queue.entries().to_vec(),
    })
}

/// POST /queue - replace the queue with a browsing context
pub async fn set_queue(
    State(ctx): State<AppContext>,
    Json(req): Json<SetQueueRequest>,
) -> Json<QueueResponse> {
    let tracks = req.tracks.into_iter().map(TrackDescriptor::into_track).collect();
    let entries = ctx.coordinator.set_queue(&req.context, tracks).await;
    Json(QueueResponse {
        context: req.context,
        entries,
    })
}

// ============================================================================
// Playback
// ============================================================================

/// POST /play - play any accepted track shape
pub async fn play(
    State(ctx): State<AppContext>,
    Json(descriptor): Json<TrackDescriptor>,
) -> Json<PlayResponse> {
    let outcome = ctx.coordinator.play_descriptor(descriptor).await;
    Json(PlayResponse { outcome })
}

/// POST /play/:entry_id - play a queue entry
pub async fn play_entry(
    State(ctx): State<AppContext>,
    Path(entry_id): Path<Uuid>,
) -> ApiResult<PlayResponse> {
    info!("Play entry request: {}", entry_id);
    let outcome = ctx.coordinator.play_entry(entry_id).await.map_err(api_error)?;
    Ok(Json(PlayResponse { outcome }))
}

/// POST /skip/next
pub async fn skip_next(State(ctx): State<AppContext>) -> Json<SkipNextResponse> {
    let outcome = ctx.coordinator.skip_next().await;
    Json(SkipNextResponse { outcome })
}

/// POST /skip/previous
pub async fn skip_previous(State(ctx): State<AppContext>) -> Json<SkipPrevious> {
    Json(ctx.coordinator.skip_previous().await)
}

/// POST /toggle - play/pause
pub async fn toggle(State(ctx): State<AppContext>) -> Json<ToggleResponse> {
    let state = ctx.coordinator.toggle_play_pause().await;
    Json(ToggleResponse { state })
}

/// POST /seek
pub async fn seek(
    State(ctx): State<AppContext>,
    Json(req): Json<SeekRequest>,
) -> ApiResult<SeekResponse> {
    if !req.position.is_finite() {
        return Err(api_error(Error::BadRequest("position must be a finite number".to_string())));
    }
    let position = ctx.coordinator.seek(req.position).await;
    Ok(Json(SeekResponse { position }))
}

// ============================================================================
// Modes and detail view
// ============================================================================

/// PUT /repeat
pub async fn set_repeat(State(ctx): State<AppContext>, Json(req): Json<RepeatRequest>) -> StatusCode {
    ctx.coordinator.set_repeat_mode(req.mode).await;
    StatusCode::NO_CONTENT
}

/// PUT /shuffle
pub async fn set_shuffle(State(ctx): State<AppContext>, Json(req): Json<ShuffleBody>) -> StatusCode {
    ctx.coordinator.set_shuffle(req.enabled).await;
    StatusCode::NO_CONTENT
}

/// POST /adv/open
pub async fn open_adv(State(ctx): State<AppContext>) -> StatusCode {
    ctx.coordinator.open_adv().await;
    StatusCode::NO_CONTENT
}

/// POST /adv/close
pub async fn close_adv(State(ctx): State<AppContext>) -> StatusCode {
    ctx.coordinator.close_adv().await;
    StatusCode::NO_CONTENT
}

// ============================================================================
// Search and preferences
// ============================================================================

/// GET /search?q= - remote search; non-blank queries go into the history
pub async fn search(
    State(ctx): State<AppContext>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Vec<SearchResult>> {
    let query = params.q.trim();
    if query.is_empty() {
        return Ok(Json(Vec::new()));
    }

    if let Err(e) = search_history::record(&ctx.db_pool, query).await {
        warn!("Could not record search '{}': {}", query, e);
    }
    let results = ctx.catalog.search(query).await.map_err(api_error)?;
    Ok(Json(results))
}

/// GET /search/history
pub async fn search_history(State(ctx): State<AppContext>) -> ApiResult<HistoryResponse> {
    let queries = search_history::list(&ctx.db_pool).await.map_err(api_error)?;
    Ok(Json(HistoryResponse { queries }))
}

/// DELETE /search/history
pub async fn clear_search_history(State(ctx): State<AppContext>) -> ApiResult<ClearedResponse> {
    let removed = search_history::clear(&ctx.db_pool).await.map_err(api_error)?;
    info!("Cleared {} remembered searches", removed);
    Ok(Json(ClearedResponse { removed }))
}

/// GET /splash
pub async fn get_splash(State(ctx): State<AppContext>) -> ApiResult<SplashBody> {
    let shown = settings::get_splash_shown(&ctx.db_pool).await.map_err(api_error)?;
    Ok(Json(SplashBody { shown }))
}

/// PUT /splash
pub async fn set_splash(
    State(ctx): State<AppContext>,
    Json(req): Json<SplashBody>,
) -> ApiResult<SplashBody> {
    settings::set_splash_shown(&ctx.db_pool, req.shown)
        .await
        .map_err(api_error)?;
    Ok(Json(req))
}

/// GET /locale - country for the regional chart
pub async fn locale(State(ctx): State<AppContext>) -> ApiResult<Locale> {
    let locale = ctx.catalog.locate().await.map_err(api_error)?;
    Ok(Json(locale))
}
