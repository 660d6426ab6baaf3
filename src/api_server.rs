// Axum API server for the plant catalog.
//
// Thin HTTP layer over the canonical catalog modules: filter evaluator,
// pager, favorites store, import reconciler. List responses are served
// through a short-TTL cache that is dropped wholesale after an import.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};

use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use moka::future::Cache;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::assistant;
use crate::catalog::CatalogStore;
use crate::error::CatalogError;
use crate::favorites::FavoritesStore;
use crate::filter::PlantFilters;
use crate::import::{self, DuplicatePolicy, ImportProgress};
use crate::model::PlantRecord;
use crate::pager;
use crate::source;

/// Page size when the client does not ask for one.
const DEFAULT_PER_PAGE: usize = 20;
/// Upper bound on client-requested page sizes.
const MAX_PER_PAGE: usize = 100;

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub favorites: Arc<Mutex<FavoritesStore>>,
    pub cache: Cache<String, serde_json::Value>,
    /// Single-flight guard: held for the duration of an import run.
    pub import_lock: Arc<tokio::sync::Mutex<()>>,
    pub import_progress: Arc<ImportProgress>,
    /// Default import source (URL or file path) from configuration.
    pub import_source: Option<String>,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        favorites: FavoritesStore,
        import_source: Option<String>,
    ) -> Self {
        let cache = Cache::builder()
            .max_capacity(1_000)
            .time_to_live(Duration::from_secs(300)) // 5 min TTL
            .build();

        Self {
            catalog,
            favorites: Arc::new(Mutex::new(favorites)),
            cache,
            import_lock: Arc::new(tokio::sync::Mutex::new(())),
            import_progress: Arc::new(ImportProgress::default()),
            import_source,
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Catalog browsing
        .route("/api/plants", get(list_plants))
        .route("/api/plants/:id", get(get_plant))
        .route("/api/benefits", get(list_benefits))

        // Favorites
        .route("/api/favorites", get(list_favorites))
        .route("/api/favorites/:id/toggle", post(toggle_favorite))

        // Watering reminders
        .route("/api/reminders", get(watering_reminders))

        // Assistant (placeholder)
        .route("/api/assistant", get(assistant_greeting).post(assistant_chat))

        // Data import
        .route("/api/import/preview", post(import_preview))
        .route("/api/import/run", post(import_run))
        .route("/api/import/progress", get(import_progress))

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive()) // Allow all origins (adjust for production)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Query params for plant listing: filters plus pagination.
#[derive(Debug, serde::Deserialize)]
struct PlantsQuery {
    pot_size: Option<String>,
    soil_type: Option<String>,
    light_type: Option<String>,
    temperature: Option<String>,
    season: Option<String>,
    benefit: Option<String>,
    page: Option<usize>,
    per_page: Option<usize>,
}

impl PlantsQuery {
    fn filters(&self) -> PlantFilters {
        PlantFilters {
            pot_size: self.pot_size.clone(),
            soil_type: self.soil_type.clone(),
            light_type: self.light_type.clone(),
            temperature: self.temperature.clone(),
            season: self.season.clone(),
            benefit: self.benefit.clone(),
        }
    }
}

async fn list_plants(
    State(state): State<AppState>,
    Query(query): Query<PlantsQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let cache_key = format!("plants:{:?}", query);

    if let Some(cached) = state.cache.get(&cache_key).await {
        tracing::debug!("Cache hit for plant listing");
        return Ok(Json(cached));
    }

    let filters = query.filters();
    let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);

    let matched: Vec<PlantRecord> = state
        .catalog
        .records()
        .into_iter()
        .filter(|record| filters.matches(record))
        .collect();

    // Out-of-range page requests (including any page left over after a
    // filter change shrank the result set) clamp back into range
    let total_pages = pager::total_pages(matched.len(), per_page);
    let page = pager::clamp_page(query.page.unwrap_or(1), total_pages);
    let items = pager::paginate(&matched, page, per_page);

    let result = serde_json::json!({
        "rows": items.len(),
        "data": items,
        "page": page,
        "per_page": per_page,
        "total_pages": total_pages,
        "total": matched.len(),
    });

    state.cache.insert(cache_key, result.clone()).await;

    Ok(Json(result))
}

async fn get_plant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PlantRecord>, AppError> {
    state
        .catalog
        .get(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Plant {} not found", id)))
}

/// Distinct benefit tags, sorted, for the benefit picker.
async fn list_benefits(State(state): State<AppState>) -> Json<serde_json::Value> {
    let mut benefits: Vec<String> = state
        .catalog
        .records()
        .into_iter()
        .map(|record| record.benefit)
        .filter(|benefit| !benefit.is_empty())
        .collect();
    benefits.sort();
    benefits.dedup();

    Json(serde_json::json!({ "benefits": benefits }))
}

async fn list_favorites(State(state): State<AppState>) -> Json<serde_json::Value> {
    let ids = state
        .favorites
        .lock()
        .expect("favorites lock poisoned")
        .ids()
        .to_vec();
    Json(serde_json::json!({ "favorites": ids }))
}

async fn toggle_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if state.catalog.get(&id).is_none() {
        return Err(AppError::NotFound(format!("Plant {} not found", id)));
    }

    let favorite = state
        .favorites
        .lock()
        .expect("favorites lock poisoned")
        .toggle(&id)?;

    Ok(Json(serde_json::json!({ "id": id, "favorite": favorite })))
}

/// Daily watering reminders for favorite plants.
///
/// The schedule is a fixed placeholder ("Today" at 09:00) until per-plant
/// schedules exist; the volume comes from the record.
async fn watering_reminders(State(state): State<AppState>) -> Json<serde_json::Value> {
    let ids = state
        .favorites
        .lock()
        .expect("favorites lock poisoned")
        .ids()
        .to_vec();

    let reminders: Vec<serde_json::Value> = ids
        .iter()
        .filter_map(|id| state.catalog.get(id))
        .map(|plant| {
            serde_json::json!({
                "id": plant.id,
                "name_ar": plant.name_ar,
                "water_ml": plant.water_ml,
                "next_watering": "Today",
                "time": "09:00 AM",
            })
        })
        .collect();

    Json(serde_json::json!({
        "rows": reminders.len(),
        "data": reminders,
    }))
}

/// Conversation opener: the greeting shown before the user says anything.
async fn assistant_greeting() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "reply": assistant::GREETING,
        "suggestions": assistant::SUGGESTIONS,
    }))
}

#[derive(Debug, serde::Deserialize)]
struct AssistantRequest {
    message: String,
}

async fn assistant_chat(
    Json(request): Json<AssistantRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::BadRequest("message must not be empty".to_string()));
    }

    Ok(Json(serde_json::json!({
        "reply": assistant::reply(&request.message),
        "suggestions": assistant::SUGGESTIONS,
    })))
}

// ============================================================================
// Import Handlers
// ============================================================================

#[derive(Debug, serde::Deserialize, Default)]
struct ImportPreviewRequest {
    /// URL or file path; falls back to the configured source.
    source: Option<String>,
}

#[derive(Debug, serde::Deserialize, Default)]
struct ImportRunRequest {
    source: Option<String>,
    #[serde(default)]
    policy: DuplicatePolicy,
}

fn resolve_source(state: &AppState, requested: Option<String>) -> Result<String, AppError> {
    requested
        .or_else(|| state.import_source.clone())
        .ok_or_else(|| AppError::BadRequest("no import source configured".to_string()))
}

/// Fetch, parse, and partition without writing anything, so the operator
/// can confirm the counts before running the import.
async fn import_preview(
    State(state): State<AppState>,
    Json(request): Json<ImportPreviewRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let source = resolve_source(&state, request.source)?;
    let candidates = source::load_source(&source).await?;
    let reconciliation = import::reconcile(candidates, &state.catalog.names());

    Ok(Json(serde_json::json!({
        "total": reconciliation.total(),
        "new": reconciliation.new.len(),
        "duplicates": reconciliation.duplicates.len(),
    })))
}

async fn import_run(
    State(state): State<AppState>,
    Json(request): Json<ImportRunRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    // Reject a second concurrent run instead of queueing it; the guard is
    // held until this handler returns
    let _guard = state
        .import_lock
        .try_lock()
        .map_err(|_| AppError::Conflict("an import is already in progress".to_string()))?;

    let source = resolve_source(&state, request.source)?;

    // The source is re-parsed fully on every run; the name snapshot is
    // taken once, before any write
    let candidates = source::load_source(&source).await?;
    let reconciliation = import::reconcile(candidates, &state.catalog.names());

    tracing::info!(
        "Importing from {}: {} total, {} new, {} duplicates ({:?})",
        source,
        reconciliation.total(),
        reconciliation.new.len(),
        reconciliation.duplicates.len(),
        request.policy,
    );

    let outcome = import::apply(
        &reconciliation,
        request.policy,
        state.catalog.as_ref(),
        &state.import_progress,
        import::DEFAULT_BATCH_SIZE,
    );

    // Listing responses are stale now
    state.cache.invalidate_all();

    Ok(Json(serde_json::json!({
        "success": outcome.failed_batches == 0,
        "message": format!("Imported {} plants, updated {}", outcome.inserted, outcome.updated),
        "total": outcome.total,
        "new": outcome.new,
        "duplicates": outcome.duplicates,
        "inserted": outcome.inserted,
        "updated": outcome.updated,
        "failed_batches": outcome.failed_batches,
    })))
}

async fn import_progress(State(state): State<AppState>) -> Json<serde_json::Value> {
    let running = state.import_lock.try_lock().is_err();
    Json(serde_json::json!({
        "running": running,
        "processed": state.import_progress.processed(),
        "total": state.import_progress.total(),
    }))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Upstream(String),
    Internal(String),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Fetch(e) => AppError::Upstream(e.to_string()),
            CatalogError::Csv(e) => AppError::BadRequest(format!("source CSV unreadable: {}", e)),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
