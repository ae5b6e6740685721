//! HTTP API routes
//!
//! Defines all REST API endpoints for the server.

use crate::artifact::{custom_geojson_filename, ArtifactKind, RequestId};
use crate::config::DefaultsConfig;
use crate::coord::EarthModel;
use crate::error::{Error, Result};
use crate::format::ArtifactSelection;
use crate::pipeline::{generate_route_with, RouteOutcome};
use crate::route::{DensityPolicy, RouteParams};
use crate::server::state::AppState;
use crate::store::persist_bundle;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/navigation_route_geojson", post(geojson_handler))
        .route("/navigation_route", post(route_handler))
        .route("/navigation_route_with_plot", post(route_with_plot_handler))
        .route(
            "/navigation_route_with_plot_and_kml",
            post(route_with_plot_and_kml_handler),
        )
        .route("/download_file/:filename", get(download_handler))
        .route("/save_geojson/:request_id", post(save_geojson_handler))
        .route("/api/status", get(status_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Route request body
///
/// Omitted parameters fall back to the `[defaults]` config section.
#[derive(Debug, Deserialize)]
pub struct SiteInput {
    pub lat: f64,
    pub lon: f64,
    pub azimuths: Vec<f64>,
    pub num_circles: Option<i64>,
    pub points_per_circle_base: Option<i64>,
    pub max_distance: Option<f64>,
    pub density: Option<DensityPolicy>,
    pub ring_arcs: Option<bool>,
    pub earth_model: Option<EarthModel>,
    pub segment_length: Option<f64>,
}

impl SiteInput {
    fn into_params(self, defaults: &DefaultsConfig) -> RouteParams {
        RouteParams {
            lat: self.lat,
            lon: self.lon,
            azimuths: self.azimuths,
            num_circles: self.num_circles.unwrap_or(defaults.num_circles as i64),
            points_per_circle_base: self
                .points_per_circle_base
                .unwrap_or(defaults.points_per_circle_base as i64),
            max_distance: self.max_distance.unwrap_or(defaults.max_distance),
            density: self.density.unwrap_or(defaults.density),
            ring_arcs: self.ring_arcs.unwrap_or(defaults.ring_arcs),
            earth_model: self.earth_model.unwrap_or(defaults.earth_model),
            segment_length: self.segment_length.unwrap_or(defaults.segment_length),
        }
    }
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    fn new(code: &str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
        }
    }

    fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "MALFORMED_GRID" | "CONFIG_ERROR" | "STORAGE_ERROR" | "INTERNAL_ERROR" => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidCoordinates(_) => "INVALID_COORDINATES",
            Error::InvalidGeometryInput(_) => "INVALID_GEOMETRY",
            Error::NonPositiveParameter { .. } => "INVALID_PARAMETER",
            Error::EmptyBearingSet => "EMPTY_BEARINGS",
            Error::TooManyBearings { .. } => "TOO_MANY_BEARINGS",
            Error::GridTooLarge { .. } => "GRID_TOO_LARGE",
            Error::InvalidArtifactName(_) => "INVALID_ARTIFACT_NAME",
            Error::NotFound(_) => "NOT_FOUND",
            Error::MalformedGrid(_) => "MALFORMED_GRID",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Io(_) => "STORAGE_ERROR",
            _ => "INTERNAL_ERROR",
        };
        if !err.is_validation() && !matches!(err, Error::NotFound(_)) {
            warn!("Request failed: {}", err);
        }
        ApiError::new(code, err.to_string())
    }
}

fn task_failed(e: tokio::task::JoinError) -> ApiError {
    ApiError::new("INTERNAL_ERROR", format!("Background task failed: {}", e))
}

/// An optional artifact that could not be produced
#[derive(Debug, Serialize, Deserialize)]
pub struct FailureInfo {
    pub kind: ArtifactKind,
    pub error: String,
}

/// Response of the storing route endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct RouteResponse {
    pub request_id: RequestId,
    pub geojson: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailureInfo>,
}

impl RouteResponse {
    fn from_outcome(outcome: RouteOutcome) -> std::result::Result<Self, ApiError> {
        let geojson = outcome.geojson()?;
        Ok(Self {
            request_id: outcome.request_id,
            geojson,
            failures: outcome
                .failures
                .into_iter()
                .map(|f| FailureInfo {
                    kind: f.kind,
                    error: f.error.to_string(),
                })
                .collect(),
        })
    }
}

/// Run the pipeline on the blocking pool, optionally persisting the bundle
async fn run_pipeline(
    state: &AppState,
    input: SiteInput,
    selection: ArtifactSelection,
    persist: bool,
) -> std::result::Result<RouteOutcome, ApiError> {
    let params = {
        let config = state.config.read().await;
        input.into_params(&config.defaults)
    };
    let plot_options = state.plot_options().await;
    let store = persist.then(|| Arc::clone(&state.store));

    let outcome = tokio::task::spawn_blocking(move || -> Result<RouteOutcome> {
        let req = params.into_request()?;
        let outcome = generate_route_with(&req, selection, &plot_options)?;
        if let Some(store) = store {
            persist_bundle(store.as_ref(), &outcome.bundle)?;
        }
        Ok(outcome)
    })
    .await
    .map_err(task_failed)??;

    Ok(outcome)
}

/// GeoJSON only, nothing stored
///
/// POST /navigation_route_geojson
async fn geojson_handler(
    State(state): State<Arc<AppState>>,
    Json(input): Json<SiteInput>,
) -> std::result::Result<Json<Value>, ApiError> {
    let outcome = run_pipeline(&state, input, ArtifactSelection::GeojsonOnly, false).await?;
    Ok(Json(outcome.geojson()?))
}

/// GeoJSON, stored
///
/// POST /navigation_route
async fn route_handler(
    State(state): State<Arc<AppState>>,
    Json(input): Json<SiteInput>,
) -> std::result::Result<Json<RouteResponse>, ApiError> {
    let outcome = run_pipeline(&state, input, ArtifactSelection::GeojsonOnly, true).await?;
    Ok(Json(RouteResponse::from_outcome(outcome)?))
}

/// GeoJSON with embedded plot, both stored
///
/// POST /navigation_route_with_plot
async fn route_with_plot_handler(
    State(state): State<Arc<AppState>>,
    Json(input): Json<SiteInput>,
) -> std::result::Result<Json<RouteResponse>, ApiError> {
    let outcome = run_pipeline(&state, input, ArtifactSelection::WithPlot, true).await?;
    Ok(Json(RouteResponse::from_outcome(outcome)?))
}

/// GeoJSON with embedded plot and KML download reference, all stored
///
/// POST /navigation_route_with_plot_and_kml
async fn route_with_plot_and_kml_handler(
    State(state): State<Arc<AppState>>,
    Json(input): Json<SiteInput>,
) -> std::result::Result<Json<RouteResponse>, ApiError> {
    let outcome = run_pipeline(&state, input, ArtifactSelection::WithPlotAndKml, true).await?;
    Ok(Json(RouteResponse::from_outcome(outcome)?))
}

fn content_type_for(filename: &str) -> &'static str {
    match ArtifactKind::from_filename(filename) {
        Some(kind) => kind.content_type(),
        None if filename.ends_with(".json") => "application/json",
        None => "application/octet-stream",
    }
}

/// Download a stored artifact
///
/// GET /download_file/:filename
async fn download_handler(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> std::result::Result<impl IntoResponse, ApiError> {
    let store = Arc::clone(&state.store);
    let name = filename.clone();
    let bytes = tokio::task::spawn_blocking(move || store.load(&name))
        .await
        .map_err(task_failed)??;

    let headers = [
        (header::CONTENT_TYPE, content_type_for(&filename).to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
    ];
    Ok((headers, bytes))
}

/// Save response
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveResponse {
    pub message: String,
    pub filename: String,
}

/// Store a caller-supplied GeoJSON document
///
/// POST /save_geojson/:request_id
async fn save_geojson_handler(
    State(state): State<Arc<AppState>>,
    Path(request_id): Path<String>,
    Json(geojson): Json<Value>,
) -> std::result::Result<Json<SaveResponse>, ApiError> {
    let request_id = RequestId::parse(&request_id)?;
    if !geojson.is_object() {
        return Err(ApiError::new(
            "INVALID_GEOJSON",
            "GeoJSON document must be a JSON object",
        ));
    }

    let filename = custom_geojson_filename(&request_id);
    let bytes = serde_json::to_vec(&geojson).map_err(Error::from)?;
    let store = Arc::clone(&state.store);
    let name = filename.clone();
    tokio::task::spawn_blocking(move || store.save(&name, &bytes))
        .await
        .map_err(task_failed)??;

    info!("Saved custom GeoJSON {}", filename);
    Ok(Json(SaveResponse {
        message: format!("GeoJSON saved as {}", filename),
        filename,
    }))
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server is running
    pub running: bool,
    /// Server version
    pub version: String,
    /// Artifact store location
    pub storage: String,
    /// Uptime in seconds
    pub uptime_secs: u64,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.store.location(),
        uptime_secs: state.uptime_secs(),
    })
}
