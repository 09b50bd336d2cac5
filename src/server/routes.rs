//! HTTP API routes
//!
//! JSON endpoints for a host map widget. Every mutating endpoint answers with
//! the resulting `ViewState`.

use crate::error::Error;
use crate::geo::Position;
use crate::nav::{Mode, NavServices, Selection};
use crate::server::state::AppState;
use crate::view::ViewState;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router<S: NavServices>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/api/status", get(status_handler::<S>))
        .route("/api/view", get(view_handler::<S>))
        .route("/api/locate", post(locate_handler::<S>))
        .route("/api/position", put(position_handler::<S>))
        .route("/api/search", post(search_handler::<S>))
        .route("/api/select", post(select_handler::<S>))
        .route(
            "/api/navigation",
            post(toggle_navigation_handler::<S>).delete(stop_navigation_handler::<S>),
        )
        .route("/api/device/locate", post(device_handler::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
    #[serde(skip)]
    status: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            e if e.is_local() => StatusCode::BAD_REQUEST,
            Error::Config(_) => StatusCode::BAD_REQUEST,
            Error::Sensor(_)
            | Error::Geocode(_)
            | Error::Route(_)
            | Error::Device(_)
            | Error::Http(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError {
            error: err.to_string(),
            code: err.code().to_string(),
            status: status.as_u16(),
        }
    }
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server is running
    pub running: bool,
    /// Server version
    pub version: String,
    /// Current navigation mode
    pub mode: Mode,
    /// Where the user's position comes from (`sensor.source`)
    pub sensor_source: String,
    /// Whether a guide stick fix is known
    pub device_located: bool,
    /// Distance between user and guide stick, when both are known
    pub device_distance_meters: Option<f64>,
    /// Uptime in seconds
    pub uptime_secs: u64,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler<S: NavServices>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<StatusResponse> {
    let view = state.navigator.view().await;

    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        mode: view.mode,
        sensor_source: state.config.sensor.source.clone(),
        device_located: view.device_position.is_some(),
        device_distance_meters: state.navigator.device_distance_meters().await,
        uptime_secs: state.uptime_secs(),
    })
}

/// GET /api/view
async fn view_handler<S: NavServices>(State(state): State<Arc<AppState<S>>>) -> Json<ViewState> {
    Json(state.navigator.view().await)
}

/// Locate the user with the configured sensor
///
/// POST /api/locate
async fn locate_handler<S: NavServices>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<ViewState>, ApiError> {
    Ok(Json(state.navigator.locate_user().await?))
}

/// Position pushed by the host
#[derive(Debug, Deserialize)]
pub struct PositionRequest {
    pub latitude: f64,
    pub longitude: f64,
}

/// PUT /api/position
async fn position_handler<S: NavServices>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<PositionRequest>,
) -> Result<Json<ViewState>, ApiError> {
    let position = Position::new(req.latitude, req.longitude);
    Ok(Json(state.navigator.set_user_position(position).await?))
}

/// Place search request body
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

/// POST /api/search
async fn search_handler<S: NavServices>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<ViewState>, ApiError> {
    Ok(Json(state.navigator.search(&req.query).await?))
}

/// Marker or map tap
///
/// POST /api/select with `{"marker_id": n}` or `{"latitude": .., "longitude": ..}`
async fn select_handler<S: NavServices>(
    State(state): State<Arc<AppState<S>>>,
    Json(selection): Json<Selection>,
) -> Result<Json<ViewState>, ApiError> {
    Ok(Json(state.navigator.select(selection).await?))
}

/// Toggle navigation
///
/// POST /api/navigation
async fn toggle_navigation_handler<S: NavServices>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<ViewState>, ApiError> {
    Ok(Json(state.navigator.start_navigation().await?))
}

/// DELETE /api/navigation
async fn stop_navigation_handler<S: NavServices>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<ViewState> {
    Json(state.navigator.stop_navigation().await)
}

/// POST /api/device/locate
async fn device_handler<S: NavServices>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<ViewState>, ApiError> {
    Ok(Json(state.navigator.locate_device().await?))
}
