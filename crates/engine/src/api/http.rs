//! HTTP routes.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use zoinkies_domain::{LatLngRect, LocationCriteria, LocationId, RewardParams, SpawnLocation};

use crate::app::App;
use crate::stores::{WorldError, WorldStats};
use crate::use_cases::spawns::{CellFailure, ViewportError};

/// Seconds a client should wait before retrying after a provider outage.
const RETRY_AFTER_SECS: &str = "5";

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/ready", get(ready))
        .route("/api/locations", get(viewport_locations))
        .route("/api/locations/{id}", get(get_location))
        .route("/api/locations/{id}/claim", post(claim_location))
        .route(
            "/api/locations/{id}/respawn",
            get(respawn_status).post(start_respawn),
        )
        .route("/api/world/reset", post(reset_world))
}

async fn health() -> &'static str {
    "OK"
}

async fn ready(State(app): State<Arc<App>>) -> Response {
    if app.readiness.is_ready() {
        return (StatusCode::OK, "READY").into_response();
    }
    let pending: Vec<String> = app
        .readiness
        .pending()
        .iter()
        .map(ToString::to_string)
        .collect();
    (
        StatusCode::SERVICE_UNAVAILABLE,
        format!("Waiting for: {}", pending.join(", ")),
    )
        .into_response()
}

// =============================================================================
// Locations
// =============================================================================

#[derive(Debug, Deserialize)]
struct ViewportQuery {
    low_lat: f64,
    low_lng: f64,
    high_lat: f64,
    high_lng: f64,
    game_object_type: Option<i32>,
    max_count: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ViewportResponse {
    locations: Vec<SpawnLocation>,
    failures: Vec<CellFailure>,
}

async fn viewport_locations(
    State(app): State<Arc<App>>,
    Query(query): Query<ViewportQuery>,
) -> Result<Json<ViewportResponse>, ApiError> {
    let rect = LatLngRect::from_degrees(query.low_lat, query.low_lng, query.high_lat, query.high_lng)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let criteria = viewport_criteria(&app, &query)?;

    let viewport = app
        .use_cases
        .spawns
        .viewport
        .execute(rect.low(), rect.high(), criteria)
        .await?;

    Ok(Json(ViewportResponse {
        locations: viewport.locations,
        failures: viewport.failures,
    }))
}

/// Criteria override from the query string, `None` to use the configured default.
fn viewport_criteria(app: &App, query: &ViewportQuery) -> Result<Option<LocationCriteria>, ApiError> {
    if query.game_object_type.is_none() && query.max_count.is_none() {
        return Ok(None);
    }
    let defaults = &app.settings.criteria;
    let criteria = LocationCriteria::new(
        query.game_object_type.unwrap_or(defaults.game_object_type),
        query.max_count.unwrap_or(defaults.max_location_count),
    )
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok(Some(criteria))
}

async fn get_location(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Json<SpawnLocation>, ApiError> {
    let id = parse_location_id(id)?;
    Ok(Json(app.world.get(&id)?))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClaimResponse {
    location_id: LocationId,
    rewards: RewardParams,
}

async fn claim_location(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let id = parse_location_id(id)?;
    let rewards = app.use_cases.spawns.claim.execute(&id).await?;
    Ok(Json(ClaimResponse {
        location_id: id,
        rewards,
    }))
}

// =============================================================================
// Respawn
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct RespawnRequest {
    cooldown_secs: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RespawnStatusResponse {
    location_id: LocationId,
    respawning: bool,
    respawn_time: Option<DateTime<Utc>>,
    remaining_secs: i64,
}

/// The body is optional; an empty one uses the location's own cooldown.
async fn start_respawn(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<SpawnLocation>, ApiError> {
    let id = parse_location_id(id)?;
    let request: RespawnRequest = if body.is_empty() {
        RespawnRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid respawn request: {e}")))?
    };
    let cooldown = request
        .cooldown_secs
        .map(|secs| {
            chrono::Duration::try_seconds(secs)
                .ok_or_else(|| ApiError::BadRequest(format!("Cooldown of {secs}s is out of range")))
        })
        .transpose()?;

    let location = app
        .use_cases
        .spawns
        .start_respawn
        .execute(&id, cooldown)
        .await?;
    Ok(Json(location))
}

async fn respawn_status(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Json<RespawnStatusResponse>, ApiError> {
    let id = parse_location_id(id)?;
    let status = app.use_cases.spawns.respawn_status.execute(&id).await?;
    Ok(Json(RespawnStatusResponse {
        location_id: status.location_id,
        respawning: status.respawning,
        respawn_time: status.respawn_time,
        remaining_secs: whole_seconds_left(status.remaining),
    }))
}

/// Rounds up, so a location that is still respawning never reports zero.
fn whole_seconds_left(remaining: chrono::Duration) -> i64 {
    let millis = remaining.num_milliseconds();
    millis / 1000 + i64::from(millis % 1000 > 0)
}

// =============================================================================
// World
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetResponse {
    cleared_cells: usize,
    cleared_locations: usize,
}

impl From<WorldStats> for ResetResponse {
    fn from(stats: WorldStats) -> Self {
        Self {
            cleared_cells: stats.cached_cells,
            cleared_locations: stats.locations,
        }
    }
}

async fn reset_world(State(app): State<Arc<App>>) -> Json<ResetResponse> {
    Json(app.use_cases.spawns.reset.execute().await.into())
}

fn parse_location_id(raw: String) -> Result<LocationId, ApiError> {
    LocationId::new(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Unavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg).into_response(),
            ApiError::Unavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                [(header::RETRY_AFTER, RETRY_AFTER_SECS)],
                msg,
            )
                .into_response(),
        }
    }
}

impl From<WorldError> for ApiError {
    fn from(e: WorldError) -> Self {
        match e {
            WorldError::NotFound(_) => ApiError::NotFound(e.to_string()),
            WorldError::AlreadyClaimed(_) | WorldError::InvalidTransition(_) => {
                ApiError::Conflict(e.to_string())
            }
            WorldError::InvalidCooldown(_) | WorldError::InvalidInput(_) => {
                ApiError::BadRequest(e.to_string())
            }
            WorldError::ProviderUnavailable { .. } => ApiError::Unavailable(e.to_string()),
        }
    }
}

impl From<ViewportError> for ApiError {
    fn from(e: ViewportError) -> Self {
        match e {
            ViewportError::InvalidRegion(_) => ApiError::BadRequest(e.to_string()),
            ViewportError::Unavailable(_) => ApiError::Unavailable(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedRandom;
    use crate::infrastructure::readiness::Readiness;
    use crate::infrastructure::settings::AppSettings;
    use crate::test_fixtures::{self, CountingProvider, ManualClock};
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;
    use zoinkies_domain::{CellId, LatLng};

    fn router(provider: Arc<CountingProvider>, clock: Arc<ManualClock>) -> Router {
        routes().with_state(Arc::new(test_fixtures::app(provider, clock)))
    }

    fn viewport_uri() -> (String, Vec<CellId>) {
        let origin = CellId::containing(&LatLng::new(37.27, -122.04).unwrap(), 15).unwrap();
        let (x, y) = (origin.x(), origin.y());
        let cells = vec![
            origin,
            CellId::new(15, x + 1, y).unwrap(),
            CellId::new(15, x, y + 1).unwrap(),
            CellId::new(15, x + 1, y + 1).unwrap(),
        ];
        let (low, high) = (cells[2].center(), cells[1].center());
        let uri = format!(
            "/api/locations?low_lat={}&low_lng={}&high_lat={}&high_lng={}",
            low.latitude(),
            low.longitude(),
            high.latitude(),
            high.longitude()
        );
        (uri, cells)
    }

    async fn send(router: &Router, method: &str, uri: &str, body: Body) -> (StatusCode, Bytes, Response<()>) {
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(body)
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let (parts, body) = response.into_parts();
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        (status, bytes, Response::from_parts(parts, ()))
    }

    async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
        let (status, bytes, _) = send(router, "GET", uri, Body::empty()).await;
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn post_json(router: &Router, uri: &str, body: Body) -> (StatusCode, Value) {
        let (status, bytes, _) = send(router, "POST", uri, body).await;
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn first_location_id(router: &Router) -> String {
        let (uri, _) = viewport_uri();
        let (_, body) = get_json(router, &uri).await;
        body["locations"][0]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let router = router(
            Arc::new(CountingProvider::new(2)),
            Arc::new(ManualClock::at(test_fixtures::t0())),
        );
        let (status, bytes, _) = send(&router, "GET", "/api/health", Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn ready_reports_pending_milestones() {
        let app = App::new(
            AppSettings::default(),
            Arc::new(CountingProvider::new(2)),
            Arc::new(ManualClock::at(test_fixtures::t0())),
            Arc::new(FixedRandom(0)),
            Arc::new(Readiness::new()),
        )
        .unwrap();
        let router = routes().with_state(Arc::new(app));

        let (status, bytes, _) = send(&router, "GET", "/api/ready", Body::empty()).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("settings_loaded"));
        assert!(!text.contains("world_state_ready"));
    }

    #[tokio::test]
    async fn ready_once_all_milestones_are_marked() {
        let router = router(
            Arc::new(CountingProvider::new(2)),
            Arc::new(ManualClock::at(test_fixtures::t0())),
        );
        let (status, _, _) = send(&router, "GET", "/api/ready", Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn viewport_returns_locations_of_every_cell() {
        let router = router(
            Arc::new(CountingProvider::new(2)),
            Arc::new(ManualClock::at(test_fixtures::t0())),
        );
        let (uri, _) = viewport_uri();

        let (status, body) = get_json(&router, &uri).await;

        assert_eq!(status, StatusCode::OK);
        let locations = body["locations"].as_array().unwrap();
        assert_eq!(locations.len(), 8);
        assert!(locations.iter().all(|l| l["state"] == "available"));
        assert!(locations
            .iter()
            .all(|l| l["gameObjectType"]["kind"] == "minion"));
        assert!(body["failures"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn viewport_reports_failed_cells() {
        let provider = Arc::new(CountingProvider::new(2));
        let (uri, cells) = viewport_uri();
        provider.fail_cell(cells[0]);
        let router = router(provider, Arc::new(ManualClock::at(test_fixtures::t0())));

        let (status, body) = get_json(&router, &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["locations"].as_array().unwrap().len(), 6);
        assert_eq!(body["failures"][0]["cell"], cells[0].token());
    }

    #[tokio::test]
    async fn viewport_with_every_cell_down_is_unavailable() {
        let provider = Arc::new(CountingProvider::new(2));
        let (uri, cells) = viewport_uri();
        for cell in &cells {
            provider.fail_cell(*cell);
        }
        let router = router(provider, Arc::new(ManualClock::at(test_fixtures::t0())));

        let (status, _, response) = send(&router, "GET", &uri, Body::empty()).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers()[header::RETRY_AFTER], RETRY_AFTER_SECS);
    }

    #[tokio::test]
    async fn inverted_viewport_is_bad_request() {
        let router = router(
            Arc::new(CountingProvider::new(2)),
            Arc::new(ManualClock::at(test_fixtures::t0())),
        );
        let (status, _, _) = send(
            &router,
            "GET",
            "/api/locations?low_lat=10&low_lng=10&high_lat=5&high_lng=20",
            Body::empty(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn zero_max_count_is_bad_request() {
        let router = router(
            Arc::new(CountingProvider::new(2)),
            Arc::new(ManualClock::at(test_fixtures::t0())),
        );
        let (uri, _) = viewport_uri();
        let (status, _, _) = send(&router, "GET", &format!("{uri}&max_count=0"), Body::empty()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn claim_respawn_lifecycle() {
        let clock = Arc::new(ManualClock::at(test_fixtures::t0()));
        let router = router(Arc::new(CountingProvider::new(2)), clock.clone());
        let id = first_location_id(&router).await;

        let (status, body) = post_json(&router, &format!("/api/locations/{id}/claim"), Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["locationId"], id.as_str());
        assert_eq!(body["rewards"]["xp"], 10);

        let (status, _) = post_json(&router, &format!("/api/locations/{id}/claim"), Body::empty()).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = post_json(
            &router,
            &format!("/api/locations/{id}/respawn"),
            Body::from(r#"{"cooldown_secs":60}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "respawning");

        clock.advance(chrono::Duration::seconds(20));
        let (status, body) = get_json(&router, &format!("/api/locations/{id}/respawn")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["respawning"], true);
        assert_eq!(body["remainingSecs"], 40);

        clock.advance(chrono::Duration::seconds(41));
        let (_, body) = get_json(&router, &format!("/api/locations/{id}")).await;
        assert_eq!(body["state"], "available");

        let (status, _) = post_json(&router, &format!("/api/locations/{id}/claim"), Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn respawn_without_body_uses_reward_cooldown() {
        let router = router(
            Arc::new(CountingProvider::new(1)),
            Arc::new(ManualClock::at(test_fixtures::t0())),
        );
        let id = first_location_id(&router).await;
        post_json(&router, &format!("/api/locations/{id}/claim"), Body::empty()).await;

        let (status, _) = post_json(&router, &format!("/api/locations/{id}/respawn"), Body::empty()).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = get_json(&router, &format!("/api/locations/{id}/respawn")).await;
        assert_eq!(body["remainingSecs"], 300);
    }

    #[tokio::test]
    async fn sub_second_remainder_rounds_up() {
        let clock = Arc::new(ManualClock::at(test_fixtures::t0()));
        let router = router(Arc::new(CountingProvider::new(1)), clock.clone());
        let id = first_location_id(&router).await;
        post_json(&router, &format!("/api/locations/{id}/claim"), Body::empty()).await;
        post_json(
            &router,
            &format!("/api/locations/{id}/respawn"),
            Body::from(r#"{"cooldown_secs":10}"#),
        )
        .await;

        clock.advance(chrono::Duration::milliseconds(9_500));
        let (_, body) = get_json(&router, &format!("/api/locations/{id}/respawn")).await;

        assert_eq!(body["respawning"], true);
        assert_eq!(body["remainingSecs"], 1);
    }

    #[test]
    fn whole_seconds_left_rounds_partial_seconds_up() {
        assert_eq!(whole_seconds_left(chrono::Duration::zero()), 0);
        assert_eq!(whole_seconds_left(chrono::Duration::milliseconds(1)), 1);
        assert_eq!(whole_seconds_left(chrono::Duration::seconds(40)), 40);
        assert_eq!(whole_seconds_left(chrono::Duration::milliseconds(40_001)), 41);
    }

    #[tokio::test]
    async fn zero_cooldown_makes_location_claimable_again() {
        let router = router(
            Arc::new(CountingProvider::new(1)),
            Arc::new(ManualClock::at(test_fixtures::t0())),
        );
        let id = first_location_id(&router).await;
        post_json(&router, &format!("/api/locations/{id}/claim"), Body::empty()).await;

        let (status, body) = post_json(
            &router,
            &format!("/api/locations/{id}/respawn"),
            Body::from(r#"{"cooldown_secs":0}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "available");
        assert!(body.get("respawnTime").map_or(true, Value::is_null));
        let (status, _) = post_json(&router, &format!("/api/locations/{id}/claim"), Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn respawn_of_available_location_conflicts() {
        let router = router(
            Arc::new(CountingProvider::new(1)),
            Arc::new(ManualClock::at(test_fixtures::t0())),
        );
        let id = first_location_id(&router).await;

        let (status, _) = post_json(&router, &format!("/api/locations/{id}/respawn"), Body::empty()).await;

        assert_eq!(status, StatusCode::CONFLICT);
        let (_, body) = get_json(&router, &format!("/api/locations/{id}")).await;
        assert_eq!(body["state"], "available");
    }

    #[tokio::test]
    async fn negative_cooldown_is_bad_request() {
        let router = router(
            Arc::new(CountingProvider::new(1)),
            Arc::new(ManualClock::at(test_fixtures::t0())),
        );
        let id = first_location_id(&router).await;
        post_json(&router, &format!("/api/locations/{id}/claim"), Body::empty()).await;

        let (status, _) = post_json(
            &router,
            &format!("/api/locations/{id}/respawn"),
            Body::from(r#"{"cooldown_secs":-1}"#),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_location_is_not_found() {
        let router = router(
            Arc::new(CountingProvider::new(1)),
            Arc::new(ManualClock::at(test_fixtures::t0())),
        );
        let (status, _) = post_json(&router, "/api/locations/nope/claim", Body::empty()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn reset_forgets_every_location() {
        let provider = Arc::new(CountingProvider::new(2));
        let router = router(provider.clone(), Arc::new(ManualClock::at(test_fixtures::t0())));
        let id = first_location_id(&router).await;

        let (status, body) = post_json(&router, "/api/world/reset", Body::empty()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["clearedCells"], 4);
        assert_eq!(body["clearedLocations"], 8);
        let (status, _) = get_json(&router, &format!("/api/locations/{id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(provider.calls(), 4);
    }
}
