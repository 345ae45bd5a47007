//! REST API handlers.
//!
//! Reads come from the latest published snapshot; writes are sent to the
//! control loop as commands. A stopped engine answers 503.

use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::debug;

use neurogrid_control::ControlError;

use crate::ApiState;

/// Default extra load of a stress pulse.
const DEFAULT_STRESS_AMOUNT: f64 = 40.0;
/// Default stress pulse length.
const DEFAULT_STRESS_MS: u64 = 5_000;
/// Longest pulse a client may request.
const MAX_STRESS_MS: u64 = neurogrid_control::MAX_PULSE.as_millis() as u64;

/// Response wrapper for consistent API format.
#[derive(serde::Serialize)]
struct ApiResponse<T: serde::Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
}

/// Map the result of a command send onto an HTTP response.
fn command_response(result: Result<(), ControlError>, accepted: serde_json::Value) -> axum::response::Response {
    match result {
        Ok(()) => (StatusCode::ACCEPTED, ApiResponse::ok(accepted)).into_response(),
        Err(e) => error_response(&e.to_string(), StatusCode::SERVICE_UNAVAILABLE).into_response(),
    }
}

// ── Reads ──────────────────────────────────────────────────────

/// GET /api/v1/snapshot
pub async fn get_snapshot(State(state): State<ApiState>) -> impl IntoResponse {
    let snapshot = state.engine.snapshot();
    ApiResponse::ok(snapshot.as_ref().clone())
}

/// GET /api/v1/topology
pub async fn get_topology(State(state): State<ApiState>) -> impl IntoResponse {
    ApiResponse::ok(state.engine.snapshot().topology())
}

/// GET /api/v1/history
pub async fn get_history(State(state): State<ApiState>) -> impl IntoResponse {
    ApiResponse::ok(state.engine.snapshot().history.clone())
}

/// GET /api/v1/logs
pub async fn get_logs(State(state): State<ApiState>) -> impl IntoResponse {
    ApiResponse::ok(state.engine.snapshot().logs.clone())
}

// ── Controls ───────────────────────────────────────────────────

/// Autoscale toggle body.
#[derive(serde::Deserialize)]
pub struct AutoscaleRequest {
    pub enabled: bool,
}

/// POST /api/v1/autoscale
pub async fn set_autoscale(
    State(state): State<ApiState>,
    Json(req): Json<AutoscaleRequest>,
) -> impl IntoResponse {
    let result = state.engine.set_autoscale(req.enabled).await;
    command_response(result, serde_json::json!({ "enabled": req.enabled }))
}

/// Artificial load body.
#[derive(serde::Deserialize)]
pub struct LoadRequest {
    pub load: f64,
}

/// POST /api/v1/load
pub async fn set_load(
    State(state): State<ApiState>,
    Json(req): Json<LoadRequest>,
) -> impl IntoResponse {
    let load = neurogrid_state::clamp_artificial_load(req.load);
    let result = state.engine.set_load(load).await;
    command_response(result, serde_json::json!({ "load": load }))
}

/// Stress pulse body. Both fields are optional.
#[derive(serde::Deserialize, Default)]
pub struct StressRequest {
    pub amount: Option<f64>,
    pub duration_ms: Option<u64>,
}

/// POST /api/v1/stress
pub async fn trigger_stress(
    State(state): State<ApiState>,
    body: Option<Json<StressRequest>>,
) -> impl IntoResponse {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let duration_ms = req.duration_ms.unwrap_or(DEFAULT_STRESS_MS);
    if duration_ms == 0 || duration_ms > MAX_STRESS_MS {
        return error_response(
            &format!("duration_ms must be between 1 and {MAX_STRESS_MS}"),
            StatusCode::BAD_REQUEST,
        )
        .into_response();
    }

    let amount = neurogrid_state::clamp_artificial_load(req.amount.unwrap_or(DEFAULT_STRESS_AMOUNT));
    debug!(amount, duration_ms, "stress pulse requested");
    let result = state
        .engine
        .stress(amount, Duration::from_millis(duration_ms))
        .await;
    command_response(
        result,
        serde_json::json!({ "amount": amount, "duration_ms": duration_ms }),
    )
}

/// POST /api/v1/diagnostic
pub async fn run_diagnostic(State(state): State<ApiState>) -> impl IntoResponse {
    let result = state.engine.diagnostic().await;
    command_response(result, serde_json::json!({ "status": "queued" }))
}

/// POST /api/v1/plan
///
/// Never fails: an unreachable planner yields its fallback text.
pub async fn request_plan(State(state): State<ApiState>) -> impl IntoResponse {
    let metrics = state.engine.snapshot().metrics;
    let plan = state.narrator.plan(&metrics).await;
    ApiResponse::ok(serde_json::json!({ "plan": plan }))
}

// ── Prometheus ─────────────────────────────────────────────────

/// GET /metrics
pub async fn prometheus_metrics(State(state): State<ApiState>) -> impl IntoResponse {
    let body = neurogrid_metrics::render_prometheus(&state.engine.snapshot());
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}
