//! neurogrid-api — REST API for the NeuroGrid dashboard.
//!
//! Exposes read-only snapshots of the control loop for renderers and the
//! handful of user controls that mutate it. Every mutation is forwarded to
//! the engine as a command; handlers never touch state directly.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/api/v1/snapshot` | Full dashboard snapshot |
//! | GET | `/api/v1/topology` | Node count + CPU for the graph renderer |
//! | GET | `/api/v1/history` | Chart samples, oldest first |
//! | GET | `/api/v1/logs` | Event log, oldest first |
//! | POST | `/api/v1/autoscale` | Engage / disengage autoscaling |
//! | POST | `/api/v1/load` | Set artificial load |
//! | POST | `/api/v1/stress` | Trigger a stress pulse |
//! | POST | `/api/v1/diagnostic` | Append a manual diagnostic entry |
//! | POST | `/api/v1/plan` | On-demand optimization plan |
//! | GET | `/metrics` | Prometheus exposition |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use neurogrid_control::EngineHandle;
use neurogrid_narrator::Narrator;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub engine: EngineHandle,
    pub narrator: Arc<Narrator>,
}

/// Build the complete API router (REST + metrics).
pub fn build_router(engine: EngineHandle, narrator: Arc<Narrator>) -> Router {
    let api_state = ApiState { engine, narrator };

    let api_routes = Router::new()
        .route("/snapshot", get(handlers::get_snapshot))
        .route("/topology", get(handlers::get_topology))
        .route("/history", get(handlers::get_history))
        .route("/logs", get(handlers::get_logs))
        .route("/autoscale", post(handlers::set_autoscale))
        .route("/load", post(handlers::set_load))
        .route("/stress", post(handlers::trigger_stress))
        .route("/diagnostic", post(handlers::run_diagnostic))
        .route("/plan", post(handlers::request_plan))
        .with_state(api_state.clone());

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::prometheus_metrics).with_state(api_state))
}
