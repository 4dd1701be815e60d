//! Liveness probe, mounted at the root rather than under `/api/v1`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use clientdesk_db::store::DashboardStore;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub store_reachable: bool,
}

/// GET /health
///
/// `503` while the store cannot be reached, so orchestrators stop routing
/// onboarding traffic to this instance.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store_reachable = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health probe could not reach the store");
            false
        }
    };

    let (code, status) = if store_reachable {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };
    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            store_reachable,
        }),
    )
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
