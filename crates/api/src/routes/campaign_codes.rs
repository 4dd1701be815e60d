//! Route definitions for the `/campaign-codes` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::campaign_codes;
use crate::state::AppState;

/// Routes mounted at `/campaign-codes`.
///
/// ```text
/// GET  /         -> list (operator)
/// POST /         -> create (admin)
/// GET  /active   -> list_active (public)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(campaign_codes::list).post(campaign_codes::create))
        .route("/active", get(campaign_codes::list_active))
}
