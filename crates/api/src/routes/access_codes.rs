//! Route definitions for the `/access-codes` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::access_codes;
use crate::state::AppState;

/// Routes mounted at `/access-codes`.
///
/// ```text
/// GET  /         -> list (operator)
/// POST /         -> create (admin)
/// POST /redeem   -> redeem (public)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(access_codes::list).post(access_codes::create))
        .route("/redeem", post(access_codes::redeem))
}
