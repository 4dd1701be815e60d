//! Route definitions for the `/submissions` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::submissions;
use crate::state::AppState;

/// Routes mounted at `/submissions`.
///
/// ```text
/// GET  /                           -> list
/// GET  /{id}                       -> get_by_id
/// GET  /{id}/payment-link          -> payment_link
/// POST /{id}/resend-payment-link   -> resend_payment_link (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(submissions::list))
        .route("/{id}", get(submissions::get_by_id))
        .route("/{id}/payment-link", get(submissions::payment_link))
        .route(
            "/{id}/resend-payment-link",
            post(submissions::resend_payment_link),
        )
}
