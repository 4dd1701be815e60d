//! Route definitions for the `/invoices` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::invoices;
use crate::state::AppState;

/// Routes mounted at `/invoices`.
///
/// ```text
/// GET  /                                  -> list
/// POST /                                  -> create (admin)
/// GET  /{id}                              -> get_by_id
/// PUT  /{id}                              -> update (admin, drafts only)
/// POST /{id}/send                         -> send (admin)
/// POST /{id}/void                         -> void (admin)
/// POST /from-submission/{submission_id}   -> create_from_submission (admin)
/// POST /sweep-overdue                     -> sweep_overdue (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(invoices::list).post(invoices::create))
        .route("/{id}", get(invoices::get_by_id).put(invoices::update))
        .route("/{id}/send", post(invoices::send))
        .route("/{id}/void", post(invoices::void))
        .route(
            "/from-submission/{submission_id}",
            post(invoices::create_from_submission),
        )
        .route("/sweep-overdue", post(invoices::sweep_overdue))
}
