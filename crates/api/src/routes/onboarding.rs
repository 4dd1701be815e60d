//! Route definitions for the public `/onboarding` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::onboarding;
use crate::state::AppState;

/// Routes mounted at `/onboarding`.
///
/// ```text
/// POST /drafts                  -> create_draft
/// GET  /drafts/{id}             -> get_draft
/// PUT  /drafts/{id}/form-data   -> save_form_data
/// POST /drafts/{id}/next        -> next_step
/// POST /drafts/{id}/previous    -> previous_step
/// POST /drafts/{id}/redeem      -> redeem_code
/// POST /drafts/{id}/submit      -> submit
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/drafts", post(onboarding::create_draft))
        .route("/drafts/{id}", get(onboarding::get_draft))
        .route("/drafts/{id}/form-data", put(onboarding::save_form_data))
        .route("/drafts/{id}/next", post(onboarding::next_step))
        .route("/drafts/{id}/previous", post(onboarding::previous_step))
        .route("/drafts/{id}/redeem", post(onboarding::redeem_code))
        .route("/drafts/{id}/submit", post(onboarding::submit))
}
