pub mod access_codes;
pub mod auth;
pub mod campaign_codes;
pub mod health;
pub mod invoices;
pub mod onboarding;
pub mod submissions;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                  login (public)
/// /auth/session                                current session (auth)
///
/// /onboarding/drafts                           create draft (public)
/// /onboarding/drafts/{id}                      get draft
/// /onboarding/drafts/{id}/form-data            save form data (PUT)
/// /onboarding/drafts/{id}/next                 advance a step
/// /onboarding/drafts/{id}/previous             go back a step
/// /onboarding/drafts/{id}/redeem               redeem an access code
/// /onboarding/drafts/{id}/submit               submit, returns payment URL
///
/// /access-codes                                list (operator), issue (admin)
/// /access-codes/redeem                         use_access_code RPC (public)
///
/// /campaign-codes                              list (operator), create (admin)
/// /campaign-codes/active                       public package catalog
///
/// /payments/confirm                            signed payment callback
///
/// /submissions                                 list (operator)
/// /submissions/{id}                            get
/// /submissions/{id}/payment-link               regenerate hand-off URL
/// /submissions/{id}/resend-payment-link        resend (admin)
///
/// /invoices                                    list, create
/// /invoices/{id}                               get, update draft
/// /invoices/{id}/send                          draft -> sent
/// /invoices/{id}/void                          draft|sent -> void
/// /invoices/from-submission/{submission_id}    generate from submission
/// /invoices/sweep-overdue                      run overdue rule now
///
/// /dashboard/billing-summary                   billing totals (operator)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/onboarding", onboarding::router())
        .nest("/access-codes", access_codes::router())
        .nest("/campaign-codes", campaign_codes::router())
        .route("/payments/confirm", post(handlers::payments::confirm))
        .nest("/submissions", submissions::router())
        .nest("/invoices", invoices::router())
        .route(
            "/dashboard/billing-summary",
            get(handlers::dashboard::billing_summary),
        )
}
