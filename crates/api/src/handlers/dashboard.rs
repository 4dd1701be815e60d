//! Operator dashboard read models.

use axum::extract::State;
use axum::Json;
use clientdesk_core::summary::BillingSummary;
use clientdesk_db::store::DashboardStore;

use crate::error::AppResult;
use crate::middleware::rbac::RequireOperator;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/dashboard/billing-summary
pub async fn billing_summary(
    RequireOperator(_user): RequireOperator,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<BillingSummary>>> {
    let summary = state.store.billing_summary().await?;
    Ok(Json(DataResponse { data: summary }))
}
