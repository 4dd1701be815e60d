//! Handlers for the `/campaign-codes` resource (the browse-packages catalog).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use clientdesk_core::campaign::CampaignCodeDraft;
use clientdesk_core::types::{Amount, Timestamp};
use clientdesk_db::models::campaign_code::CampaignCode;
use clientdesk_db::store::CampaignCodeStore;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::rbac::{RequireAdmin, RequireOperator};
use crate::response::DataResponse;
use crate::state::AppState;

/// Public view of a claimable package. Usage counters stay internal.
#[derive(Debug, Serialize)]
pub struct CatalogEntry {
    pub code: String,
    pub display_name: String,
    pub price: Amount,
    pub features: Vec<String>,
    pub expires_at: Option<Timestamp>,
}

impl From<CampaignCode> for CatalogEntry {
    fn from(c: CampaignCode) -> Self {
        Self {
            code: c.code,
            display_name: c.display_name,
            price: c.price,
            features: c.features.0,
            expires_at: c.expires_at,
        }
    }
}

/// POST /api/v1/campaign-codes
pub async fn create(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CampaignCodeDraft>,
) -> AppResult<impl IntoResponse> {
    let draft = input.validated()?;
    let campaign = state.store.create_campaign_code(draft).await?;

    tracing::info!(
        code = %campaign.code,
        price = campaign.price,
        operator_id = user.operator_id,
        "Campaign code created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: campaign })))
}

/// GET /api/v1/campaign-codes
pub async fn list(
    RequireOperator(_user): RequireOperator,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<CampaignCode>>>> {
    let codes = state.store.list_campaign_codes(None).await?;
    Ok(Json(DataResponse { data: codes }))
}

/// GET /api/v1/campaign-codes/active
///
/// Catalog shown on the package selection step.
pub async fn list_active(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<CatalogEntry>>>> {
    let codes = state.store.list_campaign_codes(Some(Utc::now())).await?;
    Ok(Json(DataResponse {
        data: codes.into_iter().map(CatalogEntry::from).collect(),
    }))
}
