//! Handlers for the operator `/submissions` resource.

use axum::extract::{Path, Query, State};
use axum::Json;
use clientdesk_core::error::CoreError;
use clientdesk_core::payment_link::build_payment_url;
use clientdesk_core::submission::SubmissionStatus;
use clientdesk_db::models::submission::OnboardingSubmission;
use clientdesk_db::store::SubmissionStore;
use clientdesk_events::event_types;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireOperator};
use crate::notifications::submission_event;
use crate::query::StatusListParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PaymentLinkResponse {
    pub submission_id: Uuid,
    pub payment_url: String,
}

/// Payment hand-off URL for a stored submission.
pub(crate) fn payment_url(
    state: &AppState,
    submission: &OnboardingSubmission,
) -> AppResult<String> {
    Ok(build_payment_url(
        &state.config.payment.base_url,
        &submission.payment_link_params(),
    )?)
}

async fn find(state: &AppState, id: Uuid) -> AppResult<OnboardingSubmission> {
    state
        .store
        .find_submission(id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("OnboardingSubmission", id)))
}

/// GET /api/v1/submissions?status=&limit=&offset=
pub async fn list(
    RequireOperator(_user): RequireOperator,
    State(state): State<AppState>,
    Query(params): Query<StatusListParams>,
) -> AppResult<Json<DataResponse<Vec<OnboardingSubmission>>>> {
    let status = params
        .status()
        .map(SubmissionStatus::from_str_db)
        .transpose()?;
    let (limit, offset) = params.page();
    let submissions = state.store.list_submissions(status, limit, offset).await?;
    Ok(Json(DataResponse { data: submissions }))
}

/// GET /api/v1/submissions/{id}
pub async fn get_by_id(
    RequireOperator(_user): RequireOperator,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DataResponse<OnboardingSubmission>>> {
    let submission = find(&state, id).await?;
    Ok(Json(DataResponse { data: submission }))
}

/// GET /api/v1/submissions/{id}/payment-link
///
/// Regenerate the hand-off URL from stored fields only.
pub async fn payment_link(
    RequireOperator(_user): RequireOperator,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DataResponse<PaymentLinkResponse>>> {
    let submission = find(&state, id).await?;
    let url = payment_url(&state, &submission)?;
    Ok(Json(DataResponse {
        data: PaymentLinkResponse {
            submission_id: submission.id,
            payment_url: url,
        },
    }))
}

/// POST /api/v1/submissions/{id}/resend-payment-link
///
/// Only pending submissions get a reminder; a paid one is a conflict.
pub async fn resend_payment_link(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DataResponse<PaymentLinkResponse>>> {
    let submission = find(&state, id).await?;
    if SubmissionStatus::from_str_db(&submission.status)? != SubmissionStatus::PendingPayment {
        return Err(AppError::Core(CoreError::Conflict(
            "Submission is already paid".into(),
        )));
    }

    let url = payment_url(&state, &submission)?;
    state.event_bus.publish(submission_event(
        event_types::PAYMENT_LINK_RESENT,
        &submission,
        Some(&url),
    ));
    tracing::info!(submission_id = %id, operator_id = user.operator_id, "Payment link resent");

    Ok(Json(DataResponse {
        data: PaymentLinkResponse {
            submission_id: submission.id,
            payment_url: url,
        },
    }))
}
