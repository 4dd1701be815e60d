//! Handlers for the public `/onboarding/drafts` resource.
//!
//! A draft is the server-held form state for one client walking through
//! onboarding. Every step change and redemption is persisted before the
//! response is sent, so the client can reload at any point.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use clientdesk_core::access_code::{validate_redeemer_email, RedemptionResult};
use clientdesk_core::error::{CoreError, FieldErrors};
use clientdesk_core::onboarding::{
    Advance, FormData, OnboardingDraft, OnboardingStep, OnboardingVariant,
};
use clientdesk_core::package::{normalize_code, SelectedPackage};
use clientdesk_core::types::Timestamp;
use clientdesk_db::models::onboarding_draft::OnboardingDraftRow;
use clientdesk_db::models::submission::OnboardingSubmission;
use clientdesk_db::store::{
    AccessCodeStore, DraftStore, RedeemOutcome, SubmissionStore, SubmitOutcome,
};
use clientdesk_events::event_types;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::handlers::submissions::payment_url;
use crate::notifications::submission_event;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /onboarding/drafts`.
#[derive(Debug, Deserialize)]
pub struct CreateDraftRequest {
    pub variant: OnboardingVariant,
}

/// Request body for `POST /onboarding/drafts/{id}/redeem`.
#[derive(Debug, Deserialize)]
pub struct DraftRedeemRequest {
    pub access_code: String,
    /// Defaults to the contact email already entered on the form.
    pub email: Option<String>,
}

/// Client-facing view of a draft.
#[derive(Debug, Serialize)]
pub struct DraftView {
    pub id: Uuid,
    pub variant: OnboardingVariant,
    pub current_step: u8,
    pub total_steps: u8,
    pub step: OnboardingStep,
    pub step_label: &'static str,
    pub is_last_step: bool,
    pub form_data: FormData,
    pub errors: FieldErrors,
    pub access_code: Option<String>,
    pub selected_package: Option<SelectedPackage>,
    pub updated_at: Timestamp,
}

impl DraftView {
    fn new(row: &OnboardingDraftRow, draft: OnboardingDraft) -> Result<Self, CoreError> {
        let step = draft.step()?;
        Ok(Self {
            id: row.id,
            variant: draft.variant,
            current_step: draft.current_step,
            total_steps: draft.total_steps(),
            step,
            step_label: step.label(),
            is_last_step: draft.is_last_step(),
            form_data: draft.form_data,
            errors: draft.errors,
            access_code: draft.access_code,
            selected_package: draft.selected_package,
            updated_at: row.updated_at,
        })
    }
}

/// What a `next` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    Moved,
    /// Already on the review step; the draft is ready to submit.
    AtLastStep,
    /// The current step has missing or invalid fields, listed in `errors`.
    Blocked,
}

#[derive(Debug, Serialize)]
pub struct StepResponse {
    pub outcome: StepOutcome,
    pub draft: DraftView,
}

#[derive(Debug, Serialize)]
pub struct DraftRedeemResponse {
    pub redemption: RedemptionResult,
    pub draft: DraftView,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub submission: OnboardingSubmission,
    pub payment_url: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load(state: &AppState, id: Uuid) -> AppResult<OnboardingDraft> {
    let row = state
        .store
        .find_draft(id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("OnboardingDraft", id)))?;
    Ok(row.to_draft()?)
}

/// Persist the draft and render it. A draft deleted underneath us (it was
/// submitted concurrently) is reported as not found.
async fn save(state: &AppState, id: Uuid, draft: OnboardingDraft) -> AppResult<DraftView> {
    let row = state
        .store
        .save_draft(id, &draft)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("OnboardingDraft", id)))?;
    Ok(DraftView::new(&row, draft)?)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/onboarding/drafts
pub async fn create_draft(
    State(state): State<AppState>,
    Json(input): Json<CreateDraftRequest>,
) -> AppResult<impl IntoResponse> {
    let id = Uuid::new_v4();
    let draft = OnboardingDraft::new(input.variant);
    let row = state.store.create_draft(id, &draft).await?;

    tracing::info!(draft_id = %id, variant = input.variant.as_str(), "Onboarding draft created");

    let view = DraftView::new(&row, draft)?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: view })))
}

/// GET /api/v1/onboarding/drafts/{id}
pub async fn get_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DataResponse<DraftView>>> {
    let row = state
        .store
        .find_draft(id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("OnboardingDraft", id)))?;
    let draft = row.to_draft()?;
    Ok(Json(DataResponse {
        data: DraftView::new(&row, draft)?,
    }))
}

/// PUT /api/v1/onboarding/drafts/{id}/form-data
///
/// Replace the entered form data without validating or changing step.
pub async fn save_form_data(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form_data): Json<FormData>,
) -> AppResult<Json<DataResponse<DraftView>>> {
    let mut draft = load(&state, id).await?;
    draft.save_form_data(form_data);
    let view = save(&state, id, draft).await?;
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/v1/onboarding/drafts/{id}/next
///
/// Validate the current step and advance. A blocked advance is not an HTTP
/// error: the draft comes back with its field errors populated.
pub async fn next_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DataResponse<StepResponse>>> {
    let mut draft = load(&state, id).await?;
    let from = draft.current_step;

    let outcome = match draft.next()? {
        Advance::Moved(to) => {
            tracing::info!(draft_id = %id, from, to, "Onboarding step advanced");
            StepOutcome::Moved
        }
        Advance::AtLastStep => StepOutcome::AtLastStep,
        Advance::Blocked => {
            tracing::debug!(
                draft_id = %id,
                step = from,
                errors = draft.errors.len(),
                "Onboarding step blocked",
            );
            StepOutcome::Blocked
        }
    };

    let view = save(&state, id, draft).await?;
    Ok(Json(DataResponse {
        data: StepResponse {
            outcome,
            draft: view,
        },
    }))
}

/// POST /api/v1/onboarding/drafts/{id}/previous
pub async fn previous_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DataResponse<DraftView>>> {
    let mut draft = load(&state, id).await?;
    draft.previous();
    let view = save(&state, id, draft).await?;
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/v1/onboarding/drafts/{id}/redeem
///
/// Redeem an access code for this draft. Declines are returned in the body
/// and recorded as an `access_code` field error on the draft.
pub async fn redeem_code(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<DraftRedeemRequest>,
) -> AppResult<Json<DataResponse<DraftRedeemResponse>>> {
    let mut draft = load(&state, id).await?;
    if draft.variant != OnboardingVariant::AccessCode {
        return Err(AppError::Core(CoreError::Validation(
            "Access codes apply only to the access-code onboarding flow".into(),
        )));
    }

    let code = normalize_code(&input.access_code)?;

    // Re-submitting the code this draft already holds must not consume it twice.
    if let Some(held) = draft.access_code.as_deref() {
        if held != code {
            return Err(AppError::Core(CoreError::Conflict(
                "An access code has already been redeemed for this onboarding".into(),
            )));
        }
        let access_code = state
            .store
            .find_access_code(&code)
            .await?
            .ok_or_else(|| AppError::Core(CoreError::not_found("AccessCode", &code)))?;
        let view = save(&state, id, draft).await?;
        return Ok(Json(DataResponse {
            data: DraftRedeemResponse {
                redemption: RedemptionResult::granted(access_code.client_data()),
                draft: view,
            },
        }));
    }

    let email = input
        .email
        .as_deref()
        .unwrap_or(&draft.form_data.contact.email)
        .trim()
        .to_string();
    validate_redeemer_email(&email)?;

    let redemption = match state
        .store
        .redeem_access_code(&code, &email, Utc::now())
        .await?
    {
        RedeemOutcome::Granted(access_code) => {
            let client_data = access_code.client_data();
            draft.apply_redemption(code.clone(), client_data.package());
            tracing::info!(
                draft_id = %id,
                code = %code,
                used_count = access_code.used_count,
                "Access code redeemed",
            );
            RedemptionResult::granted(client_data)
        }
        RedeemOutcome::Declined(reason) => {
            draft.reject_redemption(reason.message());
            tracing::warn!(draft_id = %id, code = %code, ?reason, "Access code declined");
            RedemptionResult::declined(reason)
        }
    };

    let view = save(&state, id, draft).await?;
    Ok(Json(DataResponse {
        data: DraftRedeemResponse {
            redemption,
            draft: view,
        },
    }))
}

/// POST /api/v1/onboarding/drafts/{id}/submit
///
/// Re-validate every step, then atomically replace the draft with a
/// `pending_payment` submission and return the payment hand-off URL.
pub async fn submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut draft = load(&state, id).await?;

    let prepared = match draft.prepare_submission() {
        Ok(prepared) => prepared,
        Err(CoreError::InvalidFields(errors)) => {
            draft.record_validation_errors(errors.clone());
            save(&state, id, draft).await?;
            return Err(AppError::Core(CoreError::InvalidFields(errors)));
        }
        Err(e) => return Err(e.into()),
    };

    match state.store.create_submission(id, prepared, Utc::now()).await? {
        SubmitOutcome::Created(submission) => {
            let url = payment_url(&state, &submission)?;
            tracing::info!(
                draft_id = %id,
                submission_id = %submission.id,
                package = %submission.package_name,
                amount = submission.package_price,
                "Onboarding submitted",
            );
            state.event_bus.publish(submission_event(
                event_types::SUBMISSION_CREATED,
                &submission,
                Some(&url),
            ));
            Ok((
                StatusCode::CREATED,
                Json(DataResponse {
                    data: SubmitResponse {
                        submission,
                        payment_url: url,
                    },
                }),
            ))
        }
        SubmitOutcome::DraftMissing => {
            Err(AppError::Core(CoreError::not_found("OnboardingDraft", id)))
        }
        SubmitOutcome::CampaignDeclined(reason) => {
            tracing::warn!(draft_id = %id, ?reason, "Campaign code declined at submission");
            draft
                .errors
                .insert("campaign_code".into(), reason.message().into());
            save(&state, id, draft).await?;
            Err(AppError::Core(CoreError::field(
                "campaign_code",
                reason.message(),
            )))
        }
    }
}
