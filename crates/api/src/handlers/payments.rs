//! Payment confirmation callback from the external payment collector.
//!
//! The collector signs the raw request body with the shared webhook secret
//! (`x-payment-signature`, hex HMAC-SHA256). A confirmation either names a
//! submission (onboarding checkout) or an invoice (invoice payment page).
//! Confirmations are idempotent: replaying one changes nothing.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use clientdesk_core::error::CoreError;
use clientdesk_core::invoice::InvoiceStatus;
use clientdesk_core::signing::verify_signature;
use clientdesk_core::types::{Amount, DbId};
use clientdesk_db::models::invoice::Invoice;
use clientdesk_db::models::submission::OnboardingSubmission;
use clientdesk_db::store::{InvoiceStore, MarkPaid, SubmissionStore};
use clientdesk_events::event_types;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::handlers::invoices::{invoice_for_submission, settle, transition};
use crate::notifications::submission_event;
use crate::response::DataResponse;
use crate::state::AppState;

/// Header carrying the hex HMAC of the raw body.
pub const SIGNATURE_HEADER: &str = "x-payment-signature";

/// Body of `POST /payments/confirm`. Exactly one id must be present.
#[derive(Debug, Deserialize)]
pub struct PaymentConfirmation {
    pub submission_id: Option<String>,
    pub invoice_id: Option<DbId>,
    pub amount_paid: Option<Amount>,
}

#[derive(Debug, Serialize)]
pub struct ConfirmationResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission: Option<OnboardingSubmission>,
    pub invoice: Option<Invoice>,
    /// `false` when the confirmation had already been applied.
    pub changed: bool,
}

fn verify(state: &AppState, headers: &HeaderMap, body: &[u8]) -> AppResult<()> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(format!(
                "Missing {SIGNATURE_HEADER} header"
            )))
        })?;
    if !verify_signature(&state.config.payment.webhook_secret, body, signature) {
        tracing::warn!("Payment confirmation rejected: bad signature");
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid payment signature".into(),
        )));
    }
    Ok(())
}

/// POST /api/v1/payments/confirm
pub async fn confirm(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<DataResponse<ConfirmationResult>>> {
    verify(&state, &headers, &body)?;

    let input: PaymentConfirmation = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid confirmation body: {e}")))?;

    let result = match (input.submission_id.as_deref(), input.invoice_id) {
        (Some(submission_id), None) => {
            confirm_submission(&state, submission_id, input.amount_paid).await?
        }
        (None, Some(invoice_id)) => confirm_invoice(&state, invoice_id, input.amount_paid).await?,
        _ => {
            tracing::error!(
                body = %String::from_utf8_lossy(&body),
                "Payment confirmation names no single record",
            );
            return Err(AppError::BadRequest(
                "Exactly one of submission_id or invoice_id is required".into(),
            ));
        }
    };
    Ok(Json(DataResponse { data: result }))
}

/// Mark the submission paid, then settle its invoice, creating one if the
/// operator never generated it.
async fn confirm_submission(
    state: &AppState,
    raw_id: &str,
    amount_paid: Option<Amount>,
) -> AppResult<ConfirmationResult> {
    let Ok(id) = Uuid::parse_str(raw_id.trim()) else {
        tracing::error!(submission_id = %raw_id, "Payment confirmation for unknown submission");
        return Err(AppError::Core(CoreError::not_found(
            "OnboardingSubmission",
            raw_id,
        )));
    };

    let (submission, changed) = match state.store.mark_submission_paid(id, Utc::now()).await? {
        MarkPaid::Marked(submission) => {
            tracing::info!(
                submission_id = %id,
                amount = submission.package_price,
                "Submission paid",
            );
            state.event_bus.publish(submission_event(
                event_types::SUBMISSION_PAID,
                &submission,
                None,
            ));
            (submission, true)
        }
        MarkPaid::AlreadyPaid(submission) => {
            tracing::info!(submission_id = %id, "Submission already paid; confirmation ignored");
            (submission, false)
        }
        MarkPaid::NotFound => {
            tracing::error!(submission_id = %id, "Payment confirmation for unknown submission");
            return Err(AppError::Core(CoreError::not_found(
                "OnboardingSubmission",
                id,
            )));
        }
    };

    // Retried even when the submission was already paid, so a confirmation
    // that failed halfway is completed by the collector's retry.
    let invoice = settle_submission_invoice(state, &submission, amount_paid).await?;

    Ok(ConfirmationResult {
        submission: Some(submission),
        invoice,
        changed,
    })
}

async fn settle_submission_invoice(
    state: &AppState,
    submission: &OnboardingSubmission,
    amount_paid: Option<Amount>,
) -> AppResult<Option<Invoice>> {
    let invoice = match state.store.find_invoice_by_submission(submission.id).await? {
        Some(invoice) => invoice,
        None => {
            let new = invoice_for_submission(state, submission, InvoiceStatus::Sent)?;
            match state.store.create_invoice(new, Utc::now().date_naive()).await {
                Ok(invoice) => invoice,
                // A concurrent confirmation created it first.
                Err(err) => state
                    .store
                    .find_invoice_by_submission(submission.id)
                    .await?
                    .ok_or(err)?,
            }
        }
    };

    let invoice = match InvoiceStatus::from_str_db(&invoice.status)? {
        InvoiceStatus::Void => {
            tracing::error!(
                submission_id = %submission.id,
                invoice_id = invoice.id,
                "Payment received for a submission whose invoice is void",
            );
            return Ok(Some(invoice));
        }
        // Paid before the operator sent it; no separate "sent" notice.
        InvoiceStatus::Draft => transition(state, invoice.id, InvoiceStatus::Sent).await?,
        _ => invoice,
    };

    Ok(Some(settle(state, invoice, amount_paid).await?))
}

async fn confirm_invoice(
    state: &AppState,
    id: DbId,
    amount_paid: Option<Amount>,
) -> AppResult<ConfirmationResult> {
    let Some(invoice) = state.store.find_invoice(id).await? else {
        tracing::error!(invoice_id = id, "Payment confirmation for unknown invoice");
        return Err(AppError::Core(CoreError::not_found("Invoice", id)));
    };

    let was_paid = invoice.status == InvoiceStatus::Paid.as_str();
    let invoice = settle(state, invoice, amount_paid).await.inspect_err(|e| {
        tracing::error!(invoice_id = id, error = %e, "Payment confirmation could not be applied");
    })?;

    Ok(ConfirmationResult {
        submission: None,
        invoice: Some(invoice),
        changed: !was_paid,
    })
}
