//! Handlers for the operator `/invoices` resource.
//!
//! Status changes go through [`transition`] so the store applies them only
//! from an allowed source state; a refused change is reported as a conflict
//! naming the actual current status.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, NaiveDate, Utc};
use clientdesk_core::error::{CoreError, FieldErrors};
use clientdesk_core::invoice::{
    price_line_items, settled_amount, total, validate_transition, InvoiceStatus, LineItemInput,
};
use clientdesk_core::types::{Amount, DbId};
use clientdesk_db::models::invoice::{
    CreateInvoice, Invoice, InvoiceChanges, NewInvoice, UpdateInvoice,
};
use clientdesk_db::models::submission::OnboardingSubmission;
use clientdesk_db::store::{InvoiceStore, SubmissionStore};
use clientdesk_events::event_types;
use serde::Serialize;
use uuid::Uuid;

use crate::background::overdue_sweep::sweep_and_notify;
use crate::error::{AppError, AppResult};
use crate::handlers::submissions::payment_url;
use crate::middleware::rbac::{RequireAdmin, RequireOperator};
use crate::notifications::invoice_event;
use crate::query::StatusListParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub reclassified: usize,
    pub invoices: Vec<Invoice>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn validate_client(name: &str, email: &str, errors: &mut FieldErrors) {
    if name.trim().is_empty() {
        errors.insert("client_name".into(), "Client name is required".into());
    }
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        errors.insert("client_email".into(), "A valid email address is required".into());
    }
}

/// Merge line-item errors with the other field errors so the operator sees
/// everything wrong with the form at once.
fn priced(
    lines: &[LineItemInput],
    errors: &mut FieldErrors,
) -> Option<(Vec<clientdesk_core::invoice::LineItem>, Amount)> {
    let result = price_line_items(lines).and_then(|items| {
        let amount_due = total(&items)?;
        Ok((items, amount_due))
    });
    match result {
        Ok(priced) => Some(priced),
        Err(CoreError::InvalidFields(line_errors)) => {
            errors.extend(line_errors);
            None
        }
        Err(e) => {
            errors.insert("line_items".into(), e.to_string());
            None
        }
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

async fn find(state: &AppState, id: DbId) -> AppResult<Invoice> {
    state
        .store
        .find_invoice(id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Invoice", id)))
}

/// Move an invoice to `next`, or explain why it cannot move.
pub(crate) async fn transition(
    state: &AppState,
    id: DbId,
    next: InvoiceStatus,
) -> AppResult<Invoice> {
    if let Some(invoice) = state.store.set_invoice_status(id, next).await? {
        return Ok(invoice);
    }
    let current = find(state, id).await?;
    validate_transition(InvoiceStatus::from_str_db(&current.status)?, next)?;
    // The transition is legal but the conditional update missed: another
    // request moved the invoice first.
    Err(AppError::Core(CoreError::Conflict(format!(
        "Invoice {} changed while being updated",
        current.invoice_number
    ))))
}

/// Record a payment against an invoice. Already-paid invoices are returned
/// unchanged so repeated confirmations are harmless.
pub(crate) async fn settle(
    state: &AppState,
    invoice: Invoice,
    reported: Option<Amount>,
) -> AppResult<Invoice> {
    let status = InvoiceStatus::from_str_db(&invoice.status)?;
    if status == InvoiceStatus::Paid {
        tracing::info!(invoice_id = invoice.id, "Invoice already paid; confirmation ignored");
        return Ok(invoice);
    }
    validate_transition(status, InvoiceStatus::Paid)?;

    let amount = settled_amount(invoice.amount_due, reported)?;
    match state
        .store
        .mark_invoice_paid(invoice.id, Some(amount), today())
        .await?
    {
        Some(paid) => {
            tracing::info!(
                invoice_id = paid.id,
                invoice_number = %paid.invoice_number,
                amount_paid = paid.amount_paid,
                "Invoice paid",
            );
            state
                .event_bus
                .publish(invoice_event(event_types::INVOICE_PAID, &paid));
            Ok(paid)
        }
        None => {
            let current = find(state, invoice.id).await?;
            if current.status == InvoiceStatus::Paid.as_str() {
                return Ok(current);
            }
            Err(AppError::Core(CoreError::Conflict(format!(
                "Invoice {} can no longer be paid (status '{}')",
                current.invoice_number, current.status
            ))))
        }
    }
}

/// A single-line invoice billing the submission's package.
pub(crate) fn invoice_for_submission(
    state: &AppState,
    submission: &OnboardingSubmission,
    status: InvoiceStatus,
) -> AppResult<NewInvoice> {
    let lines = price_line_items(&[LineItemInput {
        description: format!("{} package", submission.package_name),
        quantity: 1,
        unit_price: submission.package_price,
    }])?;
    let amount_due = total(&lines)?;
    let payload = &submission.form_data.0;
    let phone = payload.form().contact.phone.trim();

    Ok(NewInvoice {
        submission_id: Some(submission.id),
        client_name: payload.client_name(),
        client_email: submission.email.clone(),
        client_phone: (!phone.is_empty()).then(|| phone.to_string()),
        line_items: lines,
        amount_due,
        status: status.as_str().to_string(),
        due_date: today() + Duration::days(state.config.invoice_net_days),
        payment_link: Some(payment_url(state, submission)?),
        notes: Some(format!("Onboarding for {}", payload.practice_name())),
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/invoices
///
/// Line items are authoritative; totals are computed here.
pub async fn create(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateInvoice>,
) -> AppResult<impl IntoResponse> {
    let mut errors = FieldErrors::new();
    validate_client(&input.client_name, &input.client_email, &mut errors);
    let lines = priced(&input.line_items, &mut errors);

    let Some((line_items, amount_due)) = lines.filter(|_| errors.is_empty()) else {
        return Err(AppError::Core(CoreError::InvalidFields(errors)));
    };

    let new = NewInvoice {
        submission_id: None,
        client_name: input.client_name.trim().to_string(),
        client_email: input.client_email.trim().to_string(),
        client_phone: blank_to_none(input.client_phone),
        line_items,
        amount_due,
        status: InvoiceStatus::Draft.as_str().to_string(),
        due_date: input.due_date,
        payment_link: blank_to_none(input.payment_link),
        notes: blank_to_none(input.notes),
    };
    let invoice = state.store.create_invoice(new, today()).await?;

    tracing::info!(
        invoice_id = invoice.id,
        invoice_number = %invoice.invoice_number,
        amount_due = invoice.amount_due,
        operator_id = user.operator_id,
        "Invoice created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: invoice })))
}

/// GET /api/v1/invoices?status=&limit=&offset=
pub async fn list(
    RequireOperator(_user): RequireOperator,
    State(state): State<AppState>,
    Query(params): Query<StatusListParams>,
) -> AppResult<Json<DataResponse<Vec<Invoice>>>> {
    let status = params.status().map(InvoiceStatus::from_str_db).transpose()?;
    let (limit, offset) = params.page();
    let invoices = state.store.list_invoices(status, limit, offset).await?;
    Ok(Json(DataResponse { data: invoices }))
}

/// GET /api/v1/invoices/{id}
pub async fn get_by_id(
    RequireOperator(_user): RequireOperator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Invoice>>> {
    Ok(Json(DataResponse {
        data: find(&state, id).await?,
    }))
}

/// PUT /api/v1/invoices/{id}
///
/// Only drafts are editable.
pub async fn update(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateInvoice>,
) -> AppResult<Json<DataResponse<Invoice>>> {
    let mut errors = FieldErrors::new();
    if input.client_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        errors.insert("client_name".into(), "Client name is required".into());
    }
    if input
        .client_email
        .as_deref()
        .is_some_and(|e| e.trim().is_empty() || !e.contains('@'))
    {
        errors.insert("client_email".into(), "A valid email address is required".into());
    }
    let priced_lines = match &input.line_items {
        Some(lines) => priced(lines, &mut errors),
        None => None,
    };
    if !errors.is_empty() {
        return Err(AppError::Core(CoreError::InvalidFields(errors)));
    }

    let changes = InvoiceChanges {
        client_name: input.client_name.map(|n| n.trim().to_string()),
        client_email: input.client_email.map(|e| e.trim().to_string()),
        client_phone: input.client_phone,
        priced_lines,
        due_date: input.due_date,
        payment_link: input.payment_link,
        notes: input.notes,
    };

    match state.store.update_draft_invoice(id, changes).await? {
        Some(invoice) => Ok(Json(DataResponse { data: invoice })),
        None => {
            let current = find(&state, id).await?;
            Err(AppError::Core(CoreError::Conflict(format!(
                "Only draft invoices can be edited; invoice {} is '{}'",
                current.invoice_number, current.status
            ))))
        }
    }
}

/// POST /api/v1/invoices/{id}/send
pub async fn send(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Invoice>>> {
    let invoice = transition(&state, id, InvoiceStatus::Sent).await?;
    tracing::info!(
        invoice_id = id,
        invoice_number = %invoice.invoice_number,
        operator_id = user.operator_id,
        "Invoice sent",
    );
    state
        .event_bus
        .publish(invoice_event(event_types::INVOICE_SENT, &invoice));
    Ok(Json(DataResponse { data: invoice }))
}

/// POST /api/v1/invoices/{id}/void
pub async fn void(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Invoice>>> {
    let invoice = transition(&state, id, InvoiceStatus::Void).await?;
    tracing::info!(
        invoice_id = id,
        invoice_number = %invoice.invoice_number,
        operator_id = user.operator_id,
        "Invoice voided",
    );
    Ok(Json(DataResponse { data: invoice }))
}

/// POST /api/v1/invoices/from-submission/{submission_id}
///
/// Draft invoice billing a submission's package. One invoice per submission.
pub async fn create_from_submission(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(submission_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let submission = state
        .store
        .find_submission(submission_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::not_found("OnboardingSubmission", submission_id))
        })?;

    if state
        .store
        .find_invoice_by_submission(submission_id)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Submission {submission_id} already has an invoice"
        ))));
    }

    let new = invoice_for_submission(&state, &submission, InvoiceStatus::Draft)?;
    let invoice = state.store.create_invoice(new, today()).await?;

    tracing::info!(
        invoice_id = invoice.id,
        submission_id = %submission_id,
        operator_id = user.operator_id,
        "Invoice generated from submission",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: invoice })))
}

/// POST /api/v1/invoices/sweep-overdue
///
/// Run the overdue rule now instead of waiting for the background job.
pub async fn sweep_overdue(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<SweepResponse>>> {
    let invoices = sweep_and_notify(state.store.as_ref(), &state.event_bus, today()).await?;
    Ok(Json(DataResponse {
        data: SweepResponse {
            reclassified: invoices.len(),
            invoices,
        },
    }))
}
