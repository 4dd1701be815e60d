//! In-process [`Store`](super::Store).
//!
//! All state lives in one `State` behind a single `tokio::sync::Mutex`, so
//! every trait method holds the lock for its whole check-and-write and is
//! atomic with respect to every other call.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::types::Json;
use tokio::sync::Mutex;
use uuid::Uuid;

use clientdesk_core::campaign::CampaignCodeDraft;
use clientdesk_core::invoice::{format_invoice_number, reclassify, InvoiceStatus};
use clientdesk_core::onboarding::{OnboardingDraft, PackageSource, PreparedSubmission};
use clientdesk_core::package::{check_usage, DeclineReason};
use clientdesk_core::submission::SubmissionStatus;
use clientdesk_core::summary::BillingSummary;
use clientdesk_core::types::{Amount, DbId, Timestamp};

use super::{
    AccessCodeStore, CampaignCodeStore, DashboardStore, DraftStore, InvoiceStore, MarkPaid,
    OperatorStore, RedeemOutcome, StoreError, StoreResult, SubmissionStore, SubmitOutcome,
};
use crate::models::access_code::{AccessCode, NewAccessCode};
use crate::models::campaign_code::CampaignCode;
use crate::models::invoice::{Invoice, InvoiceChanges, NewInvoice};
use crate::models::onboarding_draft::OnboardingDraftRow;
use crate::models::operator::{NewOperator, Operator};
use crate::models::submission::OnboardingSubmission;

#[derive(Default)]
struct State {
    next_id: DbId,
    invoice_seq: i64,
    operators: Vec<Operator>,
    access_codes: BTreeMap<String, AccessCode>,
    campaign_codes: BTreeMap<String, CampaignCode>,
    drafts: HashMap<Uuid, OnboardingDraftRow>,
    submissions: HashMap<Uuid, OnboardingSubmission>,
    invoices: BTreeMap<DbId, Invoice>,
}

impl State {
    fn allocate_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn invoice_where(&mut self, id: DbId, from: &[InvoiceStatus]) -> Option<&mut Invoice> {
        self.invoices.get_mut(&id).filter(|inv| {
            InvoiceStatus::from_str_db(&inv.status).is_ok_and(|status| from.contains(&status))
        })
    }
}

/// Thread-safe in-memory store for tests and local development.
#[derive(Default, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page<T>(rows: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    let offset = usize::try_from(offset).unwrap_or(0);
    let limit = usize::try_from(limit).unwrap_or(0);
    rows.into_iter().skip(offset).take(limit).collect()
}

#[async_trait]
impl AccessCodeStore for MemoryStore {
    async fn create_access_code(&self, input: NewAccessCode) -> StoreResult<AccessCode> {
        let mut state = self.state.lock().await;
        if state.access_codes.contains_key(&input.code) {
            return Err(StoreError::Duplicate(format!("access code '{}'", input.code)));
        }
        let now = Utc::now();
        let row = AccessCode {
            id: state.allocate_id(),
            code: input.code,
            client_name: input.client_name,
            client_email: input.client_email,
            package_name: input.package_name,
            price: input.price,
            features: Json(input.features),
            max_uses: input.max_uses,
            used_count: 0,
            used: false,
            redeemed_by_email: None,
            last_redeemed_at: None,
            expires_at: input.expires_at,
            created_at: now,
            updated_at: now,
        };
        state.access_codes.insert(row.code.clone(), row.clone());
        Ok(row)
    }

    async fn list_access_codes(&self, limit: i64, offset: i64) -> StoreResult<Vec<AccessCode>> {
        let state = self.state.lock().await;
        let mut rows: Vec<AccessCode> = state.access_codes.values().cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(page(rows, limit, offset))
    }

    async fn find_access_code(&self, code: &str) -> StoreResult<Option<AccessCode>> {
        Ok(self.state.lock().await.access_codes.get(code).cloned())
    }

    async fn redeem_access_code(
        &self,
        code: &str,
        redeemer_email: &str,
        now: Timestamp,
    ) -> StoreResult<RedeemOutcome> {
        let mut state = self.state.lock().await;
        let Some(row) = state.access_codes.get_mut(code) else {
            return Ok(RedeemOutcome::Declined(DeclineReason::NotFound));
        };
        if let Err(reason) = check_usage(row.used_count, Some(row.max_uses), row.expires_at, now) {
            return Ok(RedeemOutcome::Declined(reason));
        }
        if row.used {
            return Ok(RedeemOutcome::Declined(DeclineReason::Exhausted));
        }

        row.used_count += 1;
        row.used = row.used_count >= row.max_uses;
        row.redeemed_by_email = Some(redeemer_email.to_string());
        row.last_redeemed_at = Some(now);
        row.updated_at = Utc::now();
        Ok(RedeemOutcome::Granted(row.clone()))
    }
}

#[async_trait]
impl CampaignCodeStore for MemoryStore {
    async fn create_campaign_code(&self, input: CampaignCodeDraft) -> StoreResult<CampaignCode> {
        let mut state = self.state.lock().await;
        if state.campaign_codes.contains_key(&input.code) {
            return Err(StoreError::Duplicate(format!("campaign code '{}'", input.code)));
        }
        let now = Utc::now();
        let row = CampaignCode {
            id: state.allocate_id(),
            code: input.code,
            display_name: input.display_name,
            price: input.price,
            features: Json(input.features),
            max_uses: input.max_uses,
            used_count: 0,
            expires_at: input.expires_at,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.campaign_codes.insert(row.code.clone(), row.clone());
        Ok(row)
    }

    async fn list_campaign_codes(
        &self,
        claimable_at: Option<Timestamp>,
    ) -> StoreResult<Vec<CampaignCode>> {
        let state = self.state.lock().await;
        let mut rows: Vec<CampaignCode> = state
            .campaign_codes
            .values()
            .filter(|c| claimable_at.is_none_or(|now| c.usage().check(now).is_ok()))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.price.cmp(&b.price).then_with(|| a.code.cmp(&b.code)));
        Ok(rows)
    }
}

#[async_trait]
impl DraftStore for MemoryStore {
    async fn create_draft(
        &self,
        id: Uuid,
        draft: &OnboardingDraft,
    ) -> StoreResult<OnboardingDraftRow> {
        let mut state = self.state.lock().await;
        if state.drafts.contains_key(&id) {
            return Err(StoreError::Duplicate(format!("draft {id}")));
        }
        let now = Utc::now();
        let row = OnboardingDraftRow {
            id,
            variant: draft.variant.as_str().to_string(),
            current_step: i32::from(draft.current_step),
            form_data: Json(draft.form_data.clone()),
            errors: Json(draft.errors.clone()),
            access_code: draft.access_code.clone(),
            selected_package: draft.selected_package.clone().map(Json),
            created_at: now,
            updated_at: now,
        };
        state.drafts.insert(id, row.clone());
        Ok(row)
    }

    async fn find_draft(&self, id: Uuid) -> StoreResult<Option<OnboardingDraftRow>> {
        Ok(self.state.lock().await.drafts.get(&id).cloned())
    }

    async fn save_draft(
        &self,
        id: Uuid,
        draft: &OnboardingDraft,
    ) -> StoreResult<Option<OnboardingDraftRow>> {
        let mut state = self.state.lock().await;
        let Some(row) = state.drafts.get_mut(&id) else {
            return Ok(None);
        };
        row.current_step = i32::from(draft.current_step);
        row.form_data = Json(draft.form_data.clone());
        row.errors = Json(draft.errors.clone());
        row.access_code = draft.access_code.clone();
        row.selected_package = draft.selected_package.clone().map(Json);
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn create_submission(
        &self,
        draft_id: Uuid,
        prepared: PreparedSubmission,
        now: Timestamp,
    ) -> StoreResult<SubmitOutcome> {
        let mut state = self.state.lock().await;
        if !state.drafts.contains_key(&draft_id) {
            return Ok(SubmitOutcome::DraftMissing);
        }

        let package = match prepared.package {
            PackageSource::Resolved(package) => package,
            PackageSource::Campaign(code) => {
                let Some(row) = state.campaign_codes.get_mut(&code) else {
                    return Ok(SubmitOutcome::CampaignDeclined(DeclineReason::NotFound));
                };
                if let Err(reason) = row.usage().check(now) {
                    return Ok(SubmitOutcome::CampaignDeclined(reason));
                }
                row.used_count += 1;
                row.updated_at = Utc::now();
                row.package()
            }
        };

        state.drafts.remove(&draft_id);
        let payload = prepared.payload;
        let row = OnboardingSubmission {
            id: Uuid::new_v4(),
            variant: payload.variant().as_str().to_string(),
            email: payload.email().to_string(),
            practice_name: payload.practice_name().to_string(),
            form_data: Json(payload),
            package_name: package.name,
            package_price: package.price,
            status: SubmissionStatus::PendingPayment.as_str().to_string(),
            created_at: now,
            paid_at: None,
        };
        state.submissions.insert(row.id, row.clone());
        Ok(SubmitOutcome::Created(row))
    }

    async fn find_submission(&self, id: Uuid) -> StoreResult<Option<OnboardingSubmission>> {
        Ok(self.state.lock().await.submissions.get(&id).cloned())
    }

    async fn list_submissions(
        &self,
        status: Option<SubmissionStatus>,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<OnboardingSubmission>> {
        let state = self.state.lock().await;
        let mut rows: Vec<OnboardingSubmission> = state
            .submissions
            .values()
            .filter(|s| status.is_none_or(|wanted| s.status == wanted.as_str()))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(rows, limit, offset))
    }

    async fn mark_submission_paid(&self, id: Uuid, now: Timestamp) -> StoreResult<MarkPaid> {
        let mut state = self.state.lock().await;
        let Some(row) = state.submissions.get_mut(&id) else {
            return Ok(MarkPaid::NotFound);
        };
        if row.status == SubmissionStatus::Paid.as_str() {
            return Ok(MarkPaid::AlreadyPaid(row.clone()));
        }
        row.status = SubmissionStatus::Paid.as_str().to_string();
        row.paid_at = Some(now);
        Ok(MarkPaid::Marked(row.clone()))
    }
}

#[async_trait]
impl InvoiceStore for MemoryStore {
    async fn create_invoice(
        &self,
        input: NewInvoice,
        issued_on: NaiveDate,
    ) -> StoreResult<Invoice> {
        let mut state = self.state.lock().await;
        if let Some(submission_id) = input.submission_id {
            if state
                .invoices
                .values()
                .any(|inv| inv.submission_id == Some(submission_id))
            {
                return Err(StoreError::Duplicate(format!(
                    "invoice for submission {submission_id}"
                )));
            }
        }

        state.invoice_seq += 1;
        let now = Utc::now();
        let row = Invoice {
            id: state.allocate_id(),
            invoice_number: format_invoice_number(issued_on, state.invoice_seq),
            submission_id: input.submission_id,
            client_name: input.client_name,
            client_email: input.client_email,
            client_phone: input.client_phone,
            line_items: Json(input.line_items),
            amount_due: input.amount_due,
            amount_paid: 0,
            status: input.status,
            due_date: input.due_date,
            paid_date: None,
            payment_link: input.payment_link,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };
        state.invoices.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_invoice(&self, id: DbId) -> StoreResult<Option<Invoice>> {
        Ok(self.state.lock().await.invoices.get(&id).cloned())
    }

    async fn find_invoice_by_submission(
        &self,
        submission_id: Uuid,
    ) -> StoreResult<Option<Invoice>> {
        let state = self.state.lock().await;
        Ok(state
            .invoices
            .values()
            .find(|inv| inv.submission_id == Some(submission_id))
            .cloned())
    }

    async fn list_invoices(
        &self,
        status: Option<InvoiceStatus>,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Invoice>> {
        let state = self.state.lock().await;
        let mut rows: Vec<Invoice> = state
            .invoices
            .values()
            .filter(|inv| status.is_none_or(|wanted| inv.status == wanted.as_str()))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.due_date.cmp(&a.due_date).then(b.id.cmp(&a.id)));
        Ok(page(rows, limit, offset))
    }

    async fn update_draft_invoice(
        &self,
        id: DbId,
        changes: InvoiceChanges,
    ) -> StoreResult<Option<Invoice>> {
        let mut state = self.state.lock().await;
        let Some(inv) = state.invoice_where(id, &[InvoiceStatus::Draft]) else {
            return Ok(None);
        };
        if let Some(v) = changes.client_name {
            inv.client_name = v;
        }
        if let Some(v) = changes.client_email {
            inv.client_email = v;
        }
        if let Some(v) = changes.client_phone {
            inv.client_phone = Some(v);
        }
        if let Some((items, amount_due)) = changes.priced_lines {
            inv.line_items = Json(items);
            inv.amount_due = amount_due;
        }
        if let Some(v) = changes.due_date {
            inv.due_date = v;
        }
        if let Some(v) = changes.payment_link {
            inv.payment_link = Some(v);
        }
        if let Some(v) = changes.notes {
            inv.notes = Some(v);
        }
        inv.updated_at = Utc::now();
        Ok(Some(inv.clone()))
    }

    async fn set_invoice_status(
        &self,
        id: DbId,
        next: InvoiceStatus,
    ) -> StoreResult<Option<Invoice>> {
        let mut state = self.state.lock().await;
        let Some(inv) = state.invoice_where(id, InvoiceStatus::allowed_sources(next)) else {
            return Ok(None);
        };
        inv.status = next.as_str().to_string();
        inv.updated_at = Utc::now();
        Ok(Some(inv.clone()))
    }

    async fn mark_invoice_paid(
        &self,
        id: DbId,
        amount_paid: Option<Amount>,
        paid_on: NaiveDate,
    ) -> StoreResult<Option<Invoice>> {
        let mut state = self.state.lock().await;
        let Some(inv) = state.invoice_where(id, InvoiceStatus::allowed_sources(InvoiceStatus::Paid))
        else {
            return Ok(None);
        };
        inv.status = InvoiceStatus::Paid.as_str().to_string();
        inv.amount_paid = amount_paid.unwrap_or(inv.amount_due);
        inv.paid_date = Some(paid_on);
        inv.updated_at = Utc::now();
        Ok(Some(inv.clone()))
    }

    async fn sweep_overdue(&self, today: NaiveDate) -> StoreResult<Vec<Invoice>> {
        let mut state = self.state.lock().await;
        let mut changed = Vec::new();
        for inv in state.invoices.values_mut() {
            let status = InvoiceStatus::from_str_db(&inv.status)
                .map_err(|e| StoreError::Corrupt(e.to_string()))?;
            let next = reclassify(status, inv.due_date, today);
            if next != status {
                inv.status = next.as_str().to_string();
                inv.updated_at = Utc::now();
                changed.push(inv.clone());
            }
        }
        Ok(changed)
    }
}

#[async_trait]
impl OperatorStore for MemoryStore {
    async fn create_operator(&self, input: NewOperator) -> StoreResult<Operator> {
        let mut state = self.state.lock().await;
        if state
            .operators
            .iter()
            .any(|o| o.email.eq_ignore_ascii_case(&input.email))
        {
            return Err(StoreError::Duplicate(format!("operator '{}'", input.email)));
        }
        let now = Utc::now();
        let row = Operator {
            id: state.allocate_id(),
            email: input.email,
            display_name: input.display_name,
            password_hash: input.password_hash,
            role: input.role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.operators.push(row.clone());
        Ok(row)
    }

    async fn find_operator_by_email(&self, email: &str) -> StoreResult<Option<Operator>> {
        let state = self.state.lock().await;
        Ok(state
            .operators
            .iter()
            .find(|o| o.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

#[async_trait]
impl DashboardStore for MemoryStore {
    async fn billing_summary(&self) -> StoreResult<BillingSummary> {
        let state = self.state.lock().await;
        let mut summary = BillingSummary::default();
        for s in state.submissions.values() {
            let status = SubmissionStatus::from_str_db(&s.status)
                .map_err(|e| StoreError::Corrupt(e.to_string()))?;
            summary.add_submission(status, 1);
        }
        for inv in state.invoices.values() {
            let status = InvoiceStatus::from_str_db(&inv.status)
                .map_err(|e| StoreError::Corrupt(e.to_string()))?;
            summary.add_invoices(status, 1, inv.amount_due, inv.amount_paid);
        }
        Ok(summary)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
