//! [`Store`](super::Store) backed by PostgreSQL via the repositories.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use clientdesk_core::campaign::CampaignCodeDraft;
use clientdesk_core::invoice::{format_invoice_number, InvoiceStatus};
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
use crate::repositories::{
    AccessCodeRepo, CampaignCodeRepo, DashboardRepo, InvoiceRepo, OnboardingDraftRepo,
    OperatorRepo, SubmissionRepo,
};
use crate::DbPool;

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl AccessCodeStore for PgStore {
    async fn create_access_code(&self, input: NewAccessCode) -> StoreResult<AccessCode> {
        Ok(AccessCodeRepo::create(&self.pool, &input).await?)
    }

    async fn list_access_codes(&self, limit: i64, offset: i64) -> StoreResult<Vec<AccessCode>> {
        Ok(AccessCodeRepo::list(&self.pool, limit, offset).await?)
    }

    async fn find_access_code(&self, code: &str) -> StoreResult<Option<AccessCode>> {
        Ok(AccessCodeRepo::find_by_code(&self.pool, code).await?)
    }

    async fn redeem_access_code(
        &self,
        code: &str,
        redeemer_email: &str,
        now: Timestamp,
    ) -> StoreResult<RedeemOutcome> {
        if let Some(row) = AccessCodeRepo::redeem(&self.pool, code, redeemer_email, now).await? {
            return Ok(RedeemOutcome::Granted(row));
        }

        // Nothing was written; read back only to explain the decline.
        let reason = match AccessCodeRepo::find_by_code(&self.pool, code).await? {
            None => DeclineReason::NotFound,
            Some(row) => check_usage(row.used_count, Some(row.max_uses), row.expires_at, now)
                .err()
                .unwrap_or(DeclineReason::Exhausted),
        };
        Ok(RedeemOutcome::Declined(reason))
    }
}

#[async_trait]
impl CampaignCodeStore for PgStore {
    async fn create_campaign_code(&self, input: CampaignCodeDraft) -> StoreResult<CampaignCode> {
        Ok(CampaignCodeRepo::create(&self.pool, &input).await?)
    }

    async fn list_campaign_codes(
        &self,
        claimable_at: Option<Timestamp>,
    ) -> StoreResult<Vec<CampaignCode>> {
        let rows = match claimable_at {
            Some(now) => CampaignCodeRepo::list_claimable(&self.pool, now).await?,
            None => CampaignCodeRepo::list(&self.pool).await?,
        };
        Ok(rows)
    }
}

#[async_trait]
impl DraftStore for PgStore {
    async fn create_draft(
        &self,
        id: Uuid,
        draft: &OnboardingDraft,
    ) -> StoreResult<OnboardingDraftRow> {
        Ok(OnboardingDraftRepo::create(&self.pool, id, draft).await?)
    }

    async fn find_draft(&self, id: Uuid) -> StoreResult<Option<OnboardingDraftRow>> {
        Ok(OnboardingDraftRepo::find_by_id(&self.pool, id).await?)
    }

    async fn save_draft(
        &self,
        id: Uuid,
        draft: &OnboardingDraft,
    ) -> StoreResult<Option<OnboardingDraftRow>> {
        Ok(OnboardingDraftRepo::update(&self.pool, id, draft).await?)
    }
}

#[async_trait]
impl SubmissionStore for PgStore {
    async fn create_submission(
        &self,
        draft_id: Uuid,
        prepared: PreparedSubmission,
        now: Timestamp,
    ) -> StoreResult<SubmitOutcome> {
        let mut tx = self.pool.begin().await?;

        // The draft row stays locked until commit or rollback.
        if !OnboardingDraftRepo::delete(&mut *tx, draft_id).await? {
            return Ok(SubmitOutcome::DraftMissing);
        }

        let package = match prepared.package {
            PackageSource::Resolved(package) => package,
            PackageSource::Campaign(code) => {
                match CampaignCodeRepo::claim(&mut *tx, &code, now).await? {
                    Some(row) => row.package(),
                    None => {
                        let reason = match CampaignCodeRepo::find_by_code(&mut *tx, &code).await? {
                            None => DeclineReason::NotFound,
                            Some(row) => row
                                .usage()
                                .check(now)
                                .err()
                                .unwrap_or(DeclineReason::Exhausted),
                        };
                        return Ok(SubmitOutcome::CampaignDeclined(reason));
                    }
                }
            }
        };

        let submission_id = Uuid::new_v4();
        let submission =
            SubmissionRepo::create(&mut *tx, submission_id, &prepared.payload, &package, now)
                .await?;
        tx.commit().await?;
        Ok(SubmitOutcome::Created(submission))
    }

    async fn find_submission(&self, id: Uuid) -> StoreResult<Option<OnboardingSubmission>> {
        Ok(SubmissionRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_submissions(
        &self,
        status: Option<SubmissionStatus>,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<OnboardingSubmission>> {
        let status = status.as_ref().map(SubmissionStatus::as_str);
        Ok(SubmissionRepo::list(&self.pool, status, limit, offset).await?)
    }

    async fn mark_submission_paid(&self, id: Uuid, now: Timestamp) -> StoreResult<MarkPaid> {
        if let Some(row) = SubmissionRepo::mark_paid(&self.pool, id, now).await? {
            return Ok(MarkPaid::Marked(row));
        }
        Ok(match SubmissionRepo::find_by_id(&self.pool, id).await? {
            Some(row) => MarkPaid::AlreadyPaid(row),
            None => MarkPaid::NotFound,
        })
    }
}

#[async_trait]
impl InvoiceStore for PgStore {
    async fn create_invoice(
        &self,
        input: NewInvoice,
        issued_on: NaiveDate,
    ) -> StoreResult<Invoice> {
        let seq = InvoiceRepo::next_number(&self.pool).await?;
        let number = format_invoice_number(issued_on, seq);
        Ok(InvoiceRepo::create(&self.pool, &number, &input).await?)
    }

    async fn find_invoice(&self, id: DbId) -> StoreResult<Option<Invoice>> {
        Ok(InvoiceRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_invoice_by_submission(
        &self,
        submission_id: Uuid,
    ) -> StoreResult<Option<Invoice>> {
        Ok(InvoiceRepo::find_by_submission(&self.pool, submission_id).await?)
    }

    async fn list_invoices(
        &self,
        status: Option<InvoiceStatus>,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Invoice>> {
        let status = status.as_ref().map(InvoiceStatus::as_str);
        Ok(InvoiceRepo::list(&self.pool, status, limit, offset).await?)
    }

    async fn update_draft_invoice(
        &self,
        id: DbId,
        changes: InvoiceChanges,
    ) -> StoreResult<Option<Invoice>> {
        Ok(InvoiceRepo::update_draft(&self.pool, id, &changes).await?)
    }

    async fn set_invoice_status(
        &self,
        id: DbId,
        next: InvoiceStatus,
    ) -> StoreResult<Option<Invoice>> {
        let from: Vec<String> = InvoiceStatus::allowed_sources(next)
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();
        if from.is_empty() {
            return Ok(None);
        }
        Ok(InvoiceRepo::set_status(&self.pool, id, next.as_str(), &from).await?)
    }

    async fn mark_invoice_paid(
        &self,
        id: DbId,
        amount_paid: Option<Amount>,
        paid_on: NaiveDate,
    ) -> StoreResult<Option<Invoice>> {
        Ok(InvoiceRepo::mark_paid(&self.pool, id, amount_paid, paid_on).await?)
    }

    async fn sweep_overdue(&self, today: NaiveDate) -> StoreResult<Vec<Invoice>> {
        Ok(InvoiceRepo::sweep_overdue(&self.pool, today).await?)
    }
}

#[async_trait]
impl OperatorStore for PgStore {
    async fn create_operator(&self, input: NewOperator) -> StoreResult<Operator> {
        Ok(OperatorRepo::create(&self.pool, &input).await?)
    }

    async fn find_operator_by_email(&self, email: &str) -> StoreResult<Option<Operator>> {
        Ok(OperatorRepo::find_by_email(&self.pool, email).await?)
    }
}

#[async_trait]
impl DashboardStore for PgStore {
    async fn billing_summary(&self) -> StoreResult<BillingSummary> {
        let mut summary = BillingSummary::default();

        for row in DashboardRepo::submission_counts(&self.pool).await? {
            let status = SubmissionStatus::from_str_db(&row.status)
                .map_err(|e| StoreError::Corrupt(e.to_string()))?;
            summary.add_submission(status, row.count);
        }
        for row in DashboardRepo::invoice_totals(&self.pool).await? {
            let status = InvoiceStatus::from_str_db(&row.status)
                .map_err(|e| StoreError::Corrupt(e.to_string()))?;
            summary.add_invoices(status, row.count, row.amount_due, row.amount_paid);
        }
        Ok(summary)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(crate::health_check(&self.pool).await?)
    }
}
