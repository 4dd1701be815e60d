//! The persistence port the API is written against.
//!
//! Each trait groups the operations for one aggregate. Every method is a
//! single atomic unit at the store: implementations must never split a
//! check from the write it guards across two calls.
//!
//! - [`PgStore`](postgres::PgStore) delegates to the PostgreSQL repositories.
//! - [`MemoryStore`](memory::MemoryStore) keeps all state behind one
//!   `tokio::sync::Mutex`; used by tests and `STORE=memory` dev runs.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use clientdesk_core::campaign::CampaignCodeDraft;
use clientdesk_core::invoice::InvoiceStatus;
use clientdesk_core::onboarding::{OnboardingDraft, PreparedSubmission};
use clientdesk_core::package::DeclineReason;
use clientdesk_core::submission::SubmissionStatus;
use clientdesk_core::summary::BillingSummary;
use clientdesk_core::types::{Amount, DbId, Timestamp};

use crate::models::access_code::{AccessCode, NewAccessCode};
use crate::models::campaign_code::CampaignCode;
use crate::models::invoice::{Invoice, InvoiceChanges, NewInvoice};
use crate::models::onboarding_draft::OnboardingDraftRow;
use crate::models::operator::{NewOperator, Operator};
use crate::models::submission::OnboardingSubmission;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// A unique key already exists.
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// A stored value failed to parse back into its domain type.
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of an access-code redemption.
#[derive(Debug, Clone)]
pub enum RedeemOutcome {
    Granted(AccessCode),
    Declined(DeclineReason),
}

/// Outcome of turning a draft into a submission.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Created(OnboardingSubmission),
    /// The draft was already submitted or never existed.
    DraftMissing,
    /// The chosen campaign code could not be claimed.
    CampaignDeclined(DeclineReason),
}

/// Outcome of applying a payment confirmation to a submission.
#[derive(Debug, Clone)]
pub enum MarkPaid {
    /// Moved `pending_payment → paid` by this call.
    Marked(OnboardingSubmission),
    /// Already paid; nothing changed.
    AlreadyPaid(OnboardingSubmission),
    NotFound,
}

#[async_trait]
pub trait AccessCodeStore: Send + Sync {
    async fn create_access_code(&self, input: NewAccessCode) -> StoreResult<AccessCode>;
    async fn list_access_codes(&self, limit: i64, offset: i64) -> StoreResult<Vec<AccessCode>>;
    async fn find_access_code(&self, code: &str) -> StoreResult<Option<AccessCode>>;

    /// Check and consume one use of `code` as a single atomic step.
    async fn redeem_access_code(
        &self,
        code: &str,
        redeemer_email: &str,
        now: Timestamp,
    ) -> StoreResult<RedeemOutcome>;
}

#[async_trait]
pub trait CampaignCodeStore: Send + Sync {
    async fn create_campaign_code(&self, input: CampaignCodeDraft) -> StoreResult<CampaignCode>;

    /// All codes, or only those claimable at the given instant.
    async fn list_campaign_codes(
        &self,
        claimable_at: Option<Timestamp>,
    ) -> StoreResult<Vec<CampaignCode>>;
}

#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn create_draft(
        &self,
        id: Uuid,
        draft: &OnboardingDraft,
    ) -> StoreResult<OnboardingDraftRow>;
    async fn find_draft(&self, id: Uuid) -> StoreResult<Option<OnboardingDraftRow>>;
    async fn save_draft(
        &self,
        id: Uuid,
        draft: &OnboardingDraft,
    ) -> StoreResult<Option<OnboardingDraftRow>>;
}

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Atomically delete the draft, claim the campaign code when the package
    /// comes from the catalog, and insert a `pending_payment` submission.
    async fn create_submission(
        &self,
        draft_id: Uuid,
        prepared: PreparedSubmission,
        now: Timestamp,
    ) -> StoreResult<SubmitOutcome>;

    async fn find_submission(&self, id: Uuid) -> StoreResult<Option<OnboardingSubmission>>;

    async fn list_submissions(
        &self,
        status: Option<SubmissionStatus>,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<OnboardingSubmission>>;

    /// Idempotent `pending_payment → paid`.
    async fn mark_submission_paid(&self, id: Uuid, now: Timestamp) -> StoreResult<MarkPaid>;
}

#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Insert an invoice, assigning the next human-facing number.
    async fn create_invoice(&self, input: NewInvoice, issued_on: NaiveDate) -> StoreResult<Invoice>;
    async fn find_invoice(&self, id: DbId) -> StoreResult<Option<Invoice>>;
    async fn find_invoice_by_submission(&self, submission_id: Uuid) -> StoreResult<Option<Invoice>>;

    async fn list_invoices(
        &self,
        status: Option<InvoiceStatus>,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Invoice>>;

    /// Edit a `draft` invoice. `None` when missing or no longer a draft.
    async fn update_draft_invoice(
        &self,
        id: DbId,
        changes: InvoiceChanges,
    ) -> StoreResult<Option<Invoice>>;

    /// Move to `next` only from one of its allowed source states.
    async fn set_invoice_status(
        &self,
        id: DbId,
        next: InvoiceStatus,
    ) -> StoreResult<Option<Invoice>>;

    /// `sent | overdue → paid`, recording the amount and date.
    async fn mark_invoice_paid(
        &self,
        id: DbId,
        amount_paid: Option<Amount>,
        paid_on: NaiveDate,
    ) -> StoreResult<Option<Invoice>>;

    /// Apply the overdue rule, returning the invoices it changed.
    async fn sweep_overdue(&self, today: NaiveDate) -> StoreResult<Vec<Invoice>>;
}

#[async_trait]
pub trait OperatorStore: Send + Sync {
    async fn create_operator(&self, input: NewOperator) -> StoreResult<Operator>;
    async fn find_operator_by_email(&self, email: &str) -> StoreResult<Option<Operator>>;
}

#[async_trait]
pub trait DashboardStore: Send + Sync {
    async fn billing_summary(&self) -> StoreResult<BillingSummary>;

    /// Cheap round-trip used by the health endpoint.
    async fn ping(&self) -> StoreResult<()>;
}

/// Everything the service needs from persistence.
pub trait Store:
    AccessCodeStore
    + CampaignCodeStore
    + DraftStore
    + SubmissionStore
    + InvoiceStore
    + OperatorStore
    + DashboardStore
{
}

impl<T> Store for T where
    T: AccessCodeStore
        + CampaignCodeStore
        + DraftStore
        + SubmissionStore
        + InvoiceStore
        + OperatorStore
        + DashboardStore
{
}
