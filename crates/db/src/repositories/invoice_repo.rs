//! Repository for the `invoices` table.

use chrono::NaiveDate;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use clientdesk_core::types::{Amount, DbId};

use crate::models::invoice::{Invoice, InvoiceChanges, NewInvoice};

const COLUMNS: &str = "id, invoice_number, submission_id, client_name, client_email, client_phone, \
                       line_items, amount_due, amount_paid, status, due_date, paid_date, \
                       payment_link, notes, created_at, updated_at";

/// Provides CRUD and status transitions for invoices.
///
/// Every status change is a conditional update on the expected prior
/// status, so a stale caller can never overwrite a terminal state.
pub struct InvoiceRepo;

impl InvoiceRepo {
    /// Next value of `invoice_number_seq`.
    pub async fn next_number(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT nextval('invoice_number_seq')")
            .fetch_one(pool)
            .await
    }

    /// Insert a new invoice with a pre-formatted number.
    pub async fn create(
        pool: &PgPool,
        invoice_number: &str,
        input: &NewInvoice,
    ) -> Result<Invoice, sqlx::Error> {
        let query = format!(
            "INSERT INTO invoices
                (invoice_number, submission_id, client_name, client_email, client_phone,
                 line_items, amount_due, status, due_date, payment_link, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(invoice_number)
            .bind(input.submission_id)
            .bind(&input.client_name)
            .bind(&input.client_email)
            .bind(&input.client_phone)
            .bind(Json(&input.line_items))
            .bind(input.amount_due)
            .bind(&input.status)
            .bind(input.due_date)
            .bind(&input.payment_link)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Invoice>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invoices WHERE id = $1");
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_submission(
        pool: &PgPool,
        submission_id: Uuid,
    ) -> Result<Option<Invoice>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invoices WHERE submission_id = $1");
        sqlx::query_as::<_, Invoice>(&query)
            .bind(submission_id)
            .fetch_optional(pool)
            .await
    }

    /// List invoices by due date, optionally filtered by status.
    pub async fn list(
        pool: &PgPool,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Invoice>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM invoices
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY due_date DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Apply changes to a `draft` invoice. Only non-`None` fields are applied.
    ///
    /// Returns `None` if the invoice is missing or no longer a draft.
    pub async fn update_draft(
        pool: &PgPool,
        id: DbId,
        changes: &InvoiceChanges,
    ) -> Result<Option<Invoice>, sqlx::Error> {
        let (line_items, amount_due) = match &changes.priced_lines {
            Some((items, amount)) => (Some(Json(items)), Some(*amount)),
            None => (None, None),
        };
        let query = format!(
            "UPDATE invoices SET
                client_name = COALESCE($2, client_name),
                client_email = COALESCE($3, client_email),
                client_phone = COALESCE($4, client_phone),
                line_items = COALESCE($5, line_items),
                amount_due = COALESCE($6, amount_due),
                due_date = COALESCE($7, due_date),
                payment_link = COALESCE($8, payment_link),
                notes = COALESCE($9, notes),
                updated_at = NOW()
             WHERE id = $1 AND status = 'draft'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .bind(&changes.client_name)
            .bind(&changes.client_email)
            .bind(&changes.client_phone)
            .bind(line_items)
            .bind(amount_due)
            .bind(changes.due_date)
            .bind(&changes.payment_link)
            .bind(&changes.notes)
            .fetch_optional(pool)
            .await
    }

    /// Move an invoice to `next` if its current status is one of `from`.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        next: &str,
        from: &[String],
    ) -> Result<Option<Invoice>, sqlx::Error> {
        let query = format!(
            "UPDATE invoices SET status = $2, updated_at = NOW()
             WHERE id = $1 AND status = ANY($3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .bind(next)
            .bind(from)
            .fetch_optional(pool)
            .await
    }

    /// Record payment on a `sent` or `overdue` invoice.
    ///
    /// `amount_paid` defaults to the stored `amount_due` when `None`.
    pub async fn mark_paid(
        pool: &PgPool,
        id: DbId,
        amount_paid: Option<Amount>,
        paid_date: NaiveDate,
    ) -> Result<Option<Invoice>, sqlx::Error> {
        let query = format!(
            "UPDATE invoices SET
                status = 'paid',
                amount_paid = COALESCE($2, amount_due),
                paid_date = $3,
                updated_at = NOW()
             WHERE id = $1 AND status IN ('sent', 'overdue')
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .bind(amount_paid)
            .bind(paid_date)
            .fetch_optional(pool)
            .await
    }

    /// Reclassify every `sent` invoice due before `today` as `overdue`.
    ///
    /// Returns only the rows changed by this call; re-running is a no-op.
    pub async fn sweep_overdue(
        pool: &PgPool,
        today: NaiveDate,
    ) -> Result<Vec<Invoice>, sqlx::Error> {
        let query = format!(
            "UPDATE invoices SET status = 'overdue', updated_at = NOW()
             WHERE status = 'sent' AND due_date < $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(today)
            .fetch_all(pool)
            .await
    }
}
