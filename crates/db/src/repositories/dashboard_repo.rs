//! Aggregate reads backing the billing summary.

use sqlx::PgPool;

/// Count of submissions for one status.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SubmissionStatusCount {
    pub status: String,
    pub count: i64,
}

/// Invoice counts and sums for one status.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InvoiceStatusTotals {
    pub status: String,
    pub count: i64,
    pub amount_due: i64,
    pub amount_paid: i64,
}

pub struct DashboardRepo;

impl DashboardRepo {
    pub async fn submission_counts(
        pool: &PgPool,
    ) -> Result<Vec<SubmissionStatusCount>, sqlx::Error> {
        sqlx::query_as::<_, SubmissionStatusCount>(
            "SELECT status, COUNT(*)::BIGINT AS count
             FROM onboarding_submissions
             GROUP BY status",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn invoice_totals(pool: &PgPool) -> Result<Vec<InvoiceStatusTotals>, sqlx::Error> {
        sqlx::query_as::<_, InvoiceStatusTotals>(
            "SELECT status,
                    COUNT(*)::BIGINT AS count,
                    COALESCE(SUM(amount_due), 0)::BIGINT AS amount_due,
                    COALESCE(SUM(amount_paid), 0)::BIGINT AS amount_paid
             FROM invoices
             GROUP BY status",
        )
        .fetch_all(pool)
        .await
    }
}
