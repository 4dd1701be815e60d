//! Repository for the `onboarding_submissions` table.

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use clientdesk_core::onboarding::SubmissionPayload;
use clientdesk_core::package::SelectedPackage;
use clientdesk_core::types::Timestamp;

use crate::models::submission::OnboardingSubmission;

const COLUMNS: &str = "id, variant, form_data, email, practice_name, package_name, \
                       package_price, status, created_at, paid_at";

/// Provides persistence for completed onboarding submissions.
pub struct SubmissionRepo;

impl SubmissionRepo {
    /// Insert a `pending_payment` submission.
    pub async fn create(
        conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
        id: Uuid,
        payload: &SubmissionPayload,
        package: &SelectedPackage,
        created_at: Timestamp,
    ) -> Result<OnboardingSubmission, sqlx::Error> {
        let query = format!(
            "INSERT INTO onboarding_submissions
                (id, variant, form_data, email, practice_name, package_name,
                 package_price, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingSubmission>(&query)
            .bind(id)
            .bind(payload.variant().as_str())
            .bind(Json(payload))
            .bind(payload.email())
            .bind(payload.practice_name())
            .bind(&package.name)
            .bind(package.price)
            .bind(created_at)
            .fetch_one(conn)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<OnboardingSubmission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM onboarding_submissions WHERE id = $1");
        sqlx::query_as::<_, OnboardingSubmission>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List submissions newest first, optionally filtered by status.
    pub async fn list(
        pool: &PgPool,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<OnboardingSubmission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM onboarding_submissions
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, OnboardingSubmission>(&query)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Move a pending submission to `paid`.
    ///
    /// Returns `None` when the submission is missing or already paid.
    pub async fn mark_paid(
        pool: &PgPool,
        id: Uuid,
        paid_at: Timestamp,
    ) -> Result<Option<OnboardingSubmission>, sqlx::Error> {
        let query = format!(
            "UPDATE onboarding_submissions SET
                status = 'paid',
                paid_at = $2
             WHERE id = $1 AND status = 'pending_payment'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingSubmission>(&query)
            .bind(id)
            .bind(paid_at)
            .fetch_optional(pool)
            .await
    }
}
