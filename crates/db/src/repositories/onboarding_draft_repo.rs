//! Repository for the `onboarding_drafts` table.

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use clientdesk_core::onboarding::OnboardingDraft;

use crate::models::onboarding_draft::OnboardingDraftRow;

const COLUMNS: &str = "id, variant, current_step, form_data, errors, access_code, \
                       selected_package, created_at, updated_at";

/// Provides persistence for in-progress onboarding drafts.
pub struct OnboardingDraftRepo;

impl OnboardingDraftRepo {
    pub async fn create(
        pool: &PgPool,
        id: Uuid,
        draft: &OnboardingDraft,
    ) -> Result<OnboardingDraftRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO onboarding_drafts
                (id, variant, current_step, form_data, errors, access_code, selected_package)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingDraftRow>(&query)
            .bind(id)
            .bind(draft.variant.as_str())
            .bind(i32::from(draft.current_step))
            .bind(Json(&draft.form_data))
            .bind(Json(&draft.errors))
            .bind(&draft.access_code)
            .bind(draft.selected_package.as_ref().map(Json))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<OnboardingDraftRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM onboarding_drafts WHERE id = $1");
        sqlx::query_as::<_, OnboardingDraftRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite the mutable state of a draft. The variant never changes.
    ///
    /// Returns `None` if the draft no longer exists.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        draft: &OnboardingDraft,
    ) -> Result<Option<OnboardingDraftRow>, sqlx::Error> {
        let query = format!(
            "UPDATE onboarding_drafts SET
                current_step = $2,
                form_data = $3,
                errors = $4,
                access_code = $5,
                selected_package = $6,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingDraftRow>(&query)
            .bind(id)
            .bind(i32::from(draft.current_step))
            .bind(Json(&draft.form_data))
            .bind(Json(&draft.errors))
            .bind(&draft.access_code)
            .bind(draft.selected_package.as_ref().map(Json))
            .fetch_optional(pool)
            .await
    }

    /// Delete a draft. Returns `true` if a row was removed.
    pub async fn delete(
        conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
        id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM onboarding_drafts WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
