//! Repository for the `campaign_codes` table.

use sqlx::types::Json;
use sqlx::PgPool;

use clientdesk_core::campaign::CampaignCodeDraft;
use clientdesk_core::types::Timestamp;

use crate::models::campaign_code::CampaignCode;

const COLUMNS: &str = "id, code, display_name, price, features, max_uses, used_count, \
                       expires_at, is_active, created_at, updated_at";

/// Provides catalog reads and the atomic use-count claim for campaign codes.
pub struct CampaignCodeRepo;

impl CampaignCodeRepo {
    /// Insert a validated campaign code, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CampaignCodeDraft,
    ) -> Result<CampaignCode, sqlx::Error> {
        let query = format!(
            "INSERT INTO campaign_codes (code, display_name, price, features, max_uses, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CampaignCode>(&query)
            .bind(&input.code)
            .bind(&input.display_name)
            .bind(input.price)
            .bind(Json(&input.features))
            .bind(input.max_uses)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_code(
        conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
        code: &str,
    ) -> Result<Option<CampaignCode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM campaign_codes WHERE code = $1");
        sqlx::query_as::<_, CampaignCode>(&query)
            .bind(code)
            .fetch_optional(conn)
            .await
    }

    /// List every code ordered by price.
    pub async fn list(pool: &PgPool) -> Result<Vec<CampaignCode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM campaign_codes ORDER BY price, code");
        sqlx::query_as::<_, CampaignCode>(&query).fetch_all(pool).await
    }

    /// List codes a client could claim at `now`.
    pub async fn list_claimable(
        pool: &PgPool,
        now: Timestamp,
    ) -> Result<Vec<CampaignCode>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM campaign_codes
             WHERE is_active
               AND (expires_at IS NULL OR expires_at > $1)
               AND (max_uses IS NULL OR used_count < max_uses)
             ORDER BY price, code"
        );
        sqlx::query_as::<_, CampaignCode>(&query)
            .bind(now)
            .fetch_all(pool)
            .await
    }

    /// Increment the use count if the code is still claimable.
    ///
    /// Returns `None` without side effects when the code is missing,
    /// inactive, expired or exhausted.
    pub async fn claim(
        conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
        code: &str,
        now: Timestamp,
    ) -> Result<Option<CampaignCode>, sqlx::Error> {
        let query = format!(
            "UPDATE campaign_codes SET
                used_count = used_count + 1,
                updated_at = NOW()
             WHERE code = $1
               AND is_active
               AND (expires_at IS NULL OR expires_at > $2)
               AND (max_uses IS NULL OR used_count < max_uses)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CampaignCode>(&query)
            .bind(code)
            .bind(now)
            .fetch_optional(conn)
            .await
    }
}
