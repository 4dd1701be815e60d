//! Repository for the `access_codes` table.

use sqlx::types::Json;
use sqlx::PgPool;

use clientdesk_core::types::Timestamp;

use crate::models::access_code::{AccessCode, NewAccessCode};

const COLUMNS: &str = "id, code, client_name, client_email, package_name, price, features, \
                       max_uses, used_count, used, redeemed_by_email, last_redeemed_at, \
                       expires_at, created_at, updated_at";

/// Provides creation, lookup and atomic redemption of access codes.
pub struct AccessCodeRepo;

impl AccessCodeRepo {
    /// Insert a new access code, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewAccessCode) -> Result<AccessCode, sqlx::Error> {
        let query = format!(
            "INSERT INTO access_codes
                (code, client_name, client_email, package_name, price, features,
                 max_uses, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AccessCode>(&query)
            .bind(&input.code)
            .bind(&input.client_name)
            .bind(&input.client_email)
            .bind(&input.package_name)
            .bind(input.price)
            .bind(Json(&input.features))
            .bind(input.max_uses)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a code by its normalized (upper-case) value.
    pub async fn find_by_code(
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<AccessCode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM access_codes WHERE code = $1");
        sqlx::query_as::<_, AccessCode>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// List codes, newest first.
    pub async fn list(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AccessCode>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM access_codes
             ORDER BY created_at DESC, id DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, AccessCode>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Consume one use of a code in a single conditional write.
    ///
    /// Returns the updated row when the code existed, was unexpired and had
    /// uses left. Returns `None` otherwise, having changed nothing.
    pub async fn redeem(
        pool: &PgPool,
        code: &str,
        redeemer_email: &str,
        now: Timestamp,
    ) -> Result<Option<AccessCode>, sqlx::Error> {
        let query = format!(
            "UPDATE access_codes SET
                used_count = used_count + 1,
                used = (used_count + 1 >= max_uses),
                redeemed_by_email = $2,
                last_redeemed_at = $3,
                updated_at = NOW()
             WHERE code = $1
               AND NOT used
               AND used_count < max_uses
               AND (expires_at IS NULL OR expires_at > $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AccessCode>(&query)
            .bind(code)
            .bind(redeemer_email)
            .bind(now)
            .fetch_optional(pool)
            .await
    }
}
