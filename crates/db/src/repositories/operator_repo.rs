//! Repository for the `operators` table.

use sqlx::PgPool;

use crate::models::operator::{NewOperator, Operator};

const COLUMNS: &str = "id, email, display_name, password_hash, role, is_active, \
                        created_at, updated_at";

/// Provides lookups and creation for operator accounts.
pub struct OperatorRepo;

impl OperatorRepo {
    /// Insert a new operator, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewOperator) -> Result<Operator, sqlx::Error> {
        let query = format!(
            "INSERT INTO operators (email, display_name, password_hash, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Operator>(&query)
            .bind(&input.email)
            .bind(&input.display_name)
            .bind(&input.password_hash)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Find an operator by email (case-insensitive).
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<Operator>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM operators WHERE LOWER(email) = LOWER($1)");
        sqlx::query_as::<_, Operator>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }
}
