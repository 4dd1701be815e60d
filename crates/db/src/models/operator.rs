//! Operator accounts.

use serde::Serialize;
use sqlx::FromRow;

use clientdesk_core::types::{DbId, Timestamp};

/// A row from the `operators` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Operator {
    pub id: DbId,
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert DTO. `password_hash` must already be an Argon2 PHC string.
#[derive(Debug, Clone)]
pub struct NewOperator {
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: String,
}
