//! Access code entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use clientdesk_core::access_code::ClientData;
use clientdesk_core::types::{Amount, DbId, Timestamp};

/// A row from the `access_codes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AccessCode {
    pub id: DbId,
    pub code: String,
    pub client_name: String,
    pub client_email: Option<String>,
    pub package_name: String,
    pub price: Amount,
    pub features: Json<Vec<String>>,
    pub max_uses: i32,
    pub used_count: i32,
    pub used: bool,
    pub redeemed_by_email: Option<String>,
    pub last_redeemed_at: Option<Timestamp>,
    pub expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AccessCode {
    /// Client data released to the redeemer.
    pub fn client_data(&self) -> ClientData {
        ClientData {
            client_name: self.client_name.clone(),
            client_email: self.client_email.clone(),
            package_name: self.package_name.clone(),
            price: self.price,
            features: self.features.0.clone(),
        }
    }
}

/// DTO for creating an access code. `code` is generated when omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccessCode {
    pub code: Option<String>,
    pub client_name: String,
    pub client_email: Option<String>,
    pub package_name: String,
    pub price: Amount,
    #[serde(default)]
    pub features: Vec<String>,
    pub max_uses: Option<i32>,
    pub expires_at: Option<Timestamp>,
}

/// Validated insert values.
#[derive(Debug, Clone)]
pub struct NewAccessCode {
    pub code: String,
    pub client_name: String,
    pub client_email: Option<String>,
    pub package_name: String,
    pub price: Amount,
    pub features: Vec<String>,
    pub max_uses: i32,
    pub expires_at: Option<Timestamp>,
}
