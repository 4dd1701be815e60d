//! Campaign code catalog model.

use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

use clientdesk_core::campaign::{package_for, CampaignUsage};
use clientdesk_core::package::SelectedPackage;
use clientdesk_core::types::{Amount, DbId, Timestamp};

/// A row from the `campaign_codes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CampaignCode {
    pub id: DbId,
    pub code: String,
    pub display_name: String,
    pub price: Amount,
    pub features: Json<Vec<String>>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub expires_at: Option<Timestamp>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CampaignCode {
    pub fn usage(&self) -> CampaignUsage {
        CampaignUsage {
            is_active: self.is_active,
            used_count: self.used_count,
            max_uses: self.max_uses,
            expires_at: self.expires_at,
        }
    }

    pub fn package(&self) -> SelectedPackage {
        package_for(&self.display_name, self.price, &self.features.0)
    }
}
