//! Campaign code catalog rules.
//!
//! Campaign codes are reusable marketing links tied to a fixed-price package.
//! Unlike access codes they are not bound to a client and may be unlimited.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, FieldErrors};
use crate::package::{check_usage, normalize_code, DeclineReason, SelectedPackage};
use crate::types::{Amount, Timestamp};

/// Operator input for a new catalog entry, before persistence.
#[derive(Debug, Clone, Deserialize)]
pub struct CampaignCodeDraft {
    pub code: String,
    pub display_name: String,
    pub price: Amount,
    #[serde(default)]
    pub features: Vec<String>,
    pub max_uses: Option<i32>,
    pub expires_at: Option<Timestamp>,
}

impl CampaignCodeDraft {
    /// Validate and normalize, returning field-level errors for the operator form.
    pub fn validated(mut self) -> Result<Self, CoreError> {
        let mut errors = FieldErrors::new();

        match normalize_code(&self.code) {
            Ok(code) => self.code = code,
            Err(_) => {
                errors.insert("code".into(), "Code must be a single non-empty word".into());
            }
        }
        self.display_name = self.display_name.trim().to_string();
        if self.display_name.is_empty() {
            errors.insert("display_name".into(), "Display name is required".into());
        }
        if self.price <= 0 {
            errors.insert("price".into(), "Price must be greater than zero".into());
        }
        if self.max_uses.is_some_and(|m| m <= 0) {
            errors.insert("max_uses".into(), "Max uses must be positive when set".into());
        }
        self.features.retain(|f| !f.trim().is_empty());

        if errors.is_empty() {
            Ok(self)
        } else {
            Err(CoreError::InvalidFields(errors))
        }
    }
}

/// Snapshot of a catalog entry's usage state.
#[derive(Debug, Clone, Copy)]
pub struct CampaignUsage {
    pub is_active: bool,
    pub used_count: i32,
    pub max_uses: Option<i32>,
    pub expires_at: Option<Timestamp>,
}

impl CampaignUsage {
    /// Whether one more client may claim this code at `now`.
    pub fn check(&self, now: Timestamp) -> Result<(), DeclineReason> {
        if !self.is_active {
            return Err(DeclineReason::Inactive);
        }
        check_usage(self.used_count, self.max_uses, self.expires_at, now)
    }
}

/// Package offered by a catalog entry.
pub fn package_for(display_name: &str, price: Amount, features: &[String]) -> SelectedPackage {
    SelectedPackage {
        name: display_name.to_string(),
        price,
        features: features.to_vec(),
    }
}
