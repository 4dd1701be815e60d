//! Access-code ledger rules.
//!
//! An access code unlocks a pre-negotiated package for one specific client.
//! Consumption itself must happen as a single conditional write in the store
//! (see `clientdesk_db::store::AccessCodeStore::redeem_access_code`); this
//! module holds the pure parts: code generation, the redemption result shape
//! returned to callers, and the client data handed back on success.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::package::{DeclineReason, SelectedPackage};
use crate::types::Amount;

/// Length of generated access codes.
pub const GENERATED_CODE_LENGTH: usize = 8;

/// Access codes are single-use unless the operator says otherwise.
pub const DEFAULT_MAX_USES: i32 = 1;

/// Client and pricing data released by a successful redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientData {
    pub client_name: String,
    pub client_email: Option<String>,
    pub package_name: String,
    pub price: Amount,
    #[serde(default)]
    pub features: Vec<String>,
}

impl ClientData {
    /// The package this client data resolves to.
    pub fn package(&self) -> SelectedPackage {
        SelectedPackage {
            name: self.package_name.clone(),
            price: self.price,
            features: self.features.clone(),
        }
    }
}

/// Response of the `use_access_code` contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_data: Option<ClientData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DeclineReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RedemptionResult {
    pub fn granted(client_data: ClientData) -> Self {
        Self {
            success: true,
            client_data: Some(client_data),
            reason: None,
            message: None,
        }
    }

    pub fn declined(reason: DeclineReason) -> Self {
        Self {
            success: false,
            client_data: None,
            reason: Some(reason),
            message: Some(reason.message().to_string()),
        }
    }
}

/// Generate a random upper-case alphanumeric access code.
pub fn generate_code() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(GENERATED_CODE_LENGTH)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect()
}

/// Basic shape check for a redeemer email.
pub fn validate_redeemer_email(email: &str) -> Result<(), crate::error::CoreError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(crate::error::CoreError::field(
            "email",
            "A valid email address is required",
        ));
    }
    Ok(())
}
