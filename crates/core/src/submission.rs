//! Onboarding submission status.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Status values for an onboarding submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    PendingPayment,
    Paid,
}

impl SubmissionStatus {
    /// Parse a status string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending_payment" => Ok(Self::PendingPayment),
            "paid" => Ok(Self::Paid),
            _ => Err(CoreError::Validation(format!(
                "Invalid submission status '{s}'. Must be one of: pending_payment, paid"
            ))),
        }
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingPayment => "pending_payment",
            Self::Paid => "paid",
        }
    }
}
