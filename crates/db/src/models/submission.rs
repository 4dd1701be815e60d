//! Onboarding submission entity model and DTOs.

use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use clientdesk_core::onboarding::SubmissionPayload;
use clientdesk_core::package::SelectedPackage;
use clientdesk_core::payment_link::PaymentLinkParams;
use clientdesk_core::types::{Amount, Timestamp};

/// A row from the `onboarding_submissions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OnboardingSubmission {
    pub id: Uuid,
    pub variant: String,
    pub form_data: Json<SubmissionPayload>,
    pub email: String,
    pub practice_name: String,
    pub package_name: String,
    pub package_price: Amount,
    pub status: String,
    pub created_at: Timestamp,
    pub paid_at: Option<Timestamp>,
}

impl OnboardingSubmission {
    pub fn selected_package(&self) -> SelectedPackage {
        SelectedPackage::new(self.package_name.clone(), self.package_price)
    }

    /// Parameters for the payment hand-off, derived only from stored fields.
    pub fn payment_link_params(&self) -> PaymentLinkParams {
        PaymentLinkParams {
            amount: Some(self.package_price),
            package: Some(self.package_name.clone()),
            email: Some(self.email.clone()),
            submission_id: Some(self.id.to_string()),
        }
    }
}
