//! Onboarding draft entity model.

use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use clientdesk_core::error::{CoreError, FieldErrors};
use clientdesk_core::onboarding::{FormData, OnboardingDraft, OnboardingVariant};
use clientdesk_core::package::SelectedPackage;
use clientdesk_core::types::Timestamp;

/// A row from the `onboarding_drafts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OnboardingDraftRow {
    pub id: Uuid,
    pub variant: String,
    pub current_step: i32,
    pub form_data: Json<FormData>,
    pub errors: Json<FieldErrors>,
    pub access_code: Option<String>,
    pub selected_package: Option<Json<SelectedPackage>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl OnboardingDraftRow {
    /// Rebuild the domain state machine from the stored row.
    pub fn to_draft(&self) -> Result<OnboardingDraft, CoreError> {
        let variant = OnboardingVariant::from_str_db(&self.variant)?;
        let current_step = u8::try_from(self.current_step).map_err(|_| {
            CoreError::Internal(format!("Stored step {} out of range", self.current_step))
        })?;
        variant.step_at(current_step)?;
        Ok(OnboardingDraft {
            variant,
            current_step,
            form_data: self.form_data.0.clone(),
            errors: self.errors.0.clone(),
            access_code: self.access_code.clone(),
            selected_package: self.selected_package.as_ref().map(|p| p.0.clone()),
        })
    }
}
