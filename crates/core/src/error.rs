use std::collections::BTreeMap;

/// Field name to human-readable message, ordered for stable output.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Validation failed for fields: {}", .0.keys().cloned().collect::<Vec<_>>().join(", "))]
    InvalidFields(FieldErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`] with any displayable id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// A single-field validation failure.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.into(), message.into());
        Self::InvalidFields(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_fields_display_lists_field_names() {
        let mut errors = FieldErrors::new();
        errors.insert("last_name".into(), "Last name is required".into());
        errors.insert("first_name".into(), "First name is required".into());
        let err = CoreError::InvalidFields(errors);
        assert_eq!(
            err.to_string(),
            "Validation failed for fields: first_name, last_name"
        );
    }

    #[test]
    fn not_found_accepts_string_and_numeric_ids() {
        assert_eq!(
            CoreError::not_found("Invoice", 7).to_string(),
            "Entity not found: Invoice with id 7"
        );
        assert_eq!(
            CoreError::not_found("OnboardingSubmission", "abc").to_string(),
            "Entity not found: OnboardingSubmission with id abc"
        );
    }
}
