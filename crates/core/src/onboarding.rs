//! Onboarding form state machine.
//!
//! A draft walks a strictly ordered list of steps. Each step owns a disjoint
//! set of fields; advancing runs that step's required-field checks, going
//! back never validates and never touches entered data. Submission
//! re-validates every step so a draft that was manipulated directly (for
//! example by saving form data with a forged `current_step`) cannot skip
//! required fields.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, FieldErrors};
use crate::package::SelectedPackage;

// ---------------------------------------------------------------------------
// Variant
// ---------------------------------------------------------------------------

/// Which onboarding flow a draft belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingVariant {
    /// Client arrived with an access code for a pre-negotiated package.
    AccessCode,
    /// Client picks a fixed-price package from the campaign catalog.
    BrowsePackages,
}

const ACCESS_CODE_STEPS: &[OnboardingStep] = &[
    OnboardingStep::Identity,
    OnboardingStep::Contact,
    OnboardingStep::DigitalPresence,
    OnboardingStep::Goals,
    OnboardingStep::Review,
];

const BROWSE_PACKAGES_STEPS: &[OnboardingStep] = &[
    OnboardingStep::Identity,
    OnboardingStep::Contact,
    OnboardingStep::DigitalPresence,
    OnboardingStep::CampaignSelection,
    OnboardingStep::Goals,
    OnboardingStep::Review,
];

/// Minimum step number (1-based).
pub const MIN_STEP: u8 = 1;

impl OnboardingVariant {
    /// Parse a variant string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "access_code" => Ok(Self::AccessCode),
            "browse_packages" => Ok(Self::BrowsePackages),
            _ => Err(CoreError::Validation(format!(
                "Invalid onboarding variant '{s}'. Must be one of: access_code, browse_packages"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessCode => "access_code",
            Self::BrowsePackages => "browse_packages",
        }
    }

    /// Ordered steps for this variant.
    pub fn steps(self) -> &'static [OnboardingStep] {
        match self {
            Self::AccessCode => ACCESS_CODE_STEPS,
            Self::BrowsePackages => BROWSE_PACKAGES_STEPS,
        }
    }

    /// Number of steps (N).
    pub fn total_steps(self) -> u8 {
        self.steps().len() as u8
    }

    /// The step at a 1-based position.
    pub fn step_at(self, n: u8) -> Result<OnboardingStep, CoreError> {
        let total = self.total_steps();
        if n < MIN_STEP || n > total {
            return Err(CoreError::Validation(format!(
                "Step {n} is out of range ({MIN_STEP}..={total})"
            )));
        }
        Ok(self.steps()[(n - 1) as usize])
    }
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    Identity,
    Contact,
    DigitalPresence,
    CampaignSelection,
    Goals,
    Review,
}

impl OnboardingStep {
    /// Human-readable label for the step.
    pub fn label(self) -> &'static str {
        match self {
            Self::Identity => "About You",
            Self::Contact => "Contact Details",
            Self::DigitalPresence => "Digital Presence",
            Self::CampaignSelection => "Choose a Package",
            Self::Goals => "Goals",
            Self::Review => "Review",
        }
    }

    /// Fields owned by this step. Used to clear stale errors on advance.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Self::Identity => &["first_name", "last_name", "practice_name", "specialty"],
            Self::Contact => &["email", "phone", "preferred_contact"],
            Self::DigitalPresence => &["website", "google_business_profile", "social_handles"],
            Self::CampaignSelection => &["campaign_code"],
            Self::Goals => &["primary_goal", "monthly_budget", "notes"],
            Self::Review => &[],
        }
    }

    /// Run this step's required-field checks against the form.
    ///
    /// Steps without required fields always pass.
    pub fn validate(self, form: &FormData) -> FieldErrors {
        let mut errors = FieldErrors::new();
        match self {
            Self::Identity => {
                require(&mut errors, "first_name", &form.identity.first_name, "First name");
                require(&mut errors, "last_name", &form.identity.last_name, "Last name");
                require(
                    &mut errors,
                    "practice_name",
                    &form.identity.practice_name,
                    "Practice name",
                );
            }
            Self::Contact => {
                require(&mut errors, "email", &form.contact.email, "Email");
                if !is_blank(&form.contact.email) && !form.contact.email.contains('@') {
                    errors.insert("email".into(), "Enter a valid email address".into());
                }
                require(&mut errors, "phone", &form.contact.phone, "Phone number");
            }
            Self::CampaignSelection => {
                let selected = form
                    .campaign
                    .campaign_code
                    .as_deref()
                    .is_some_and(|c| !is_blank(c));
                if !selected {
                    errors.insert("campaign_code".into(), "Choose a package to continue".into());
                }
            }
            Self::DigitalPresence | Self::Goals | Self::Review => {}
        }
        errors
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn require(errors: &mut FieldErrors, field: &str, value: &str, label: &str) {
    if is_blank(value) {
        errors.insert(field.to_string(), format!("{label} is required"));
    }
}

// ---------------------------------------------------------------------------
// Form data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    pub first_name: String,
    pub last_name: String,
    pub practice_name: String,
    pub specialty: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub email: String,
    pub phone: String,
    pub preferred_contact: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigitalPresence {
    pub website: Option<String>,
    pub google_business_profile: Option<String>,
    pub social_handles: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignSelection {
    pub campaign_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Goals {
    pub primary_goal: Option<String>,
    pub monthly_budget: Option<String>,
    pub notes: Option<String>,
}

/// Every field across every step. Missing sections deserialize to defaults
/// so partially filled drafts round-trip unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormData {
    pub identity: Identity,
    pub contact: Contact,
    pub digital_presence: DigitalPresence,
    pub campaign: CampaignSelection,
    pub goals: Goals,
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// Result of a `next()` attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved forward to the contained step number.
    Moved(u8),
    /// Already on the last step; nothing changed.
    AtLastStep,
    /// Required fields are missing; see `errors`.
    Blocked,
}

/// In-progress onboarding state, persisted between steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingDraft {
    pub variant: OnboardingVariant,
    pub current_step: u8,
    pub form_data: FormData,
    #[serde(default)]
    pub errors: FieldErrors,
    /// Normalized access code that was redeemed for this draft, if any.
    #[serde(default)]
    pub access_code: Option<String>,
    /// Package unlocked by the redeemed access code.
    #[serde(default)]
    pub selected_package: Option<SelectedPackage>,
}

impl OnboardingDraft {
    pub fn new(variant: OnboardingVariant) -> Self {
        Self {
            variant,
            current_step: MIN_STEP,
            form_data: FormData::default(),
            errors: FieldErrors::new(),
            access_code: None,
            selected_package: None,
        }
    }

    pub fn total_steps(&self) -> u8 {
        self.variant.total_steps()
    }

    pub fn step(&self) -> Result<OnboardingStep, CoreError> {
        self.variant.step_at(self.current_step)
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step >= self.total_steps()
    }

    /// Validate the current step and move forward one step if it passes.
    pub fn next(&mut self) -> Result<Advance, CoreError> {
        let step = self.step()?;
        for field in step.fields() {
            self.errors.remove(*field);
        }

        let errors = step.validate(&self.form_data);
        if !errors.is_empty() {
            self.errors.extend(errors);
            return Ok(Advance::Blocked);
        }

        if self.is_last_step() {
            return Ok(Advance::AtLastStep);
        }
        self.current_step += 1;
        Ok(Advance::Moved(self.current_step))
    }

    /// Move back one step. Never validates and never clears data.
    pub fn previous(&mut self) -> u8 {
        if self.current_step > MIN_STEP {
            self.current_step -= 1;
        }
        self.current_step
    }

    /// Replace the stored form data without moving.
    pub fn save_form_data(&mut self, form_data: FormData) {
        self.form_data = form_data;
    }

    /// Attach a redeemed access code and the package it unlocked.
    pub fn apply_redemption(&mut self, code: String, package: SelectedPackage) {
        self.errors.remove("access_code");
        self.access_code = Some(code);
        self.selected_package = Some(package);
    }

    /// Record a redemption failure against the code field.
    pub fn reject_redemption(&mut self, message: &str) {
        self.errors
            .insert("access_code".to_string(), message.to_string());
    }

    /// Validate every step of the variant, not just the current one.
    pub fn validate_all(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for step in self.variant.steps() {
            errors.extend(step.validate(&self.form_data));
        }
        if self.variant == OnboardingVariant::AccessCode && self.selected_package.is_none() {
            errors.insert(
                "access_code".into(),
                "Redeem your access code before submitting".into(),
            );
        }
        errors
    }

    /// Replace the errors of every step with the result of a full
    /// re-validation. Redemption errors are left alone unless reported again.
    pub fn record_validation_errors(&mut self, errors: FieldErrors) {
        for step in self.variant.steps() {
            for field in step.fields() {
                self.errors.remove(*field);
            }
        }
        self.errors.extend(errors);
    }

    /// Package the draft into a typed submission payload.
    ///
    /// Only allowed from the final step and only when every step validates.
    pub fn prepare_submission(&self) -> Result<PreparedSubmission, CoreError> {
        if !self.is_last_step() {
            return Err(CoreError::Validation(format!(
                "Cannot submit from step {}; finish all {} steps first",
                self.current_step,
                self.total_steps()
            )));
        }

        let errors = self.validate_all();
        if !errors.is_empty() {
            return Err(CoreError::InvalidFields(errors));
        }

        let form = self.form_data.clone();
        match self.variant {
            OnboardingVariant::AccessCode => {
                let (Some(code), Some(package)) = (&self.access_code, &self.selected_package)
                else {
                    return Err(CoreError::field(
                        "access_code",
                        "Redeem your access code before submitting",
                    ));
                };
                Ok(PreparedSubmission {
                    payload: SubmissionPayload::AccessCode {
                        form,
                        access_code: code.clone(),
                    },
                    package: PackageSource::Resolved(package.clone()),
                })
            }
            OnboardingVariant::BrowsePackages => {
                let code = form
                    .campaign
                    .campaign_code
                    .as_deref()
                    .map(crate::package::normalize_code)
                    .transpose()
                    .map_err(|_| CoreError::field("campaign_code", "Choose a package to continue"))?
                    .ok_or_else(|| {
                        CoreError::field("campaign_code", "Choose a package to continue")
                    })?;
                Ok(PreparedSubmission {
                    payload: SubmissionPayload::BrowsePackages {
                        form,
                        campaign_code: code.clone(),
                    },
                    package: PackageSource::Campaign(code),
                })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Submission payload
// ---------------------------------------------------------------------------

/// Typed `form_data` stored on a submission, one shape per flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum SubmissionPayload {
    AccessCode { form: FormData, access_code: String },
    BrowsePackages { form: FormData, campaign_code: String },
}

impl SubmissionPayload {
    pub fn form(&self) -> &FormData {
        match self {
            Self::AccessCode { form, .. } | Self::BrowsePackages { form, .. } => form,
        }
    }

    pub fn variant(&self) -> OnboardingVariant {
        match self {
            Self::AccessCode { .. } => OnboardingVariant::AccessCode,
            Self::BrowsePackages { .. } => OnboardingVariant::BrowsePackages,
        }
    }

    pub fn email(&self) -> &str {
        self.form().contact.email.trim()
    }

    pub fn practice_name(&self) -> &str {
        self.form().identity.practice_name.trim()
    }

    pub fn client_name(&self) -> String {
        let identity = &self.form().identity;
        format!(
            "{} {}",
            identity.first_name.trim(),
            identity.last_name.trim()
        )
    }
}

/// Where the package price for a submission comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageSource {
    /// Already resolved by an access-code redemption.
    Resolved(SelectedPackage),
    /// Must be claimed from the campaign catalog at submit time.
    Campaign(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedSubmission {
    pub payload: SubmissionPayload,
    pub package: PackageSource,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn filled_form() -> FormData {
        FormData {
            identity: Identity {
                first_name: "Ana".into(),
                last_name: "Silva".into(),
                practice_name: "Silva Dental".into(),
                specialty: Some("Orthodontics".into()),
            },
            contact: Contact {
                email: "ana@silva.example".into(),
                phone: "+1 555 0100".into(),
                preferred_contact: None,
            },
            digital_presence: DigitalPresence {
                website: Some("https://silva.example".into()),
                google_business_profile: None,
                social_handles: vec!["@silvadental".into()],
            },
            campaign: CampaignSelection {
                campaign_code: Some("spring".into()),
            },
            goals: Goals {
                primary_goal: Some("More new patients".into()),
                monthly_budget: None,
                notes: None,
            },
        }
    }

    fn walk_to_end(draft: &mut OnboardingDraft) {
        while !draft.is_last_step() {
            assert_matches!(draft.next().unwrap(), Advance::Moved(_));
        }
    }

    // -- Variant --

    #[test]
    fn variant_step_counts() {
        assert_eq!(OnboardingVariant::AccessCode.total_steps(), 5);
        assert_eq!(OnboardingVariant::BrowsePackages.total_steps(), 6);
    }

    #[test]
    fn variant_from_str_roundtrip() {
        for v in [OnboardingVariant::AccessCode, OnboardingVariant::BrowsePackages] {
            assert_eq!(OnboardingVariant::from_str_db(v.as_str()).unwrap(), v);
        }
        assert!(OnboardingVariant::from_str_db("wizard").is_err());
    }

    #[test]
    fn step_at_rejects_out_of_range() {
        assert!(OnboardingVariant::AccessCode.step_at(0).is_err());
        assert!(OnboardingVariant::AccessCode.step_at(6).is_err());
        assert_eq!(
            OnboardingVariant::BrowsePackages.step_at(4).unwrap(),
            OnboardingStep::CampaignSelection
        );
    }

    #[test]
    fn step_fields_are_disjoint() {
        let steps = OnboardingVariant::BrowsePackages.steps();
        let mut seen = std::collections::HashSet::new();
        for step in steps {
            for field in step.fields() {
                assert!(seen.insert(*field), "field {field} owned by two steps");
            }
        }
    }

    // -- next / previous --

    #[test]
    fn next_blocks_on_empty_first_name() {
        let mut draft = OnboardingDraft::new(OnboardingVariant::BrowsePackages);
        draft.form_data.identity.last_name = "Silva".into();
        draft.form_data.identity.practice_name = "Silva Dental".into();

        assert_eq!(draft.next().unwrap(), Advance::Blocked);
        assert_eq!(draft.current_step, 1);
        assert_eq!(
            draft.errors.get("first_name").map(String::as_str),
            Some("First name is required")
        );
    }

    #[test]
    fn whitespace_only_counts_as_blank() {
        let mut draft = OnboardingDraft::new(OnboardingVariant::AccessCode);
        draft.form_data = filled_form();
        draft.form_data.identity.first_name = "   ".into();
        assert_eq!(draft.next().unwrap(), Advance::Blocked);
        assert!(draft.errors.contains_key("first_name"));
    }

    #[test]
    fn next_clears_errors_for_step_once_fixed() {
        let mut draft = OnboardingDraft::new(OnboardingVariant::AccessCode);
        assert_eq!(draft.next().unwrap(), Advance::Blocked);
        assert_eq!(draft.errors.len(), 3);

        draft.form_data = filled_form();
        assert_eq!(draft.next().unwrap(), Advance::Moved(2));
        assert!(draft.errors.is_empty());
    }

    #[test]
    fn blocked_step_drops_errors_for_fields_since_filled() {
        let mut draft = OnboardingDraft::new(OnboardingVariant::AccessCode);
        draft.form_data.identity.practice_name = "Silva Dental".into();
        assert_eq!(draft.next().unwrap(), Advance::Blocked);
        assert!(draft.errors.contains_key("first_name"));
        assert!(draft.errors.contains_key("last_name"));

        draft.form_data.identity.first_name = "Ana".into();
        assert_eq!(draft.next().unwrap(), Advance::Blocked);
        assert!(!draft.errors.contains_key("first_name"));
        assert_eq!(
            draft.errors.get("last_name").map(String::as_str),
            Some("Last name is required")
        );
    }

    #[test]
    fn full_revalidation_replaces_step_errors() {
        let mut draft = OnboardingDraft::new(OnboardingVariant::AccessCode);
        draft.errors.insert("first_name".into(), "First name is required".into());
        draft.reject_redemption("This code is not valid");

        let mut errors = FieldErrors::new();
        errors.insert("phone".into(), "Phone number is required".into());
        draft.record_validation_errors(errors);

        assert!(!draft.errors.contains_key("first_name"));
        assert!(draft.errors.contains_key("phone"));
        assert!(draft.errors.contains_key("access_code"));
    }

    #[test]
    fn contact_step_rejects_malformed_email() {
        let mut draft = OnboardingDraft::new(OnboardingVariant::AccessCode);
        draft.form_data = filled_form();
        draft.form_data.contact.email = "not-an-email".into();
        draft.next().unwrap();
        assert_eq!(draft.next().unwrap(), Advance::Blocked);
        assert_eq!(draft.current_step, 2);
        assert!(draft.errors.contains_key("email"));
    }

    #[test]
    fn optional_steps_pass_with_no_data() {
        let mut draft = OnboardingDraft::new(OnboardingVariant::AccessCode);
        draft.form_data.identity = filled_form().identity;
        draft.form_data.contact = filled_form().contact;
        assert_eq!(draft.next().unwrap(), Advance::Moved(2));
        assert_eq!(draft.next().unwrap(), Advance::Moved(3));
        // Digital presence and goals are optional.
        assert_eq!(draft.next().unwrap(), Advance::Moved(4));
        assert_eq!(draft.next().unwrap(), Advance::Moved(5));
    }

    #[test]
    fn next_is_capped_at_last_step() {
        let mut draft = OnboardingDraft::new(OnboardingVariant::AccessCode);
        draft.form_data = filled_form();
        walk_to_end(&mut draft);
        assert_eq!(draft.next().unwrap(), Advance::AtLastStep);
        assert_eq!(draft.current_step, 5);
    }

    #[test]
    fn browse_flow_requires_a_package_choice() {
        let mut draft = OnboardingDraft::new(OnboardingVariant::BrowsePackages);
        draft.form_data = filled_form();
        draft.form_data.campaign.campaign_code = None;
        for _ in 0..3 {
            draft.next().unwrap();
        }
        assert_eq!(draft.current_step, 4);
        assert_eq!(draft.next().unwrap(), Advance::Blocked);
        assert!(draft.errors.contains_key("campaign_code"));
    }

    #[test]
    fn previous_never_discards_data() {
        let mut draft = OnboardingDraft::new(OnboardingVariant::BrowsePackages);
        draft.form_data = filled_form();
        walk_to_end(&mut draft);
        let before = draft.form_data.clone();

        for _ in 0..20 {
            draft.previous();
        }
        assert_eq!(draft.current_step, MIN_STEP);
        assert_eq!(draft.form_data, before);
    }

    #[test]
    fn previous_skips_validation() {
        let mut draft = OnboardingDraft::new(OnboardingVariant::AccessCode);
        draft.form_data = filled_form();
        draft.next().unwrap();
        draft.form_data.contact.email.clear();
        assert_eq!(draft.previous(), 1);
        assert!(draft.errors.is_empty());
    }

    // -- Submission --

    #[test]
    fn submit_rejected_before_last_step() {
        let mut draft = OnboardingDraft::new(OnboardingVariant::BrowsePackages);
        draft.form_data = filled_form();
        draft.next().unwrap();
        assert_matches!(draft.prepare_submission(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn submit_revalidates_every_step() {
        let mut draft = OnboardingDraft::new(OnboardingVariant::BrowsePackages);
        // Forged position: jumped to the end without filling anything.
        draft.current_step = draft.total_steps();
        match draft.prepare_submission() {
            Err(CoreError::InvalidFields(errors)) => {
                assert!(errors.contains_key("first_name"));
                assert!(errors.contains_key("email"));
                assert!(errors.contains_key("campaign_code"));
            }
            other => panic!("expected field errors, got {other:?}"),
        }
    }

    #[test]
    fn access_code_flow_needs_redemption() {
        let mut draft = OnboardingDraft::new(OnboardingVariant::AccessCode);
        draft.form_data = filled_form();
        walk_to_end(&mut draft);
        assert_matches!(
            draft.prepare_submission(),
            Err(CoreError::InvalidFields(errors)) if errors.contains_key("access_code")
        );

        draft.apply_redemption("PEDRO".into(), SelectedPackage::new("Growth", 9950));
        let prepared = draft.prepare_submission().unwrap();
        assert_eq!(
            prepared.package,
            PackageSource::Resolved(SelectedPackage::new("Growth", 9950))
        );
        assert_matches!(
            prepared.payload,
            SubmissionPayload::AccessCode { ref access_code, .. } if access_code == "PEDRO"
        );
    }

    #[test]
    fn browse_flow_submission_uses_normalized_campaign_code() {
        let mut draft = OnboardingDraft::new(OnboardingVariant::BrowsePackages);
        draft.form_data = filled_form();
        walk_to_end(&mut draft);
        let prepared = draft.prepare_submission().unwrap();
        assert_eq!(prepared.package, PackageSource::Campaign("SPRING".into()));
        assert_eq!(prepared.payload.email(), "ana@silva.example");
        assert_eq!(prepared.payload.practice_name(), "Silva Dental");
        assert_eq!(prepared.payload.client_name(), "Ana Silva");
    }

    // -- Persistence --

    #[test]
    fn draft_survives_json_reload() {
        let mut draft = OnboardingDraft::new(OnboardingVariant::BrowsePackages);
        draft.form_data = filled_form();
        draft.next().unwrap();
        draft.next().unwrap();

        let stored = serde_json::to_string(&draft).unwrap();
        let reloaded: OnboardingDraft = serde_json::from_str(&stored).unwrap();
        assert_eq!(reloaded, draft);
    }

    #[test]
    fn partial_form_json_fills_defaults() {
        let form: FormData =
            serde_json::from_value(serde_json::json!({ "identity": { "first_name": "Ana" } }))
                .unwrap();
        assert_eq!(form.identity.first_name, "Ana");
        assert!(form.contact.email.is_empty());
        assert!(form.digital_presence.social_handles.is_empty());
    }

    #[test]
    fn payload_is_tagged_by_variant() {
        let payload = SubmissionPayload::BrowsePackages {
            form: filled_form(),
            campaign_code: "SPRING".into(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["variant"], "browse_packages");
        assert_eq!(json["campaign_code"], "SPRING");
        let back: SubmissionPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back.variant(), OnboardingVariant::BrowsePackages);
    }
}
