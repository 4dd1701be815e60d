//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` (or any Postgres executor, when the call must run
//! inside a caller-owned transaction) as the first argument.

pub mod access_code_repo;
pub mod campaign_code_repo;
pub mod dashboard_repo;
pub mod invoice_repo;
pub mod onboarding_draft_repo;
pub mod operator_repo;
pub mod submission_repo;

pub use access_code_repo::AccessCodeRepo;
pub use campaign_code_repo::CampaignCodeRepo;
pub use dashboard_repo::DashboardRepo;
pub use invoice_repo::InvoiceRepo;
pub use onboarding_draft_repo::OnboardingDraftRepo;
pub use operator_repo::OperatorRepo;
pub use submission_repo::SubmissionRepo;
