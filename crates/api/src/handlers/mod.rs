pub mod access_codes;
pub mod auth;
pub mod campaign_codes;
pub mod dashboard;
pub mod invoices;
pub mod onboarding;
pub mod payments;
pub mod submissions;
