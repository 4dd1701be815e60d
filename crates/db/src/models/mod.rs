//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - The insert DTO the repository accepts
//! - Conversions to and from the `clientdesk_core` domain types

pub mod access_code;
pub mod campaign_code;
pub mod invoice;
pub mod onboarding_draft;
pub mod operator;
pub mod submission;
