//! Domain rules for client onboarding, access codes, payment hand-off, and
//! invoicing. Everything here is synchronous and free of I/O.

pub mod access_code;
pub mod campaign;
pub mod error;
pub mod invoice;
pub mod onboarding;
pub mod package;
pub mod pagination;
pub mod payment_link;
pub mod roles;
pub mod signing;
pub mod submission;
pub mod summary;
pub mod types;
