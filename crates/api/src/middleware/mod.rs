//! Request extractors for operator sessions and role checks.

pub mod auth;
pub mod rbac;
