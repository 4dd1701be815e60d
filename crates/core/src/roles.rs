//! Operator role names carried in session tokens.

/// Full agency operator: manages codes, invoices, and submissions.
pub const ROLE_ADMIN: &str = "admin";

/// Read-only staff member.
pub const ROLE_VIEWER: &str = "viewer";

/// Returns `true` if `role` is one of the known operator roles.
pub fn is_known_role(role: &str) -> bool {
    matches!(role, ROLE_ADMIN | ROLE_VIEWER)
}
