//! Role gates layered on [`AuthUser`].
//!
//! Reads are open to every operator role; anything that changes client or
//! billing records needs `admin`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use clientdesk_core::error::CoreError;
use clientdesk_core::roles::{is_known_role, ROLE_ADMIN};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

async fn authorize(
    parts: &mut Parts,
    state: &AppState,
    allowed: fn(&str) -> bool,
    denial: &str,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if !allowed(&user.role) {
        tracing::warn!(
            operator_id = user.operator_id,
            role = %user.role,
            path = %parts.uri.path(),
            "Operator lacks the required role",
        );
        return Err(AppError::Core(CoreError::Forbidden(denial.to_string())));
    }
    Ok(user)
}

/// Operator with the `admin` role.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(parts, state, |role| role == ROLE_ADMIN, "Admin role required")
            .await
            .map(RequireAdmin)
    }
}

/// Operator with any recognised role.
pub struct RequireOperator(pub AuthUser);

impl FromRequestParts<AppState> for RequireOperator {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(parts, state, is_known_role, "Operator role required")
            .await
            .map(RequireOperator)
    }
}
