//! Handlers for the `/auth` resource (operator login and session).

use axum::extract::State;
use axum::Json;
use clientdesk_core::error::CoreError;
use clientdesk_core::types::DbId;
use clientdesk_db::store::OperatorStore;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub operator: OperatorInfo,
}

/// Public operator info embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
pub struct OperatorInfo {
    pub id: DbId,
    pub email: String,
    pub display_name: String,
    pub role: String,
}

/// Response body for `GET /auth/session`.
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub operator_id: DbId,
    pub role: String,
    /// UTC Unix timestamp at which the token stops being accepted.
    pub expires_at: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Unknown email and wrong password
/// produce the same response.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let invalid = || {
        AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        ))
    };

    let operator = state
        .store
        .find_operator_by_email(input.email.trim())
        .await?
        .ok_or_else(invalid)?;

    if !operator.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let password_valid = verify_password(&input.password, &operator.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::warn!(operator_id = operator.id, "Operator login failed");
        return Err(invalid());
    }

    let access_token = generate_access_token(operator.id, &operator.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(operator_id = operator.id, role = %operator.role, "Operator logged in");

    Ok(Json(AuthResponse {
        access_token,
        expires_in: state.config.jwt.expires_in_secs(),
        operator: OperatorInfo {
            id: operator.id,
            email: operator.email,
            display_name: operator.display_name,
            role: operator.role,
        },
    }))
}

/// GET /api/v1/auth/session
pub async fn session(user: AuthUser) -> Json<SessionInfo> {
    Json(SessionInfo {
        operator_id: user.operator_id,
        role: user.role,
        expires_at: user.expires_at,
    })
}
