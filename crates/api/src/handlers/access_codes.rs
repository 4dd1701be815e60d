//! Handlers for the `/access-codes` resource.
//!
//! Operators issue codes; the public `redeem` endpoint is the standalone
//! `use_access_code` RPC contract: `{access_code, user_email}` in,
//! `{success, client_data?}` out.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use clientdesk_core::access_code::{
    generate_code, validate_redeemer_email, RedemptionResult, DEFAULT_MAX_USES,
};
use clientdesk_core::error::{CoreError, FieldErrors};
use clientdesk_core::package::normalize_code;
use clientdesk_db::models::access_code::{AccessCode, CreateAccessCode, NewAccessCode};
use clientdesk_db::store::{AccessCodeStore, RedeemOutcome};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::rbac::{RequireAdmin, RequireOperator};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /access-codes/redeem`.
#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    pub access_code: String,
    pub user_email: String,
}

/// Validate operator input and fill defaults: a generated code when none is
/// given, and single use unless `max_uses` says otherwise.
pub fn validate_new_access_code(input: CreateAccessCode) -> Result<NewAccessCode, CoreError> {
    let mut errors = FieldErrors::new();

    let code = match input.code.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(raw) => match normalize_code(raw) {
            Ok(code) => code,
            Err(_) => {
                errors.insert("code".into(), "Code must be a single non-empty word".into());
                String::new()
            }
        },
        None => generate_code(),
    };

    let client_name = input.client_name.trim().to_string();
    if client_name.is_empty() {
        errors.insert("client_name".into(), "Client name is required".into());
    }
    let package_name = input.package_name.trim().to_string();
    if package_name.is_empty() {
        errors.insert("package_name".into(), "Package name is required".into());
    }
    if input.price < 0 {
        errors.insert("price".into(), "Price cannot be negative".into());
    }
    let max_uses = input.max_uses.unwrap_or(DEFAULT_MAX_USES);
    if max_uses <= 0 {
        errors.insert("max_uses".into(), "Max uses must be at least 1".into());
    }
    let client_email = input
        .client_email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());
    if client_email.as_deref().is_some_and(|e| !e.contains('@')) {
        errors.insert("client_email".into(), "A valid email address is required".into());
    }

    if !errors.is_empty() {
        return Err(CoreError::InvalidFields(errors));
    }

    Ok(NewAccessCode {
        code,
        client_name,
        client_email,
        package_name,
        price: input.price,
        features: input
            .features
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect(),
        max_uses,
        expires_at: input.expires_at,
    })
}

/// POST /api/v1/access-codes
pub async fn create(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateAccessCode>,
) -> AppResult<impl IntoResponse> {
    let new = validate_new_access_code(input)?;
    let access_code = state.store.create_access_code(new).await?;

    tracing::info!(
        code = %access_code.code,
        max_uses = access_code.max_uses,
        operator_id = user.operator_id,
        "Access code issued",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: access_code })))
}

/// GET /api/v1/access-codes
pub async fn list(
    RequireOperator(_user): RequireOperator,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<AccessCode>>>> {
    let (limit, offset) = params.resolve();
    let codes = state.store.list_access_codes(limit, offset).await?;
    Ok(Json(DataResponse { data: codes }))
}

/// POST /api/v1/access-codes/redeem
///
/// Declines are a normal `200` with `success: false`; only malformed input
/// is a `400`.
pub async fn redeem(
    State(state): State<AppState>,
    Json(input): Json<RedeemRequest>,
) -> AppResult<Json<RedemptionResult>> {
    let code = normalize_code(&input.access_code)?;
    let email = input.user_email.trim();
    validate_redeemer_email(email)?;

    let result = match state.store.redeem_access_code(&code, email, Utc::now()).await? {
        RedeemOutcome::Granted(access_code) => {
            tracing::info!(
                code = %code,
                used_count = access_code.used_count,
                "Access code redeemed",
            );
            RedemptionResult::granted(access_code.client_data())
        }
        RedeemOutcome::Declined(reason) => {
            tracing::warn!(code = %code, ?reason, "Access code declined");
            RedemptionResult::declined(reason)
        }
    };
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn input(code: Option<&str>) -> CreateAccessCode {
        CreateAccessCode {
            code: code.map(Into::into),
            client_name: " Dr. Pedro Alvarez ".into(),
            client_email: Some("pedro@example.com".into()),
            package_name: "Growth".into(),
            price: 9950,
            features: vec!["SEO".into(), " ".into()],
            max_uses: None,
            expires_at: None,
        }
    }

    #[test]
    fn defaults_to_single_use_and_normalizes_code() {
        let new = validate_new_access_code(input(Some(" pedro "))).unwrap();
        assert_eq!(new.code, "PEDRO");
        assert_eq!(new.max_uses, DEFAULT_MAX_USES);
        assert_eq!(new.client_name, "Dr. Pedro Alvarez");
        assert_eq!(new.features, vec!["SEO".to_string()]);
    }

    #[test]
    fn generates_code_when_absent() {
        let new = validate_new_access_code(input(None)).unwrap();
        assert_eq!(new.code.len(), clientdesk_core::access_code::GENERATED_CODE_LENGTH);
        assert_eq!(new.code, new.code.to_uppercase());
    }

    #[test]
    fn reports_every_bad_field() {
        let mut bad = input(Some("two words"));
        bad.client_name = "".into();
        bad.price = -1;
        bad.max_uses = Some(0);
        assert_matches!(
            validate_new_access_code(bad),
            Err(CoreError::InvalidFields(errors))
                if errors.contains_key("code")
                    && errors.contains_key("client_name")
                    && errors.contains_key("price")
                    && errors.contains_key("max_uses")
        );
    }
}
