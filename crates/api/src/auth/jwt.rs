//! Operator session tokens.
//!
//! HS256 JWTs bound to this service by the `iss` claim. Sessions are short
//! and not refreshable; an operator logs in again when the token lapses.

use chrono::Utc;
use clientdesk_core::types::DbId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Issuer written into and required on every token.
pub const ISSUER: &str = "clientdesk";

const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Operator id.
    pub sub: DbId,
    /// `"admin"` or `"viewer"`.
    pub role: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
}

impl JwtConfig {
    /// | Env Var                  | Required | Default |
    /// |--------------------------|----------|---------|
    /// | `JWT_SECRET`             | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS` | no       | `60`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is missing or blank, or the expiry is not a
    /// positive number of minutes.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
        assert!(!secret.trim().is_empty(), "JWT_SECRET must not be blank");

        let access_token_expiry_mins: i64 = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .map(|v| v.parse().expect("JWT_ACCESS_EXPIRY_MINS must be an integer"))
            .unwrap_or(DEFAULT_ACCESS_EXPIRY_MINS);
        assert!(
            access_token_expiry_mins > 0,
            "JWT_ACCESS_EXPIRY_MINS must be positive"
        );

        Self {
            secret,
            access_token_expiry_mins,
        }
    }

    /// Session lifetime in seconds, as reported to the client at login.
    pub fn expires_in_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }
}

/// Sign a session token for an operator, valid from now.
pub fn generate_access_token(
    operator_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    issue_at(operator_id, role, config, Utc::now().timestamp())
}

fn issue_at(
    operator_id: DbId,
    role: &str,
    config: &JwtConfig,
    issued_at: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: operator_id,
        role: role.to_string(),
        iss: ISSUER.to_string(),
        iat: issued_at,
        exp: issued_at + config.expires_in_secs(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check signature, expiry and issuer, returning the claims.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}
