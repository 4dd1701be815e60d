//! Payment redirect gate.
//!
//! Builds the hand-off URL for the external payment collector. The link is a
//! pure function of the stored submission, so operators can regenerate and
//! resend it at any time without replaying the onboarding form.

use serde::Serialize;
use url::Url;

use crate::error::CoreError;
use crate::types::Amount;

/// Query parameters carried to the payment collector. `None` values are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaymentLinkParams {
    pub amount: Option<Amount>,
    pub package: Option<String>,
    pub email: Option<String>,
    pub submission_id: Option<String>,
}

/// Build `<base>?amount=..&package=..&email=..&submissionId=..`.
///
/// Any query already present on `base_url` is preserved. Blank strings are
/// treated as absent.
pub fn build_payment_url(base_url: &str, params: &PaymentLinkParams) -> Result<String, CoreError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| CoreError::Internal(format!("Invalid payment base URL '{base_url}': {e}")))?;

    {
        let mut query = url.query_pairs_mut();
        if let Some(amount) = params.amount {
            query.append_pair("amount", &amount.to_string());
        }
        for (key, value) in [
            ("package", &params.package),
            ("email", &params.email),
            ("submissionId", &params.submission_id),
        ] {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                query.append_pair(key, v);
            }
        }
    }

    // `query_pairs_mut` leaves a dangling `?` when nothing was appended.
    if url.query() == Some("") {
        url.set_query(None);
    }
    Ok(url.into())
}
