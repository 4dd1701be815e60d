//! Fixed-price packages resolved from access codes or the campaign catalog.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Amount, Timestamp};

/// The package a client is paying for, resolved before submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedPackage {
    pub name: String,
    pub price: Amount,
    #[serde(default)]
    pub features: Vec<String>,
}

impl SelectedPackage {
    pub fn new(name: impl Into<String>, price: Amount) -> Self {
        Self {
            name: name.into(),
            price,
            features: Vec::new(),
        }
    }
}

/// Why a code could not be used right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclineReason {
    NotFound,
    Expired,
    Exhausted,
    Inactive,
}

impl DeclineReason {
    /// Message shown next to the code input.
    pub fn message(self) -> &'static str {
        match self {
            Self::NotFound => "This code is not valid",
            Self::Expired => "This code has expired",
            Self::Exhausted => "This code has already been used",
            Self::Inactive => "This code is no longer available",
        }
    }
}

/// Normalize a user-entered code: trimmed and upper-cased.
///
/// Codes are compared case-insensitively everywhere, so this must run before
/// every lookup and every insert.
pub fn normalize_code(raw: &str) -> Result<String, CoreError> {
    let code = raw.trim().to_uppercase();
    if code.is_empty() {
        return Err(CoreError::field("access_code", "Code must not be empty"));
    }
    if code.chars().any(char::is_whitespace) {
        return Err(CoreError::field("access_code", "Code must not contain spaces"));
    }
    Ok(code)
}

/// Check whether a code with the given usage counters can be consumed once more.
///
/// `max_uses = None` means unlimited. Expiry is exclusive: a code expiring at
/// exactly `now` is already expired.
pub fn check_usage(
    used_count: i32,
    max_uses: Option<i32>,
    expires_at: Option<Timestamp>,
    now: Timestamp,
) -> Result<(), DeclineReason> {
    if expires_at.is_some_and(|at| at <= now) {
        return Err(DeclineReason::Expired);
    }
    if max_uses.is_some_and(|max| used_count >= max) {
        return Err(DeclineReason::Exhausted);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn normalize_uppercases_and_trims() {
        assert_eq!(normalize_code("  pedro ").unwrap(), "PEDRO");
        assert_eq!(normalize_code("Spring-24").unwrap(), "SPRING-24");
    }

    #[test]
    fn normalize_rejects_blank_and_inner_spaces() {
        assert!(normalize_code("").is_err());
        assert!(normalize_code("   ").is_err());
        assert!(normalize_code("two words").is_err());
    }

    #[test]
    fn usage_within_limits_is_ok() {
        let now = Utc::now();
        assert!(check_usage(0, Some(1), None, now).is_ok());
        assert!(check_usage(4, None, Some(now + Duration::days(1)), now).is_ok());
    }

    #[test]
    fn usage_at_max_is_exhausted() {
        let now = Utc::now();
        assert_eq!(
            check_usage(1, Some(1), None, now),
            Err(DeclineReason::Exhausted)
        );
    }

    #[test]
    fn expiry_wins_over_exhaustion() {
        let now = Utc::now();
        assert_eq!(
            check_usage(5, Some(1), Some(now - Duration::seconds(1)), now),
            Err(DeclineReason::Expired)
        );
        assert_eq!(
            check_usage(0, Some(1), Some(now), now),
            Err(DeclineReason::Expired)
        );
    }
}
