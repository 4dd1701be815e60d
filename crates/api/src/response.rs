//! Shared response envelope types for API handlers.
//!
//! Operator and onboarding responses use a `{ "data": ... }` envelope. The
//! RPC-style redemption contract and the auth endpoints return bare bodies.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
