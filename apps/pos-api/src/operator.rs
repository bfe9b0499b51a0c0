//! Operator identity.
//!
//! Token issuance and verification live in the upstream gateway. It
//! forwards the authenticated staff member as two headers:
//!
//! ```text
//! x-operator-id:   1
//! x-operator-role: Admin
//! ```
//!
//! Requests without a usable id are rejected with 401.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use atlas_core::Operator;

use crate::error::ApiError;

pub const OPERATOR_ID_HEADER: &str = "x-operator-id";
pub const OPERATOR_ROLE_HEADER: &str = "x-operator-role";

/// The operator performing the current request.
#[derive(Debug, Clone)]
pub struct CurrentOperator(pub Operator);

impl CurrentOperator {
    pub fn id(&self) -> i64 {
        self.0.id
    }

    /// Admin-only endpoints call this first.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.0.is_admin() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Admin role required"))
        }
    }

    fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        let id = headers
            .get(OPERATOR_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing operator"))?
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| ApiError::unauthorized("Invalid operator id"))?;

        let role = headers
            .get(OPERATOR_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .unwrap_or_default();

        Ok(CurrentOperator(Operator::new(id, role)))
    }
}

impl<S> FromRequestParts<S> for CurrentOperator
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers)
    }
}
