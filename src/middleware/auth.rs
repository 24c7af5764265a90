use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::AppState;

/// Authenticated caller, extracted from the `x-auth-token` header. Adding
/// this parameter to a handler makes the route protected: a missing token is
/// rejected before the handler runs, an invalid one likewise.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("x-auth-token")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("no token, authorization denied"))?;

        let user_id = state
            .tokens
            .verify(token)
            .map_err(|_| ApiError::unauthorized("invalid token"))?;

        Ok(AuthUser { id: user_id })
    }
}
