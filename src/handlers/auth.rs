use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::middleware::AuthUser;
use crate::routes::AppState;
use crate::store::User;

use super::{non_blank, TokenResponse};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /api/auth - exchange email/password for an auth token.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let mut errors = Vec::new();
    let email = non_blank(req.email);
    if email.is_none() {
        errors.push("please include a valid email");
    }
    let password = non_blank(req.password);
    if password.is_none() {
        errors.push("password is required");
    }
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }
    let (email, password) = (email.unwrap(), password.unwrap());

    // Same response whether the email is unknown or the password is wrong.
    let user = state
        .store
        .user_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("invalid credentials"))?;

    let matches = bcrypt::verify(&password, &user.password)
        .map_err(|e| ApiError::internal(format!("password verification failed: {}", e)))?;
    if !matches {
        return Err(ApiError::unauthorized("invalid credentials"));
    }

    let token = state.tokens.issue(user.id)?;
    Ok(Json(TokenResponse { token }))
}

/// GET /api/auth - the caller's own user record (password hash is skipped
/// during serialization).
pub async fn current_user(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<User>, ApiError> {
    let user = state.store.user_by_id(user.id).await?;
    Ok(Json(user))
}
