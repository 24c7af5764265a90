use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::routes::AppState;

use super::{non_blank, TokenResponse};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /api/users - register a new account, returns an auth token.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let mut errors = Vec::new();
    let name = non_blank(req.name);
    if name.is_none() {
        errors.push("name is required");
    }
    let email = non_blank(req.email).filter(|e| e.contains('@'));
    if email.is_none() {
        errors.push("please include a valid email");
    }
    let password = req.password.filter(|p| p.len() >= 6);
    if password.is_none() {
        errors.push("please enter a password with 6 or more characters");
    }
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }
    let (name, email, password) = (name.unwrap(), email.unwrap(), password.unwrap());
    // Stored lowercase so the database uniqueness constraint and the
    // case-insensitive login lookup agree.
    let email = email.trim().to_lowercase();

    let hash = bcrypt::hash(&password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::internal(format!("password hashing failed: {}", e)))?;
    let avatar = Some(gravatar_url(&email));

    let user = state.store.create_user(name, email, hash, avatar).await?;
    let token = state.tokens.issue(user.id)?;
    Ok(Json(TokenResponse { token }))
}

/// Default avatar: Gravatar identicon keyed by the normalized email.
fn gravatar_url(email: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.trim().to_lowercase().as_bytes());
    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    format!("https://www.gravatar.com/avatar/{}?s=200&d=identicon", hex)
}
