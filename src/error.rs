// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// HTTP boundary error with the wire formats the client expects:
/// validation failures as `{"errors": [{"msg": ...}]}`, everything else
/// as `{"msg": ...}`. Internal details are logged, never sent.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request, one message per missing/invalid field
    Validation(Vec<String>),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error, detail is server-side only
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ApiError::Validation(msgs) => {
                let errors: Vec<Value> = msgs.iter().map(|m| json!({ "msg": m })).collect();
                json!({ "errors": errors })
            }
            ApiError::Internal(_) => json!({ "msg": "server error" }),
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => json!({ "msg": msg }),
        }
    }
}

// Static constructors
impl ApiError {
    pub fn validation<I, S>(msgs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ApiError::Validation(msgs.into_iter().map(Into::into).collect())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        ApiError::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ApiError::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::Internal(msg.into())
    }
}

// Convert component errors to ApiError
impl From<crate::store::StoreError> for ApiError {
    fn from(err: crate::store::StoreError) -> Self {
        use crate::store::StoreError;
        match err {
            StoreError::NotFound(what) => ApiError::not_found(format!("{} not found", what)),
            StoreError::Conflict(msg) => ApiError::conflict(msg),
            StoreError::Forbidden(msg) => ApiError::forbidden(msg),
            StoreError::Sqlx(e) => ApiError::internal(format!("database error: {}", e)),
            StoreError::Serde(e) => ApiError::internal(format!("serialization error: {}", e)),
        }
    }
}

impl From<crate::auth::TokenError> for ApiError {
    fn from(err: crate::auth::TokenError) -> Self {
        ApiError::internal(format!("token error: {}", err))
    }
}

impl From<crate::github::GithubError> for ApiError {
    fn from(err: crate::github::GithubError) -> Self {
        match err {
            crate::github::GithubError::NotFound => ApiError::not_found("no github profile found"),
            crate::github::GithubError::Http(e) => {
                ApiError::internal(format!("github request failed: {}", e))
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Validation(msgs) => write!(f, "{}", msgs.join(", ")),
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!("internal error: {}", detail);
        }
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
