pub mod auth;
pub mod posts;
pub mod profile;
pub mod users;

use serde::Serialize;

/// Body returned by registration and login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Treat blank and missing strings the same way the validators do.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
