use reqwest::header::USER_AGENT;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GithubConfig;

#[derive(Debug, Error)]
pub enum GithubError {
    #[error("no github profile found")]
    NotFound,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Subset of the GitHub repository payload shown on profile pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoSummary {
    pub name: String,
    pub html_url: String,
    pub description: Option<String>,
    pub stargazers_count: i64,
    pub forks_count: i64,
}

#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
}

impl GithubClient {
    pub fn new(config: &GithubConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch a user's five most recently created public repositories.
    pub async fn recent_repos(&self, username: &str) -> Result<Vec<RepoSummary>, GithubError> {
        let url = format!("{}/users/{}/repos", self.api_base, username);
        let response = self
            .http
            .get(&url)
            .query(&[("per_page", "5"), ("sort", "created"), ("direction", "desc")])
            // GitHub rejects requests without a user agent
            .header(USER_AGENT, "devconnect-api")
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(GithubError::NotFound);
        }
        let response = response.error_for_status()?;
        Ok(response.json().await?)
    }
}
