//! GitHub API client for issue comments and user lookup.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::SyncError;

const GITHUB_API_URL: &str = "https://api.github.com";

/// GitHub REST client.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    token: String,
    api_url: String,
}

/// Issue comment, as returned by the comments listing.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueComment {
    /// Comment body.
    #[serde(default)]
    pub body: String,
}

/// GitHub user profile.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    /// User login.
    pub login: String,
    /// Public email address, if the user exposes one.
    #[serde(default)]
    pub email: Option<String>,
}

/// Request body for creating an issue comment.
#[derive(Debug, Serialize)]
struct CreateCommentRequest<'a> {
    body: &'a str,
}

impl GitHubClient {
    /// Create a new GitHub client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(token: &str) -> Result<Self, SyncError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("shortcut-sync/1.0"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|source| SyncError::Transport {
                endpoint: GITHUB_API_URL.to_string(),
                source,
            })?;

        Ok(Self {
            client,
            token: token.to_string(),
            api_url: GITHUB_API_URL.to_string(),
        })
    }

    /// Create a client with custom API URL (for testing).
    #[cfg(test)]
    pub fn with_url(token: &str, api_url: &str) -> Result<Self, SyncError> {
        let mut client = Self::new(token)?;
        client.api_url = api_url.to_string();
        Ok(client)
    }

    /// List the first page of issue comments on a pull request, oldest first.
    #[instrument(skip(self))]
    pub async fn list_comments(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<IssueComment>, SyncError> {
        let endpoint = format!("/repos/{owner}/{repo}/issues/{number}/comments");
        let response = self
            .client
            .get(format!("{}{endpoint}", self.api_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await
            .map_err(|source| transport(&endpoint, source))?;
        read_json(response, &endpoint).await
    }

    /// Post a comment on a pull request.
    ///
    /// Anything but `201 Created` is an error.
    #[instrument(skip(self, body))]
    pub async fn create_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<(), SyncError> {
        let endpoint = format!("/repos/{owner}/{repo}/issues/{number}/comments");
        let response = self
            .client
            .post(format!("{}{endpoint}", self.api_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .json(&CreateCommentRequest { body })
            .send()
            .await
            .map_err(|source| transport(&endpoint, source))?;

        if response.status() != StatusCode::CREATED {
            return Err(SyncError::Api {
                status: response.status().as_u16(),
                endpoint,
            });
        }
        Ok(())
    }

    /// Fetch a user's public profile.
    #[instrument(skip(self))]
    pub async fn get_user(&self, login: &str) -> Result<UserProfile, SyncError> {
        let endpoint = format!("/users/{login}");
        let response = self
            .client
            .get(format!("{}{endpoint}", self.api_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await
            .map_err(|source| transport(&endpoint, source))?;
        read_json(response, &endpoint).await
    }
}

fn transport(endpoint: &str, source: reqwest::Error) -> SyncError {
    SyncError::Transport {
        endpoint: endpoint.to_string(),
        source,
    }
}

async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    endpoint: &str,
) -> Result<T, SyncError> {
    let status = response.status();
    if !status.is_success() {
        return Err(SyncError::Api {
            status: status.as_u16(),
            endpoint: endpoint.to_string(),
        });
    }
    response
        .json()
        .await
        .map_err(|source| transport(endpoint, source))
}
