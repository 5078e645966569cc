//! REST client for the Shortcut API.

use std::collections::HashMap;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::error::SyncError;
use crate::github_client::GitHubClient;
use crate::models::{
    CreateStoryBody, Iteration, IterationStatus, Member, Project, Story, Team, UpdateStoryBody,
    WorkflowState,
};

/// Shortcut API endpoint.
const SHORTCUT_API_URL: &str = "https://api.app.shortcut.com/api/v3";

/// Shortcut REST client.
///
/// The API token travels as a `token` query parameter on every request; it
/// is appended at send time so endpoint strings in errors never contain it.
#[derive(Debug, Clone)]
pub struct ShortcutClient {
    client: reqwest::Client,
    token: String,
    api_url: String,
}

impl ShortcutClient {
    /// Create a new Shortcut client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(token: &str) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|source| SyncError::Transport {
                endpoint: SHORTCUT_API_URL.to_string(),
                source,
            })?;
        Ok(Self {
            client,
            token: token.to_string(),
            api_url: SHORTCUT_API_URL.to_string(),
        })
    }

    /// Create a client with custom API URL (for testing).
    #[cfg(test)]
    pub fn with_url(token: &str, api_url: &str) -> Result<Self, SyncError> {
        let mut client = Self::new(token)?;
        client.api_url = api_url.to_string();
        Ok(client)
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, SyncError> {
        let response = self
            .client
            .get(format!("{}{endpoint}", self.api_url))
            .query(&[("token", self.token.as_str())])
            .send()
            .await
            .map_err(|source| transport(endpoint, source))?;
        read_json(response, endpoint).await
    }

    /// Like [`Self::get_json`], but a `404` is `Ok(None)` so callers can
    /// name the missing entity themselves.
    async fn get_json_opt<T: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<Option<T>, SyncError> {
        let response = self
            .client
            .get(format!("{}{endpoint}", self.api_url))
            .query(&[("token", self.token.as_str())])
            .send()
            .await
            .map_err(|source| transport(endpoint, source))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        read_json(response, endpoint).await.map(Some)
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        endpoint: &str,
        body: &B,
    ) -> Result<T, SyncError> {
        let response = self
            .client
            .request(method, format!("{}{endpoint}", self.api_url))
            .query(&[("token", self.token.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|source| transport(endpoint, source))?;
        read_json(response, endpoint).await
    }

    // =========================================================================
    // Members
    // =========================================================================

    /// List all members of the workspace.
    #[instrument(skip(self))]
    pub async fn list_members(&self) -> Result<Vec<Member>, SyncError> {
        self.get_json("/members").await
    }

    /// Resolve a GitHub login to a Shortcut member id.
    ///
    /// A `user-map` entry short-circuits the network entirely. Otherwise the
    /// member list is folded into an email-to-id mapping and the GitHub
    /// user's public email is looked up in it. A user without a public
    /// email resolves to `Ok(None)` with a warning.
    #[instrument(skip(self, user_map, github))]
    pub async fn resolve_user_id(
        &self,
        github_login: &str,
        user_map: &HashMap<String, String>,
        github: &GitHubClient,
    ) -> Result<Option<String>, SyncError> {
        if let Some(member_id) = user_map.get(github_login) {
            debug!(member_id = %member_id, "resolved member from user-map");
            return Ok(Some(member_id.clone()));
        }

        let members = self.list_members().await?;
        let email_to_id: HashMap<&str, &str> = members
            .iter()
            .filter_map(|member| {
                member
                    .profile
                    .email_address
                    .as_deref()
                    .map(|email| (email, member.id.as_str()))
            })
            .collect();

        let user = github.get_user(github_login).await?;
        let Some(email) = user.email.as_deref() else {
            warn!(login = %github_login, "could not get email address for GitHub user");
            return Ok(None);
        };
        Ok(email_to_id.get(email).map(ToString::to_string))
    }

    // =========================================================================
    // Projects and workflows
    // =========================================================================

    /// Find a project by exact name. With duplicate names the first listed
    /// match wins; the API gives no uniqueness guarantee.
    #[instrument(skip(self))]
    pub async fn find_project_by_name(&self, name: &str) -> Result<Option<Project>, SyncError> {
        let projects: Vec<Project> = self.get_json("/projects").await?;
        Ok(projects.into_iter().find(|project| project.name == name))
    }

    /// Fetch a project by id.
    #[instrument(skip(self))]
    pub async fn get_project(&self, id: u64) -> Result<Option<Project>, SyncError> {
        self.get_json_opt(&format!("/projects/{id}")).await
    }

    /// Resolve a workflow state by name within a project's team workflow.
    #[instrument(skip(self, project), fields(team_id = project.team_id))]
    pub async fn resolve_workflow_state(
        &self,
        state_name: &str,
        project: &Project,
    ) -> Result<Option<WorkflowState>, SyncError> {
        let team: Team = self.get_json(&format!("/teams/{}", project.team_id)).await?;
        Ok(team
            .workflow
            .states
            .into_iter()
            .find(|state| state.name == state_name))
    }

    // =========================================================================
    // Stories
    // =========================================================================

    /// Fetch a story by id.
    #[instrument(skip(self))]
    pub async fn get_story(&self, id: &str) -> Result<Option<Story>, SyncError> {
        self.get_json_opt(&format!("/stories/{id}")).await
    }

    /// Create a story. One attempt; any failure aborts creation.
    #[instrument(skip(self, body), fields(project_id = body.project_id))]
    pub async fn create_story(&self, body: &CreateStoryBody) -> Result<Story, SyncError> {
        self.send_json(reqwest::Method::POST, "/stories", body).await
    }

    /// Partially update a story; only the supplied fields are sent.
    #[instrument(skip(self, body))]
    pub async fn update_story(
        &self,
        id: &str,
        body: &UpdateStoryBody,
    ) -> Result<Story, SyncError> {
        self.send_json(reqwest::Method::PUT, &format!("/stories/{id}"), body)
            .await
    }

    // =========================================================================
    // Iterations
    // =========================================================================

    /// List all iterations of the workspace.
    #[instrument(skip(self))]
    pub async fn list_iterations(&self) -> Result<Vec<Iteration>, SyncError> {
        self.get_json("/iterations").await
    }

    /// Find the most recently updated started iteration in a group,
    /// optionally skipping one iteration by name.
    #[instrument(skip(self))]
    pub async fn find_latest_matching_iteration(
        &self,
        group_id: &str,
        exclude_name: Option<&str>,
    ) -> Result<Option<Iteration>, SyncError> {
        let iterations = self.list_iterations().await?;
        Ok(iterations
            .into_iter()
            .filter(|iteration| iteration.status == IterationStatus::Started)
            .filter(|iteration| iteration.group_ids.iter().any(|id| id == group_id))
            .filter(|iteration| !exclude_name.is_some_and(|name| iteration.name == name))
            .max_by_key(|iteration| iteration.updated_at))
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
