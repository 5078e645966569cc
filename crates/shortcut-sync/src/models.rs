//! Shortcut entity definitions and request bodies.
//!
//! Only the fields the sync flows consume are modeled; everything else the
//! API returns is ignored during deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shortcut workspace member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// Member id (UUID string).
    pub id: String,
    /// Profile details.
    pub profile: MemberProfile,
}

/// Member profile details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberProfile {
    /// Email address, if the member has one on file.
    #[serde(default)]
    pub email_address: Option<String>,
}

/// Shortcut project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Project id.
    pub id: u64,
    /// Project name.
    pub name: String,
    /// Team owning this project's workflow.
    pub team_id: u64,
}

/// Team, carrying the workflow its projects share.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    /// Team id.
    pub id: u64,
    /// The team's workflow.
    pub workflow: Workflow,
}

/// Workflow: an ordered set of named states.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    /// States in board order.
    pub states: Vec<WorkflowState>,
}

/// One workflow state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    /// State id.
    pub id: u64,
    /// State name; transitions are configured by this name.
    pub name: String,
    /// State category.
    #[serde(rename = "type")]
    pub state_type: StateType,
}

/// Workflow state category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateType {
    Unstarted,
    Started,
    Done,
    /// Catch-all so new categories do not break parsing.
    #[serde(other)]
    Unknown,
}

/// Shortcut story.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    /// Story id.
    pub id: u64,
    /// Story name.
    pub name: String,
    /// Link to the story in the web application.
    pub app_url: String,
    /// Project the story belongs to.
    pub project_id: u64,
    /// Current workflow state.
    pub workflow_state_id: u64,
    /// Iteration the story is assigned to, if any.
    #[serde(default)]
    pub iteration_id: Option<u64>,
}

/// Time-boxed grouping of stories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Iteration {
    /// Iteration id.
    pub id: u64,
    /// Iteration name.
    pub name: String,
    /// Lifecycle status.
    pub status: IterationStatus,
    /// Groups this iteration belongs to.
    #[serde(default)]
    pub group_ids: Vec<String>,
    /// Last modification time; used as the recency proxy when several
    /// iterations match.
    pub updated_at: DateTime<Utc>,
    /// Link to the iteration in the web application.
    pub app_url: String,
}

/// Iteration lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IterationStatus {
    Unstarted,
    Started,
    Done,
    /// Catch-all so new statuses do not break parsing.
    #[serde(other)]
    Unknown,
}

/// Link between a story and an external system record (here: the PR).
#[derive(Debug, Clone, Serialize)]
pub struct ExternalTicket {
    /// Identifier in the external system.
    pub external_id: String,
    /// URL of the external record.
    pub external_url: String,
}

/// Request body for `POST /stories`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateStoryBody {
    /// Story name.
    pub name: String,
    /// Story description.
    pub description: String,
    /// Project to create the story in.
    pub project_id: u64,
    /// External ticket reference back to the pull request.
    pub external_tickets: Vec<ExternalTicket>,
    /// Story owners, when the author could be resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_ids: Option<Vec<String>>,
    /// Initial workflow state, when configured and resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_state_id: Option<u64>,
}

/// Request body for `PUT /stories/{id}`. Only supplied fields are sent;
/// everything else is left untouched server-side.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateStoryBody {
    /// New workflow state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_state_id: Option<u64>,
    /// New iteration assignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iteration_id: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_body_is_partial() {
        let update = UpdateStoryBody {
            workflow_state_id: Some(500),
            ..UpdateStoryBody::default()
        };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"workflow_state_id":500}"#);

        let empty = UpdateStoryBody::default();
        assert_eq!(serde_json::to_string(&empty).unwrap(), "{}");
    }

    #[test]
    fn test_create_body_skips_unset_options() {
        let body = CreateStoryBody {
            name: "story".to_string(),
            description: String::new(),
            project_id: 7,
            external_tickets: vec![],
            owner_ids: None,
            workflow_state_id: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("owner_ids"));
        assert!(!json.contains("workflow_state_id"));
    }

    #[test]
    fn test_iteration_parses_unknown_status() {
        let json = r#"{
            "id": 1,
            "name": "Sprint 1",
            "status": "some-new-status",
            "group_ids": [],
            "updated_at": "2026-01-05T12:00:00Z",
            "app_url": "https://app.shortcut.com/org/iteration/1"
        }"#;
        let iteration: Iteration = serde_json::from_str(json).unwrap();
        assert_eq!(iteration.status, IterationStatus::Unknown);
    }
}
