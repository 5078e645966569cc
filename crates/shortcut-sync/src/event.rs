//! GitHub `pull_request` webhook payload types.
//!
//! Only the fields the sync flows consume are modeled. The `action` field is
//! folded into [`EventKind`] so that the added label is only reachable from
//! the `Labeled` variant.

use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// One `pull_request` webhook delivery.
#[derive(Debug, Clone)]
pub struct PullRequestEvent {
    /// Which lifecycle action triggered the delivery.
    pub kind: EventKind,
    /// Pull request details.
    pub pull_request: PullRequest,
    /// Repository the pull request belongs to.
    pub repository: Repository,
}

/// Pull request action, with the per-action payload attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A pull request was opened.
    Opened,
    /// A pull request was closed (merged or not).
    Closed,
    /// A label was added to a pull request.
    Labeled {
        /// The label that was just added.
        label: Label,
    },
    /// Any other action; no handler runs for these.
    Other(String),
}

impl EventKind {
    /// The raw `action` string of the delivery.
    #[must_use]
    pub fn action(&self) -> &str {
        match self {
            Self::Opened => "opened",
            Self::Closed => "closed",
            Self::Labeled { .. } => "labeled",
            Self::Other(action) => action,
        }
    }
}

/// GitHub pull request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// Globally unique PR id (distinct from the per-repo number).
    pub id: u64,
    /// PR number within the repository.
    pub number: u64,
    /// PR title.
    pub title: String,
    /// PR body/description.
    #[serde(default)]
    pub body: Option<String>,
    /// Source branch.
    pub head: GitRef,
    /// Whether the PR was merged when closed.
    #[serde(default)]
    pub merged: bool,
    /// PR HTML URL.
    pub html_url: String,
    /// PR author.
    pub user: Account,
}

/// Git reference (branch).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitRef {
    /// Branch name.
    #[serde(rename = "ref")]
    pub ref_name: String,
}

/// GitHub account, as embedded in event payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Account login.
    pub login: String,
}

/// GitHub repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// Repository name.
    pub name: String,
    /// Repository owner.
    pub owner: Account,
}

/// GitHub label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label name.
    pub name: String,
}

/// Wire shape of the delivery; flattened into [`PullRequestEvent`].
#[derive(Debug, Deserialize)]
struct RawEvent {
    action: String,
    pull_request: PullRequest,
    repository: Repository,
    #[serde(default)]
    label: Option<Label>,
}

impl PullRequestEvent {
    /// Parse a `pull_request` event from its JSON payload.
    ///
    /// Unrecognized actions parse successfully into [`EventKind::Other`];
    /// only a payload that is not a pull request event at all is an error.
    pub fn from_json(raw: &str) -> Result<Self, SyncError> {
        let raw: RawEvent = serde_json::from_str(raw)?;
        let kind = match (raw.action.as_str(), raw.label) {
            ("opened", _) => EventKind::Opened,
            ("closed", _) => EventKind::Closed,
            ("labeled", Some(label)) => EventKind::Labeled { label },
            (action, _) => EventKind::Other(action.to_string()),
        };
        Ok(Self {
            kind,
            pull_request: raw.pull_request,
            repository: raw.repository,
        })
    }
}
