//! Action-input configuration.
//!
//! Inputs arrive as `INPUT_*` environment variables set by the workflow
//! runner. [`Config::from_env`] reads them exactly once per invocation; every
//! component receives a `&Config` instead of touching the environment itself.

use std::collections::{HashMap, HashSet};
use std::env;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::warn;

use crate::error::SyncError;

/// Blind wait in the labeled flow before searching for the story reference,
/// when `settle-delay-seconds` is not configured.
const DEFAULT_SETTLE_DELAY_SECS: u64 = 10;

/// Iteration assignment rule bound to a GitHub label name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IterationRule {
    /// Shortcut group whose started iterations are candidates.
    pub group_id: String,
    /// Iteration name that must not be selected even when it matches.
    #[serde(default)]
    pub exclude_name: Option<String>,
}

/// Immutable per-invocation configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shortcut API token, sent as a `token` query parameter.
    pub shortcut_token: String,
    /// GitHub API token, sent as a bearer credential.
    pub github_token: String,
    /// Shortcut project new stories are created in (exact-name lookup).
    pub project_name: String,
    /// Static GitHub login to Shortcut member id mapping. Takes precedence
    /// over email-based resolution.
    pub user_map: HashMap<String, String>,
    /// Allow-list of PR author logins. Empty means no restriction.
    pub only_users: HashSet<String>,
    /// Deny-list of PR author logins. Empty means no restriction.
    pub ignored_users: HashSet<String>,
    /// Workflow state for newly created stories.
    pub opened_state_name: Option<String>,
    /// Target state when a PR is closed without merging.
    pub closed_state_name: Option<String>,
    /// Target state when a PR is merged.
    pub merged_state_name: Option<String>,
    /// Template for new story titles; absent means the PR title.
    pub story_title_template: Option<String>,
    /// Template for new story descriptions; absent means the PR body.
    pub story_description_template: Option<String>,
    /// Template for the PR comment linking the story.
    pub comment_template: Option<String>,
    /// Label name to iteration rule mapping for the labeled flow.
    pub iteration_rules: HashMap<String, IterationRule>,
    /// Wait before the labeled flow searches for the story reference.
    pub settle_delay: Duration,
}

impl Config {
    /// Build the configuration from `INPUT_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Configuration`] when a required input is missing.
    /// Malformed optional JSON inputs degrade to absent with a warning.
    pub fn from_env() -> Result<Self, SyncError> {
        Ok(Self {
            shortcut_token: required_input("shortcut-token")?,
            github_token: required_input("github-token")?,
            project_name: required_input("project-name")?,
            user_map: json_input("user-map"),
            only_users: user_list("only-users"),
            ignored_users: user_list("ignored-users"),
            opened_state_name: input("opened-state-name"),
            closed_state_name: input("closed-state-name"),
            merged_state_name: input("merged-state-name"),
            story_title_template: input("story-title-template"),
            story_description_template: input("story-description-template"),
            comment_template: input("comment-template"),
            iteration_rules: json_input("label-iteration-group-map"),
            settle_delay: settle_delay(),
        })
    }
}

/// Read one action input. Empty values count as unset.
fn input(name: &str) -> Option<String> {
    env::var(format!("INPUT_{}", name.to_uppercase()))
        .ok()
        .filter(|value| !value.is_empty())
}

fn required_input(name: &str) -> Result<String, SyncError> {
    input(name).ok_or_else(|| SyncError::config(format!("required input `{name}` is not set")))
}

/// Parse a comma-separated login list into a set. Entries are trimmed and
/// compared case-sensitively.
fn user_list(name: &str) -> HashSet<String> {
    input(name)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|login| !login.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Parse an optional JSON input. Malformed JSON degrades to the default with
/// a warning rather than failing the run.
fn json_input<T: DeserializeOwned + Default>(name: &str) -> T {
    let Some(raw) = input(name) else {
        return T::default();
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            warn!(input = %name, error = %err, "input is not valid JSON; ignoring it");
            T::default()
        }
    }
}

fn settle_delay() -> Duration {
    let secs = input("settle-delay-seconds")
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(DEFAULT_SETTLE_DELAY_SECS);
    Duration::from_secs(secs)
}
