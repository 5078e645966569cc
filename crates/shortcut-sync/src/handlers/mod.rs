//! Handlers for pull request lifecycle actions.
//!
//! Each delivery runs exactly one flow. The dispatcher applies the author
//! filter, then routes on the action; filtered authors and actions without
//! a handler are silent no-ops.

pub mod closed;
pub mod labeled;
pub mod opened;

use tracing::{debug, info};

use crate::client::ShortcutClient;
use crate::config::Config;
use crate::error::SyncError;
use crate::event::{EventKind, PullRequestEvent};
use crate::filter;
use crate::github_client::GitHubClient;

/// Route one pull request delivery to its handler.
pub async fn dispatch(
    event: &PullRequestEvent,
    config: &Config,
    shortcut: &ShortcutClient,
    github: &GitHubClient,
) -> Result<(), SyncError> {
    let author = &event.pull_request.user.login;
    if !filter::should_process_author(author, config)? {
        info!(author = %author, "pull request author filtered out; skipping");
        return Ok(());
    }

    match &event.kind {
        EventKind::Opened => opened::run(event, config, shortcut, github).await,
        EventKind::Closed => closed::run(event, config, shortcut, github).await,
        EventKind::Labeled { label } => labeled::run(event, label, config, shortcut, github).await,
        EventKind::Other(action) => {
            debug!(action = %action, "no handler for this action");
            Ok(())
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::{HashMap, HashSet};
    use std::time::Duration;

    use serde_json::json;

    use crate::config::Config;
    use crate::event::PullRequestEvent;

    pub(crate) fn config() -> Config {
        Config {
            shortcut_token: "fake-shortcut-token".to_string(),
            github_token: "fake-github-token".to_string(),
            project_name: "fake-project".to_string(),
            user_map: HashMap::new(),
            only_users: HashSet::new(),
            ignored_users: HashSet::new(),
            opened_state_name: None,
            closed_state_name: None,
            merged_state_name: None,
            story_title_template: None,
            story_description_template: None,
            comment_template: None,
            iteration_rules: HashMap::new(),
            settle_delay: Duration::ZERO,
        }
    }

    pub(crate) fn event(
        action: &str,
        branch: &str,
        body: Option<&str>,
        merged: bool,
        label: Option<&str>,
    ) -> PullRequestEvent {
        let raw = json!({
            "action": action,
            "pull_request": {
                "id": 4242,
                "number": 17,
                "title": "Fix the flux capacitor",
                "body": body,
                "head": {"ref": branch},
                "merged": merged,
                "html_url": "https://github.com/octocat/example/pull/17",
                "user": {"login": "octocat"}
            },
            "repository": {"name": "example", "owner": {"login": "octocat"}},
            "label": label.map(|name| json!({"name": name})),
        });
        PullRequestEvent::from_json(&raw.to_string()).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{config, event};
    use super::*;
    use crate::outputs::test_support::OutputCapture;
    use wiremock::MockServer;

    async fn clients(server: &MockServer) -> (ShortcutClient, GitHubClient) {
        (
            ShortcutClient::with_url("fake-shortcut-token", &server.uri()).unwrap(),
            GitHubClient::with_url("fake-github-token", &server.uri()).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_filtered_author_is_a_silent_no_op() {
        let capture = OutputCapture::start();
        // No mocks mounted: any network call would fail the flow.
        let server = MockServer::start().await;
        let (shortcut, github) = clients(&server).await;

        let mut config = config();
        config.ignored_users.insert("octocat".to_string());

        let event = event("opened", "fix/ch123-flux", None, false, None);
        dispatch(&event, &config, &shortcut, &github).await.unwrap();
        assert_eq!(capture.contents(), "");
    }

    #[tokio::test]
    async fn test_conflicting_lists_fail_before_any_handler() {
        let server = MockServer::start().await;
        let (shortcut, github) = clients(&server).await;

        let mut config = config();
        config.only_users.insert("octocat".to_string());
        config.ignored_users.insert("octocat".to_string());

        let event = event("opened", "fix/ch123-flux", None, false, None);
        let err = dispatch(&event, &config, &shortcut, &github)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_unhandled_action_is_a_silent_no_op() {
        let capture = OutputCapture::start();
        let server = MockServer::start().await;
        let (shortcut, github) = clients(&server).await;

        let event = event("synchronize", "fix/ch123-flux", None, false, None);
        dispatch(&event, &config(), &shortcut, &github)
            .await
            .unwrap();
        assert_eq!(capture.contents(), "");
    }
}
