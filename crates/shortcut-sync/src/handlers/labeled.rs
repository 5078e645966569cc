//! `labeled` flow: assign the story to the latest matching iteration.

use tokio::time::sleep;
use tracing::{debug, info};

use crate::client::ShortcutClient;
use crate::config::Config;
use crate::error::SyncError;
use crate::event::{Label, PullRequestEvent};
use crate::github_client::GitHubClient;
use crate::matchers;
use crate::models::UpdateStoryBody;
use crate::outputs;

/// Handle a label being added to a pull request.
///
/// Only labels bound to an iteration rule do anything; everything else is a
/// normal no-op. The flow waits briefly before looking for the story so a
/// creation kicked off by the `opened` delivery has time to land.
pub async fn run(
    event: &PullRequestEvent,
    label: &Label,
    config: &Config,
    shortcut: &ShortcutClient,
    github: &GitHubClient,
) -> Result<(), SyncError> {
    let Some(rule) = config.iteration_rules.get(&label.name) else {
        debug!(label = %label.name, "label not configured for iteration assignment");
        return Ok(());
    };

    debug!(
        delay_secs = config.settle_delay.as_secs(),
        "waiting for a possible concurrent story creation to settle"
    );
    sleep(config.settle_delay).await;

    let pr = &event.pull_request;
    let story_id = matchers::story_id_from_pull_request(event, github)
        .await?
        .ok_or_else(|| {
            SyncError::not_found("story reference", format!("pull request #{}", pr.number))
        })?;
    shortcut
        .get_story(&story_id)
        .await?
        .ok_or_else(|| SyncError::not_found("story", &story_id))?;
    outputs::set_output("story-id", &story_id)?;

    let iteration = shortcut
        .find_latest_matching_iteration(&rule.group_id, rule.exclude_name.as_deref())
        .await?
        .ok_or_else(|| {
            SyncError::not_found(
                "iteration",
                format!("started iteration in group {}", rule.group_id),
            )
        })?;

    let update = UpdateStoryBody {
        iteration_id: Some(iteration.id),
        ..UpdateStoryBody::default()
    };
    shortcut.update_story(&story_id, &update).await?;
    info!(story_id = %story_id, iteration = %iteration.name, "story assigned to iteration");

    outputs::set_output("iteration-id", &iteration.id.to_string())?;
    outputs::set_output("iteration-url", &iteration.app_url)?;
    outputs::set_output("iteration-name", &iteration.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IterationRule;
    use crate::handlers::test_support::{config, event};
    use crate::outputs::test_support::OutputCapture;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn labeled_config(exclude_name: Option<&str>) -> Config {
        let mut config = config();
        config.iteration_rules.insert(
            "sprint".to_string(),
            IterationRule {
                group_id: "123".to_string(),
                exclude_name: exclude_name.map(ToString::to_string),
            },
        );
        config
    }

    fn sprint_label() -> Label {
        Label {
            name: "sprint".to_string(),
        }
    }

    async fn mount_story_and_iterations(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/stories/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 42,
                "name": "Fix the flux capacitor",
                "app_url": "https://app.shortcut.com/org/story/42",
                "project_id": 7,
                "workflow_state_id": 20
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/iterations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": 1, "name": "abc", "status": "started",
                    "group_ids": ["123"], "updated_at": "2026-01-01T00:00:00Z",
                    "app_url": "https://app.shortcut.com/org/iteration/1"
                },
                {
                    "id": 3, "name": "hij", "status": "started",
                    "group_ids": ["123"], "updated_at": "2026-01-03T00:00:00Z",
                    "app_url": "https://app.shortcut.com/org/iteration/3"
                }
            ])))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_unmapped_label_is_a_silent_no_op() {
        let capture = OutputCapture::start();
        // No mocks mounted: any network call would fail the flow.
        let server = MockServer::start().await;
        let shortcut = ShortcutClient::with_url("fake-shortcut-token", &server.uri()).unwrap();
        let github = GitHubClient::with_url("fake-github-token", &server.uri()).unwrap();

        let event = event("labeled", "fix/ch42-flux", None, false, Some("docs"));
        let label = Label {
            name: "docs".to_string(),
        };
        run(&event, &label, &labeled_config(None), &shortcut, &github)
            .await
            .unwrap();
        assert_eq!(capture.contents(), "");
    }

    #[tokio::test]
    async fn test_assigns_latest_started_iteration() {
        let capture = OutputCapture::start();
        let server = MockServer::start().await;
        mount_story_and_iterations(&server).await;
        Mock::given(method("PUT"))
            .and(path("/stories/42"))
            .and(body_json(json!({"iteration_id": 3})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 42,
                "name": "Fix the flux capacitor",
                "app_url": "https://app.shortcut.com/org/story/42",
                "project_id": 7,
                "workflow_state_id": 20,
                "iteration_id": 3
            })))
            .expect(1)
            .mount(&server)
            .await;

        let shortcut = ShortcutClient::with_url("fake-shortcut-token", &server.uri()).unwrap();
        let github = GitHubClient::with_url("fake-github-token", &server.uri()).unwrap();

        let event = event("labeled", "fix/ch42-flux", None, false, Some("sprint"));
        run(
            &event,
            &sprint_label(),
            &labeled_config(None),
            &shortcut,
            &github,
        )
        .await
        .unwrap();

        assert_eq!(
            capture.contents(),
            "story-id=42\n\
             iteration-id=3\n\
             iteration-url=https://app.shortcut.com/org/iteration/3\n\
             iteration-name=hij\n"
        );
    }

    #[tokio::test]
    async fn test_exclude_name_skips_an_otherwise_eligible_iteration() {
        let _capture = OutputCapture::start();
        let server = MockServer::start().await;
        mount_story_and_iterations(&server).await;
        Mock::given(method("PUT"))
            .and(path("/stories/42"))
            .and(body_json(json!({"iteration_id": 1})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 42,
                "name": "Fix the flux capacitor",
                "app_url": "https://app.shortcut.com/org/story/42",
                "project_id": 7,
                "workflow_state_id": 20,
                "iteration_id": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let shortcut = ShortcutClient::with_url("fake-shortcut-token", &server.uri()).unwrap();
        let github = GitHubClient::with_url("fake-github-token", &server.uri()).unwrap();

        let event = event("labeled", "fix/ch42-flux", None, false, Some("sprint"));
        run(
            &event,
            &sprint_label(),
            &labeled_config(Some("hij")),
            &shortcut,
            &github,
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_no_matching_iteration_fails() {
        let _capture = OutputCapture::start();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stories/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 42,
                "name": "Fix the flux capacitor",
                "app_url": "https://app.shortcut.com/org/story/42",
                "project_id": 7,
                "workflow_state_id": 20
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/iterations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let shortcut = ShortcutClient::with_url("fake-shortcut-token", &server.uri()).unwrap();
        let github = GitHubClient::with_url("fake-github-token", &server.uri()).unwrap();

        let event = event("labeled", "fix/ch42-flux", None, false, Some("sprint"));
        let err = run(
            &event,
            &sprint_label(),
            &labeled_config(None),
            &shortcut,
            &github,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            SyncError::NotFound {
                entity: "iteration",
                ..
            }
        ));
    }
}
