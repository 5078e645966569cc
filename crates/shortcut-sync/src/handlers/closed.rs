//! `closed` flow: move the story to its configured terminal state.

use tracing::{debug, info};

use crate::client::ShortcutClient;
use crate::config::Config;
use crate::error::SyncError;
use crate::event::PullRequestEvent;
use crate::github_client::GitHubClient;
use crate::matchers;
use crate::models::UpdateStoryBody;
use crate::outputs;

/// Handle a closed pull request.
///
/// The target state comes from `merged-state-name` when the PR was merged
/// and `closed-state-name` otherwise; with neither configured the story is
/// left untouched. Every resolution step that comes back empty fails the
/// run, naming the missing entity.
pub async fn run(
    event: &PullRequestEvent,
    config: &Config,
    shortcut: &ShortcutClient,
    github: &GitHubClient,
) -> Result<(), SyncError> {
    let pr = &event.pull_request;

    let story_id = matchers::story_id_from_pull_request(event, github)
        .await?
        .ok_or_else(|| {
            SyncError::not_found("story reference", format!("pull request #{}", pr.number))
        })?;
    outputs::set_output("story-id", &story_id)?;

    let story = shortcut
        .get_story(&story_id)
        .await?
        .ok_or_else(|| SyncError::not_found("story", &story_id))?;
    let project = shortcut
        .get_project(story.project_id)
        .await?
        .ok_or_else(|| SyncError::not_found("project", story.project_id.to_string()))?;

    let state_name = if pr.merged {
        config.merged_state_name.as_deref()
    } else {
        config.closed_state_name.as_deref()
    };
    let Some(state_name) = state_name else {
        debug!(
            merged = pr.merged,
            "no target state configured for this close; leaving story untouched"
        );
        return Ok(());
    };

    let state = shortcut
        .resolve_workflow_state(state_name, &project)
        .await?
        .ok_or_else(|| SyncError::not_found("workflow state", state_name))?;

    let update = UpdateStoryBody {
        workflow_state_id: Some(state.id),
        ..UpdateStoryBody::default()
    };
    shortcut.update_story(&story_id, &update).await?;
    info!(story_id = %story_id, state = %state_name, merged = pr.merged, "story state updated");
    Ok(())
}
