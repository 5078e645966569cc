//! `opened` flow: make sure the pull request has a story.

use tracing::{debug, info, warn};

use crate::client::ShortcutClient;
use crate::config::Config;
use crate::error::SyncError;
use crate::event::PullRequestEvent;
use crate::github_client::GitHubClient;
use crate::matchers;
use crate::models::{CreateStoryBody, ExternalTicket, Story};
use crate::outputs;
use crate::template;

/// Handle a newly opened pull request.
///
/// A story reference in the branch name or in the PR body/comments means the
/// story already exists (created by another integration or an earlier run);
/// its id is emitted and nothing is mutated. Otherwise a story is created
/// and linked back to the PR via a comment.
pub async fn run(
    event: &PullRequestEvent,
    config: &Config,
    shortcut: &ShortcutClient,
    github: &GitHubClient,
) -> Result<(), SyncError> {
    let pr = &event.pull_request;

    if let Some(story_id) = matchers::story_id_from_pull_request(event, github).await? {
        debug!(story_id = %story_id, "pull request already references a story");
        return outputs::set_output("story-id", &story_id);
    }

    let story = create_story(event, config, shortcut, github).await?;
    info!(story_id = story.id, app_url = %story.app_url, "created story");
    outputs::set_output("story-id", &story.id.to_string())?;

    let comment = template::story_comment(config, &story)?;
    github
        .create_comment(
            &event.repository.owner.login,
            &event.repository.name,
            pr.number,
            &comment,
        )
        .await
}

async fn create_story(
    event: &PullRequestEvent,
    config: &Config,
    shortcut: &ShortcutClient,
    github: &GitHubClient,
) -> Result<Story, SyncError> {
    let pr = &event.pull_request;

    let owner_id = shortcut
        .resolve_user_id(&pr.user.login, &config.user_map, github)
        .await?;
    let project = shortcut
        .find_project_by_name(&config.project_name)
        .await?
        .ok_or_else(|| SyncError::not_found("project", &config.project_name))?;

    let mut body = CreateStoryBody {
        name: template::story_title(config, event)?,
        description: template::story_description(config, event)?,
        project_id: project.id,
        external_tickets: vec![ExternalTicket {
            external_id: pr.id.to_string(),
            external_url: pr.html_url.clone(),
        }],
        owner_ids: owner_id.map(|id| vec![id]),
        workflow_state_id: None,
    };

    if let Some(state_name) = &config.opened_state_name {
        match shortcut.resolve_workflow_state(state_name, &project).await? {
            Some(state) => body.workflow_state_id = Some(state.id),
            None => {
                warn!(state = %state_name, "configured opened state not found; creating story without it");
            }
        }
    }

    shortcut.create_story(&body).await
}
