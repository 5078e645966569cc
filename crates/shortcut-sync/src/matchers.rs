//! Story reference extraction from branch names and free text.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::error::SyncError;
use crate::event::PullRequestEvent;
use crate::github_client::GitHubClient;

/// Branch names carrying a story token: an optional prefix ending in `/` or
/// `-`, the literal `ch` immediately followed by digits, and an optional
/// suffix starting with `/` or `-`.
static BRANCH_STORY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:.+[-/])?ch(\d+)(?:[-/].+)?$").expect("branch pattern compiles")
});

/// Story URLs as rendered by the Shortcut web application.
static STORY_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://app\.shortcut\.com/\w+/story/(\d+)(/[A-Za-z0-9-]*)?")
        .expect("story URL pattern compiles")
});

/// A story reference found in free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryLink {
    /// The full matched URL.
    pub url: String,
    /// The numeric story id, as written (leading zeros preserved).
    pub id: String,
}

/// Extract a story id from a branch name, e.g. `fix/ch1234-flux-capacitor`.
///
/// The digit string is returned unmodified, so leading zeros survive.
#[must_use]
pub fn story_id_from_branch(branch: &str) -> Option<String> {
    BRANCH_STORY_RE
        .captures(branch)
        .map(|caps| caps[1].to_string())
}

/// Find the first story URL in a piece of text.
#[must_use]
pub fn story_link_in_text(text: &str) -> Option<StoryLink> {
    STORY_URL_RE.captures(text).map(|caps| StoryLink {
        url: caps[0].to_string(),
        id: caps[1].to_string(),
    })
}

/// Find a story URL referenced by a pull request.
///
/// The PR body is checked first; a body match makes no network call. Failing
/// that, the first page of issue comments is searched in the order GitHub
/// returns it (oldest first). A failed comment fetch is logged and treated
/// as "no reference found" rather than aborting the run.
pub async fn story_link_from_pull_request(
    event: &PullRequestEvent,
    github: &GitHubClient,
) -> Result<Option<StoryLink>, SyncError> {
    if let Some(link) = event
        .pull_request
        .body
        .as_deref()
        .and_then(story_link_in_text)
    {
        debug!(story_id = %link.id, "found story link in pull request body");
        return Ok(Some(link));
    }

    let comments = match github
        .list_comments(
            &event.repository.owner.login,
            &event.repository.name,
            event.pull_request.number,
        )
        .await
    {
        Ok(comments) => comments,
        Err(err) => {
            warn!(error = %err, "could not list pull request comments; assuming no story link");
            return Ok(None);
        }
    };

    Ok(comments
        .iter()
        .find_map(|comment| story_link_in_text(&comment.body)))
}

/// Resolve the story id a pull request refers to: branch name first, then
/// body and comments.
pub async fn story_id_from_pull_request(
    event: &PullRequestEvent,
    github: &GitHubClient,
) -> Result<Option<String>, SyncError> {
    let branch = &event.pull_request.head.ref_name;
    if let Some(story_id) = story_id_from_branch(branch) {
        debug!(story_id = %story_id, branch = %branch, "found story id in branch name");
        return Ok(Some(story_id));
    }
    Ok(story_link_from_pull_request(event, github)
        .await?
        .map(|link| link.id))
}
