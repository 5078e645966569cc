//! Rendering of the configurable story and comment text.
//!
//! Templates see the same shape the webhook delivered (`payload.*`) or the
//! created story (`story.*`). Escaping is disabled; the output is markdown
//! destined for Shortcut and GitHub, not HTML.

use handlebars::Handlebars;
use serde_json::json;

use crate::config::Config;
use crate::error::SyncError;
use crate::event::PullRequestEvent;
use crate::models::Story;

fn registry() -> Handlebars<'static> {
    let mut registry = Handlebars::new();
    registry.register_escape_fn(handlebars::no_escape);
    registry
}

fn payload_context(event: &PullRequestEvent) -> serde_json::Value {
    json!({
        "payload": {
            "action": event.kind.action(),
            "pull_request": event.pull_request,
            "repository": event.repository,
        }
    })
}

/// Render the title for a new story. Without a configured template the PR
/// title is used as-is.
pub fn story_title(config: &Config, event: &PullRequestEvent) -> Result<String, SyncError> {
    match &config.story_title_template {
        Some(template) => Ok(registry().render_template(template, &payload_context(event))?),
        None => Ok(event.pull_request.title.clone()),
    }
}

/// Render the description for a new story. Without a configured template the
/// PR body is used as-is (empty when the PR has none).
pub fn story_description(config: &Config, event: &PullRequestEvent) -> Result<String, SyncError> {
    match &config.story_description_template {
        Some(template) => Ok(registry().render_template(template, &payload_context(event))?),
        None => Ok(event.pull_request.body.clone().unwrap_or_default()),
    }
}

/// Render the PR comment linking a freshly created story.
pub fn story_comment(config: &Config, story: &Story) -> Result<String, SyncError> {
    match &config.comment_template {
        Some(template) => Ok(registry().render_template(template, &json!({ "story": story }))?),
        None => Ok(format!("Shortcut story: {}", story.app_url)),
    }
}
