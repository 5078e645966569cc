//! Action entry point.
//!
//! Runs once per `pull_request` webhook delivery: parse the event, build the
//! configuration, dispatch to the matching handler, exit. A non-zero exit
//! marks the workflow step as failed.

use std::env;
use std::fs;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shortcut_sync::{handlers, Config, GitHubClient, PullRequestEvent, ShortcutClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("shortcut_sync=info".parse()?))
        .init();

    let event_name = env::var("GITHUB_EVENT_NAME").unwrap_or_default();
    if event_name != "pull_request" {
        bail!("only pull_request events are supported, got {event_name:?}");
    }

    let event_path =
        env::var("GITHUB_EVENT_PATH").context("GITHUB_EVENT_PATH is not set")?;
    let raw = fs::read_to_string(&event_path)
        .with_context(|| format!("could not read event payload at {event_path}"))?;
    let event = PullRequestEvent::from_json(&raw)?;

    let config = Config::from_env()?;
    let shortcut = ShortcutClient::new(&config.shortcut_token)?;
    let github = GitHubClient::new(&config.github_token)?;

    info!(
        action = %event.kind.action(),
        pr = event.pull_request.number,
        repo = %event.repository.name,
        "processing pull request event"
    );

    handlers::dispatch(&event, &config, &shortcut, &github).await?;
    Ok(())
}
