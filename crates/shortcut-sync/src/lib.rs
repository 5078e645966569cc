//! Shortcut story synchronization for GitHub pull requests.
//!
//! This crate provides:
//! - Pull request webhook payload parsing
//! - Story reference extraction from branch names and free text
//! - PR author allow/deny filtering
//! - REST client for the Shortcut API (members, projects, stories, iterations)
//! - GitHub API client for issue comments and user lookup
//! - Handlers for the `opened`, `closed` and `labeled` pull request actions

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Many async API methods can fail

pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod filter;
pub mod github_client;
pub mod handlers;
pub mod matchers;
pub mod models;
pub mod outputs;
pub mod template;

pub use client::ShortcutClient;
pub use config::Config;
pub use error::SyncError;
pub use event::{EventKind, PullRequestEvent};
pub use github_client::GitHubClient;
