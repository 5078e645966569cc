//! PR author allow/deny evaluation.

use tracing::debug;

use crate::config::Config;
use crate::error::SyncError;

/// Decide whether a pull request author should be processed.
///
/// With both lists empty every author passes. A non-empty `only-users` list
/// is consulted before `ignored-users`; membership in both non-empty lists
/// at once is a configuration error, not a precedence rule.
///
/// # Errors
///
/// Returns [`SyncError::Configuration`] naming the author when they appear
/// in both a non-empty allow-list and a non-empty deny-list.
pub fn should_process_author(author: &str, config: &Config) -> Result<bool, SyncError> {
    let only = &config.only_users;
    let ignored = &config.ignored_users;

    if only.is_empty() && ignored.is_empty() {
        debug!("no users configured in only-users or ignored-users; proceeding");
        return Ok(true);
    }

    if !only.is_empty() && !ignored.is_empty() && only.contains(author) && ignored.contains(author)
    {
        return Err(SyncError::config(format!(
            "PR author {author} is listed in both only-users and ignored-users"
        )));
    }

    if !only.is_empty() {
        if only.contains(author) {
            debug!(author = %author, "author is in only-users; proceeding");
            return Ok(true);
        }
        debug!(author = %author, "author is not in only-users; skipping");
        return Ok(false);
    }

    if ignored.contains(author) {
        debug!(author = %author, "author is in ignored-users; skipping");
        return Ok(false);
    }
    debug!(author = %author, "author is not in ignored-users; proceeding");
    Ok(true)
}
