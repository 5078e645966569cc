//! Step outputs for the invoking workflow.

use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::SyncError;

/// Publish a step output as `key=value`.
///
/// Outputs are appended to the file named by `GITHUB_OUTPUT`. Outside a
/// workflow runner the pair is only logged.
pub fn set_output(key: &str, value: &str) -> Result<(), SyncError> {
    debug!(key = %key, value = %value, "setting output");
    let Some(path) = env::var_os("GITHUB_OUTPUT").map(PathBuf::from) else {
        warn!(key = %key, "GITHUB_OUTPUT is not set; output not published");
        return Ok(());
    };
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| SyncError::Io {
            context: format!("could not open output file {}", path.display()),
            source,
        })?;
    writeln!(file, "{key}={value}").map_err(|source| SyncError::Io {
        context: format!("could not write output file {}", path.display()),
        source,
    })
}
