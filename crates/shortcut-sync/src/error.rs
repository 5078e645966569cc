//! Error types for the sync pipeline.

use thiserror::Error;

/// Errors that abort a sync run.
///
/// Client lookups that can legitimately come back empty return `Ok(None)`
/// instead of an error; the handler at the call site decides whether an
/// absent result is fatal for its flow.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Missing or conflicting action configuration.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// An upstream API answered with a non-success status.
    #[error("HTTP {status} {endpoint}")]
    Api {
        /// Response status code.
        status: u16,
        /// Endpoint path the request was sent to.
        endpoint: String,
    },

    /// The request never produced a usable response.
    #[error("request to {endpoint} failed")]
    Transport {
        /// Endpoint path the request was sent to.
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// An entity the current flow requires could not be resolved.
    #[error("could not find {entity}: {name}")]
    NotFound {
        /// Kind of entity (project, story, workflow state, iteration).
        entity: &'static str,
        /// Name or identifier that failed to resolve.
        name: String,
    },

    /// The event payload did not parse as a pull request event.
    #[error("could not parse pull_request event payload")]
    Payload(#[from] serde_json::Error),

    /// A configured template failed to render.
    #[error("template rendering failed")]
    Template(#[from] handlebars::RenderError),

    /// Reading or writing a runner-provided file failed.
    #[error("{context}")]
    Io {
        /// What was being accessed.
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn not_found(entity: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            name: name.into(),
        }
    }
}
