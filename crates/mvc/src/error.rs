//! Error taxonomy for result execution and the filter pipeline.
//!
//! Media type parsing has its own [`FormatError`](crate::media_type::FormatError);
//! everything an application action throws stays an opaque [`BoxError`] so the
//! original fault reaches the hosting layer intact.

use std::error::Error;
use thiserror::Error;

/// Opaque application fault crossing the pipeline boundary.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Errors raised while writing an action result to the response.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// A programming or configuration error with no recovery path,
    /// e.g. a created-at-route result whose route cannot be resolved.
    #[error("{reason}")]
    InvalidOperation { reason: String },

    /// Writing a response is an exclusive, single-write operation per request.
    #[error("response body has already been written")]
    ResponseAlreadyWritten,

    /// The transport aborted the request before the response was written.
    #[error("request aborted before the response was written")]
    Aborted,

    #[error("body serialization failed: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
}

impl ExecuteError {
    pub fn invalid_operation<S: ToString>(reason: S) -> Self {
        Self::InvalidOperation { reason: reason.to_string() }
    }
}

/// Terminal failure of one pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("result execution error: {source}")]
    Execute {
        #[from]
        source: ExecuteError,
    },

    /// A fault that escaped action invocation or result execution and was not
    /// marked handled by any exception filter. Carries the original error.
    #[error("unhandled fault: {0}")]
    Unhandled(BoxError),
}
