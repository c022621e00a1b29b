//! Typed errors for the parts of the pipeline that callers need to match on
//! programmatically (extraction, invariant checks, ordering, serialization).
//!
//! Most of the crate still threads `anyhow::Result` through call sites the
//! way the rest of the codebase does — `CoreError` exists for the handful of
//! places where a caller (the CLI, or a test) needs to distinguish *which*
//! of the four failure modes occurred rather than read a formatted message.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to extract {object_kind} from the catalog: {source}")]
    Extraction {
        object_kind: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("invariant violated: {message}")]
    InvariantViolation { message: String },

    #[error(
        "dependency cycle detected among {} object(s): {}",
        nodes.len(),
        nodes.join(" -> ")
    )]
    Cycle { nodes: Vec<String> },

    #[error("failed to render SQL for {stable_id}: {message}")]
    Serialization { stable_id: String, message: String },
}

pub type CoreResult<T> = Result<T, CoreError>;
