//! Unified error handling for courier.
//!
//! The collection transforms themselves ([`interpret`](crate::interpret),
//! [`synthesize`](crate::synthesize), [`assemble`](crate::assemble) and
//! [`reconcile`](crate::reconcile())) never fail: malformed input degrades to a
//! conservative default. Errors only come from the boundary, where documents
//! are read, written, fetched or published.
//!
//! # Overview
//!
//! Boundary operations return [`CourierResult<T>`]. Host-provided route sources
//! report through `anyhow`, which is carried transparently in
//! [`CourierError::Source`].

use std::path::PathBuf;

use thiserror::Error;

/// Result type for all boundary operations.
pub type CourierResult<T> = Result<T, CourierError>;

#[derive(Debug, Error)]
pub enum CourierError {
    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {context}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("remote store error: {0}")]
    Remote(String),

    #[error("collection not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Source(#[from] anyhow::Error),
}

impl CourierError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }
}
