use thiserror::Error;

/// Error categories of the retrieval engine.
///
/// Startup failures ([`RagError::IndexBuild`]) are fatal and abort
/// initialization. Per-query failures are converted at the `method` boundary
/// into one of a small set of user-facing outcomes; no raw backend error
/// reaches the caller.
#[derive(Debug, Error)]
pub enum RagError {
    /// The corpus was empty or produced malformed embeddings.
    #[error("index build failed: {0}")]
    IndexBuild(String),

    /// The generation endpoint or model download was unreachable.
    #[error("backend connection failed: {0}")]
    Connection(String),

    /// The generation service did not emit the expected answer marker.
    #[error("generated text has no answer marker: {0}")]
    Synthesis(String),

    /// The caller supplied an unusable question or parameter.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
