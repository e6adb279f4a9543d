use thiserror::Error;

/// Error taxonomy for the mint pipeline.
///
/// `Duplicate` is expected and non-fatal — ingestion absorbs it as "already
/// ingested". The rest propagate to the caller; the HTTP layer maps them to
/// status codes.
#[derive(Error, Debug)]
pub enum MintError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Already ingested: {0}")]
    Duplicate(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Chain adapter error: {0}")]
    Chain(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
