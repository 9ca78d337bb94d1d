use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the ingestion core.
///
/// Broker and scheduler implementations wrap their own failures in
/// `Error::Broker` via `anyhow`; only configuration rejection and the
/// terminal "all groups terminated" condition get dedicated variants,
/// since those are the two kinds callers are expected to branch on.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid source configuration: {0}")]
    Config(String),

    #[error("broker error: {0}")]
    Broker(#[from] anyhow::Error),

    #[error("all consumer groups terminated")]
    AllGroupsTerminated,
}
