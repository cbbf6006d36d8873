use super::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("no cluster leader{}", stale_retry_hint(.stale_retry))]
    NoLeader { stale_retry: bool },
    #[error("peer ({0}) not found in the raft configuration")]
    PeerNotFound(RemovalRequest),
    #[error("removal of peer ({target}) rejected: {reason}")]
    RemovalRejected {
        target: RemovalRequest,
        reason: String,
    },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Validation(#[from] config::ValidationErrors),
}

fn stale_retry_hint(stale_retry: &bool) -> &'static str {
    if *stale_retry {
        " (retry with --stale to read the configuration of a non-leader server)"
    } else {
        ""
    }
}

/// Failures of the transport collaborator.
/// None of them says anything about the state of the cluster.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("invalid cluster address {0:?}")]
    InvalidAddress(String),
    #[error("failed to reach cluster")]
    Request(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("unexpected response (status={status}): {body}")]
    Status { status: u16, body: String },
    #[error("malformed response")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        Self::Request(Box::new(e))
    }
}
