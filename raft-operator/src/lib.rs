#![deny(unused_must_use)]

/// Errors returned to the operator.
mod error;
pub use error::{Error, TransportError};

/// Seam between the operator and a cluster member.
pub mod transport;

/// Implementation of `ClusterAdminClient`.
pub mod client;

/// Operator-facing membership commands.
pub mod membership;

/// Loading and validation of agent configuration files.
pub mod config;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

pub type Result<T> = std::result::Result<T, Error>;

/// Membership record of a server in the Raft configuration.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Peer {
    #[serde(rename = "ID")]
    pub id: String,
    /// `host:port` the server is reachable at.
    /// Not guaranteed to be unique in a stale snapshot.
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Voter")]
    pub voter: bool,
}

/// Point-in-time snapshot of the Raft configuration.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Default)]
pub struct Configuration {
    /// Servers in the order the consensus engine reports them.
    #[serde(rename = "Servers", default)]
    pub servers: Vec<Peer>,
    /// Opaque version of the configuration owned by the consensus engine.
    #[serde(rename = "Index", default)]
    pub index: u64,
}

impl Configuration {
    /// Find the peer a removal request points to.
    pub fn find(&self, req: &RemovalRequest) -> Option<&Peer> {
        match req.selector().ok()? {
            ("id", id) => self.servers.iter().find(|p| p.id == id),
            (_, address) => self.servers.iter().find(|p| p.address == address),
        }
    }
}

/// Identifies the peer to evict from the configuration.
/// Exactly one of `id` or `address` must be set. Empty strings count as unset.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct RemovalRequest {
    pub id: Option<String>,
    pub address: Option<String>,
}

impl RemovalRequest {
    pub fn by_address(address: impl Into<String>) -> Self {
        Self {
            id: None,
            address: Some(address.into()),
        }
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            address: None,
        }
    }

    /// The identifying field as a `(key, value)` query pair.
    pub fn selector(&self) -> Result<(&'static str, &str)> {
        let id = self.id.as_deref().filter(|x| !x.is_empty());
        let address = self.address.as_deref().filter(|x| !x.is_empty());
        match (id, address) {
            (Some(id), None) => Ok(("id", id)),
            (None, Some(address)) => Ok(("address", address)),
            (None, None) => Err(Error::InvalidRequest(
                "a peer ID or address is required".to_string(),
            )),
            (Some(_), Some(_)) => Err(Error::InvalidRequest(
                "a peer ID and an address are mutually exclusive".to_string(),
            )),
        }
    }
}

impl fmt::Display for RemovalRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.selector() {
            Ok((key, value)) => write!(f, "{key}={value}"),
            Err(_) => write!(
                f,
                "id={}, address={}",
                self.id.as_deref().unwrap_or_default(),
                self.address.as_deref().unwrap_or_default()
            ),
        }
    }
}
