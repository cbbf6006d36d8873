use super::*;

use client::ClusterAdminClient;
use transport::Transport;

mod report;
pub use report::PeerReport;

/// Confirmation that the leader accepted a removal.
/// The new configuration may not be visible yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Removal {
    pub address: String,
}

impl fmt::Display for Removal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Removed peer with address {:?}", self.address)
    }
}

/// `MembershipController` implements the operator commands on top of `ClusterAdminClient`.
///
/// It holds no state. Listing and then removing is not causally consistent:
/// the configuration may change between the two calls.
pub struct MembershipController<T> {
    client: ClusterAdminClient<T>,
}

impl<T: Transport> MembershipController<T> {
    pub fn new(client: ClusterAdminClient<T>) -> Self {
        Self { client }
    }

    /// List the peers of the current configuration.
    /// An empty report is a valid result.
    pub async fn list_peers(&self, allow_stale: bool) -> Result<PeerReport> {
        match self.client.fetch_configuration(allow_stale).await {
            Ok(config) => Ok(PeerReport::new(config, allow_stale)),
            Err(Error::NoLeader { .. }) if !allow_stale => {
                Err(Error::NoLeader { stale_retry: true })
            }
            Err(e) => Err(e),
        }
    }

    /// Remove the peer listening on `address`.
    pub async fn remove_peer(&self, address: &str) -> Result<Removal> {
        let address = address.trim();
        if address.is_empty() {
            return Err(Error::InvalidRequest(
                "missing address of the peer to remove".to_string(),
            ));
        }
        let req = RemovalRequest::by_address(address);
        self.client.remove_peer(&req).await?;
        Ok(Removal {
            address: address.to_string(),
        })
    }
}
