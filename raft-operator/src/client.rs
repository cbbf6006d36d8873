use super::*;

use transport::{Response, Transport};

const CONFIGURATION_PATH: &str = "/raft/configuration";
const PEER_PATH: &str = "/raft/peer";

/// `ClusterAdminClient` issues the membership requests against one cluster member.
/// Each call is exactly one request. Nothing is retried and nothing is cached.
pub struct ClusterAdminClient<T> {
    transport: T,
}

impl<T: Transport> ClusterAdminClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Fetch the current Raft configuration.
    ///
    /// Unless `allow_stale` is set, the read is forwarded to the leader
    /// and fails with `Error::NoLeader` if there is none.
    pub async fn fetch_configuration(&self, allow_stale: bool) -> Result<Configuration> {
        let resp = self
            .transport
            .get(CONFIGURATION_PATH, &[], allow_stale)
            .await?;
        if !resp.is_success() {
            return Err(classify(resp));
        }
        let config: Configuration =
            serde_json::from_slice(&resp.body).map_err(TransportError::from)?;
        if allow_stale {
            warn!(
                "configuration (index={}) may be stale: read from a possibly non-leader server",
                config.index
            );
        }
        Ok(config)
    }

    /// Ask the leader to remove a peer from the configuration.
    ///
    /// Returns once the leader has accepted the change, which is not
    /// necessarily replicated yet.
    pub async fn remove_peer(&self, req: &RemovalRequest) -> Result<()> {
        let selector = req.selector()?;
        let resp = self.transport.put(PEER_PATH, &[selector], None).await?;
        if resp.is_success() {
            info!("removal of peer ({req}) accepted");
            return Ok(());
        }
        let e = match resp.status {
            // Servers that do not serve the route answer 404 with no body.
            404 if !resp.text().is_empty() => Error::PeerNotFound(req.clone()),
            409 => Error::RemovalRejected {
                target: req.clone(),
                reason: resp.text(),
            },
            400 => Error::InvalidRequest(resp.text()),
            _ => classify(resp),
        };
        Err(e)
    }
}

fn classify(resp: Response) -> Error {
    if resp.is_no_leader() {
        return Error::NoLeader { stale_retry: false };
    }
    TransportError::Status {
        status: resp.status,
        body: resp.text(),
    }
    .into()
}
