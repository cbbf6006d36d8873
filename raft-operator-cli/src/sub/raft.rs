use super::*;

use raft_operator::client::ClusterAdminClient;
use raft_operator::membership::{MembershipController, PeerReport, Removal};
use raft_operator::transport::{HttpTransport, TransportConfig};
use std::time::Duration;

const REMOVE_PEER_LONG_ABOUT: &str = "\
Remove the Raft peer listening on the given address from the configuration.

The leader looks the peer up in the configuration it holds when the request \
arrives. That configuration may have changed since an earlier list-peers.";

#[derive(Args, Debug)]
pub struct HttpArgs {
    /// Cluster member to contact, as host:port or URL.
    #[arg(
        long,
        env = "RAFT_OPERATOR_HTTP_ADDR",
        default_value = "http://127.0.0.1:8500",
        global = true
    )]
    http_addr: String,
    /// ACL token sent with every request.
    #[arg(long, env = "RAFT_OPERATOR_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,
    #[arg(long, value_name = "MS", default_value_t = 5000, global = true)]
    connect_timeout_ms: u64,
    /// Deadline of the whole request.
    #[arg(long, value_name = "MS", global = true)]
    timeout_ms: Option<u64>,
}

impl HttpArgs {
    fn controller(&self) -> Result<MembershipController<HttpTransport>> {
        let transport = HttpTransport::new(TransportConfig {
            address: self.http_addr.clone(),
            token: self.token.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            timeout: self.timeout_ms.map(Duration::from_millis),
        })?;
        Ok(MembershipController::new(ClusterAdminClient::new(transport)))
    }
}

#[derive(Subcommand, Debug)]
enum Verb {
    /// Display the current Raft peer configuration.
    ListPeers {
        /// Read the configuration of the contacted server even if it is not the leader.
        #[arg(long)]
        stale: bool,
    },
    /// Remove a Raft peer from the configuration.
    #[command(long_about = REMOVE_PEER_LONG_ABOUT)]
    RemovePeer {
        /// Address of the peer to remove, as host:port.
        #[arg(long, value_name = "ADDR")]
        address: String,
    },
}

#[derive(Args, Debug)]
pub struct CommandArgs {
    #[command(flatten)]
    http: HttpArgs,
    #[command(subcommand)]
    verb: Option<Verb>,

    // Flag spelling of the verbs, kept for old scripts.
    #[arg(long, hide = true, conflicts_with = "remove_peer")]
    list_peers: bool,
    #[arg(long, hide = true)]
    remove_peer: bool,
    #[arg(long, hide = true, requires = "list_peers")]
    stale: bool,
    #[arg(long, hide = true, value_name = "ADDR", requires = "remove_peer")]
    address: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Operation {
    ListPeers { stale: bool },
    RemovePeer { address: String },
    ShowHelp,
}

impl CommandArgs {
    fn operation(&self) -> Result<Operation> {
        let legacy = self.list_peers || self.remove_peer;
        let op = match &self.verb {
            Some(_) if legacy => {
                anyhow::bail!("--list-peers and --remove-peer cannot be combined with a subcommand")
            }
            Some(Verb::ListPeers { stale }) => Operation::ListPeers { stale: *stale },
            Some(Verb::RemovePeer { address }) => Operation::RemovePeer {
                address: address.clone(),
            },
            None if self.list_peers => Operation::ListPeers { stale: self.stale },
            None if self.remove_peer => Operation::RemovePeer {
                address: self.address.clone().unwrap_or_default(),
            },
            None => Operation::ShowHelp,
        };
        Ok(op)
    }
}

fn help() -> Result<String> {
    let mut cmd = Cli::command();
    cmd.build();
    let raft = cmd
        .find_subcommand_mut("raft")
        .context("raft subcommand is not registered")?;
    Ok(raft.render_help().to_string())
}

async fn list_peers(http: &HttpArgs, stale: bool) -> Result<PeerReport> {
    let report = http.controller()?.list_peers(stale).await?;
    Ok(report)
}

async fn remove_peer(http: &HttpArgs, address: &str) -> Result<Removal> {
    let removal = http.controller()?.remove_peer(address).await?;
    Ok(removal)
}

pub async fn run(args: CommandArgs, out: &mut impl Write) -> Result<()> {
    let op = args.operation()?;
    debug!("operation: {op:?}");
    match op {
        Operation::ShowHelp => {
            write!(out, "{}", help()?)?;
        }
        Operation::ListPeers { stale } => {
            let report = list_peers(&args.http, stale)
                .await
                .context("Error getting peers")?;
            write!(out, "{report}")?;
        }
        Operation::RemovePeer { address } => {
            let removal = remove_peer(&args.http, &address)
                .await
                .context("Error removing peer")?;
            writeln!(out, "{removal}")?;
        }
    }
    Ok(())
}
