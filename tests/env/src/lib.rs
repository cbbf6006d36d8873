use anyhow::{Context, Result};
use raft_operator::{Configuration, Peer, RemovalRequest};
use std::collections::HashMap;
use std::sync::{Arc, Once};
use std::time::Duration;
use tracing::info;
use warp::http::StatusCode;
use warp::reply::WithStatus;
use warp::Filter;

static INIT: Once = Once::new();

pub fn peer(id: &str, address: &str, voter: bool) -> Peer {
    Peer {
        id: id.to_string(),
        address: address.to_string(),
        voter,
    }
}

/// A request received by one of the members.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub member: u8,
    pub method: &'static str,
    pub path: &'static str,
    pub query: HashMap<String, String>,
}

/// Cluster state as seen by the fake consensus engine.
struct Cluster {
    committed: Configuration,
    /// Local snapshots lagging behind `committed`.
    /// Members without an entry are up to date.
    local: HashMap<u8, Configuration>,
    /// ID of the leader peer.
    leader: Option<String>,
    requests: Vec<Request>,
}

type Shared = Arc<spin::Mutex<Cluster>>;

fn reply(status: StatusCode, body: impl Into<String>) -> WithStatus<String> {
    warp::reply::with_status(body.into(), status)
}

impl Cluster {
    fn record(
        &mut self,
        member: u8,
        method: &'static str,
        path: &'static str,
        query: &HashMap<String, String>,
    ) {
        self.requests.push(Request {
            member,
            method,
            path,
            query: query.clone(),
        });
    }

    fn get_configuration(&self, member: u8, query: &HashMap<String, String>) -> WithStatus<String> {
        let stale = query.get("stale").is_some_and(|x| x == "true");
        let config = if stale {
            self.local.get(&member).unwrap_or(&self.committed)
        } else if self.leader.is_some() {
            &self.committed
        } else {
            return reply(StatusCode::INTERNAL_SERVER_ERROR, "No cluster leader");
        };
        match serde_json::to_string(config) {
            Ok(body) => reply(StatusCode::OK, body),
            Err(e) => reply(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        }
    }

    fn remove_peer(&mut self, query: &HashMap<String, String>) -> WithStatus<String> {
        let req = match (query.get("id"), query.get("address")) {
            (Some(id), None) => RemovalRequest::by_id(id.as_str()),
            (None, Some(address)) => RemovalRequest::by_address(address.as_str()),
            _ => {
                return reply(
                    StatusCode::BAD_REQUEST,
                    "exactly one of id or address is required",
                )
            }
        };
        let Some(leader) = self.leader.clone() else {
            return reply(StatusCode::INTERNAL_SERVER_ERROR, "No cluster leader");
        };
        let Some(target) = self.committed.find(&req).cloned() else {
            return reply(StatusCode::NOT_FOUND, format!("peer ({req}) not found"));
        };
        if target.id == leader {
            return reply(
                StatusCode::CONFLICT,
                "cannot remove the current leader, transfer leadership first",
            );
        }

        self.committed.servers.retain(|p| p.id != target.id);
        self.committed.index += 1;
        for config in self.local.values_mut() {
            config.servers.retain(|p| p.id != target.id);
        }
        info!("removed peer {} (index={})", target.id, self.committed.index);
        reply(StatusCode::OK, "")
    }
}

fn routes(
    member: u8,
    cluster: Shared,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone + Send + Sync + 'static
{
    let with_cluster = warp::any().map(move || cluster.clone());

    let get_configuration = warp::path!("raft" / "configuration")
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and(with_cluster.clone())
        .map(move |query: HashMap<String, String>, cluster: Shared| {
            let mut cluster = cluster.lock();
            cluster.record(member, "GET", "/raft/configuration", &query);
            cluster.get_configuration(member, &query)
        });

    let remove_peer = warp::path!("raft" / "peer")
        .and(warp::put())
        .and(warp::query::<HashMap<String, String>>())
        .and(with_cluster)
        .map(move |query: HashMap<String, String>, cluster: Shared| {
            let mut cluster = cluster.lock();
            cluster.record(member, "PUT", "/raft/peer", &query);
            cluster.remove_peer(&query)
        });

    get_configuration.or(remove_peer)
}

/// A cluster member serving the membership endpoints on its own runtime.
struct Member {
    port: u16,
    abort_tx0: Option<tokio::sync::oneshot::Sender<()>>,
}
impl Member {
    fn new(id: u8, port: u16, cluster: Shared) -> Result<Self> {
        let tag = format!("M{port}>");
        let (tx, rx) = tokio::sync::oneshot::channel();

        let svc_task = async move {
            info!("add (id={id})");
            let (_, server) = warp::serve(routes(id, cluster)).bind_with_graceful_shutdown(
                ([127, 0, 0, 1], port),
                async move {
                    rx.await.ok();
                    info!("remove (id={id})");
                },
            );
            server.await;
        };

        std::thread::Builder::new()
            .name(tag.clone())
            .spawn(move || {
                let runtime = tokio::runtime::Builder::new_multi_thread()
                    .thread_name(tag)
                    .enable_all()
                    .build()
                    .unwrap();
                runtime.block_on(svc_task);
            })?;

        Ok(Self {
            port,
            abort_tx0: Some(tx),
        })
    }

    fn address(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }
}
impl Drop for Member {
    fn drop(&mut self) {
        if let Some(tx) = self.abort_tx0.take() {
            tx.send(()).ok();
        }
    }
}

/// A fake Raft cluster reachable through the membership endpoints of its members.
/// Tests control the leader and the configuration directly.
pub struct Env {
    members: HashMap<u8, Member>,
    cluster: Shared,
}
impl Env {
    pub fn new(with_logging: bool) -> Self {
        INIT.call_once(|| {
            if with_logging {
                let format = tracing_subscriber::fmt::format()
                    .with_target(false)
                    .with_thread_names(true)
                    .compact();
                tracing_subscriber::fmt()
                    .event_format(format)
                    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                    .try_init()
                    .ok();
            }
        });
        let cluster = Cluster {
            committed: Configuration::default(),
            local: HashMap::new(),
            leader: None,
            requests: vec![],
        };
        Self {
            members: HashMap::new(),
            cluster: Arc::new(spin::Mutex::new(cluster)),
        }
    }

    pub fn add_member(&mut self, id: u8) -> Result<()> {
        let port = port_check::free_local_ipv4_port().context("no free port")?;
        let member = Member::new(id, port, self.cluster.clone())?;
        self.members.insert(id, member);
        Ok(())
    }

    pub fn remove_member(&mut self, id: u8) {
        // Dropping the member stops its server.
        self.members.remove(&id);
    }

    pub fn address(&self, id: u8) -> String {
        self.members.get(&id).unwrap().address()
    }

    pub async fn check_connectivity(&self, id: u8) -> Result<()> {
        let port = self.members.get(&id).context("no such member")?.port;
        for _ in 0..50 {
            let reachable = port_check::is_port_reachable_with_timeout(
                format!("127.0.0.1:{port}"),
                Duration::from_millis(100),
            );
            if reachable {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("failed to connect to id={}", id);
    }

    /// Commit a new configuration. Every member catches up with it.
    pub fn set_configuration(&self, servers: Vec<Peer>) {
        let mut cluster = self.cluster.lock();
        cluster.committed = Configuration {
            servers,
            index: cluster.committed.index + 1,
        };
        cluster.local.clear();
    }

    /// Make member `id` hold an outdated snapshot.
    pub fn set_local_configuration(&self, id: u8, servers: Vec<Peer>) {
        let mut cluster = self.cluster.lock();
        let index = cluster.committed.index.saturating_sub(1);
        cluster.local.insert(id, Configuration { servers, index });
    }

    pub fn set_leader(&self, peer_id: Option<&str>) {
        self.cluster.lock().leader = peer_id.map(str::to_string);
    }

    pub fn committed(&self) -> Configuration {
        self.cluster.lock().committed.clone()
    }

    pub fn requests(&self) -> Vec<Request> {
        self.cluster.lock().requests.clone()
    }

    pub fn mutations(&self) -> Vec<Request> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == "PUT")
            .collect()
    }
}
