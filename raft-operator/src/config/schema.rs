use super::*;

use std::collections::BTreeMap;
use std::net::IpAddr;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration of an agent process.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    pub node_name: Option<String>,
    pub datacenter: String,
    pub data_dir: Option<PathBuf>,
    /// Run as a Raft server rather than a client agent.
    pub server: bool,
    /// Elect this server as leader of a fresh cluster by itself.
    pub bootstrap: bool,
    /// Number of servers to wait for before bootstrapping the cluster.
    pub bootstrap_expect: Option<u32>,
    pub bind_addr: Option<String>,
    pub ports: Ports,
    pub retry_join: Vec<String>,
    pub log_level: String,
    pub raft_protocol: u8,
    #[serde(flatten)]
    unknown: BTreeMap<String, Value>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            node_name: None,
            datacenter: "dc1".to_string(),
            data_dir: None,
            server: false,
            bootstrap: false,
            bootstrap_expect: None,
            bind_addr: None,
            ports: Ports::default(),
            retry_join: vec![],
            log_level: "info".to_string(),
            raft_protocol: 3,
            unknown: BTreeMap::new(),
        }
    }
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Ports {
    pub http: u16,
    pub server: u16,
}

impl Default for Ports {
    fn default() -> Self {
        Self {
            http: 8500,
            server: 8300,
        }
    }
}

impl AgentConfig {
    pub(super) fn unknown_keys(&self) -> impl Iterator<Item = &str> {
        self.unknown.keys().map(String::as_str)
    }

    /// Rules spanning several keys. Each violation is reported with the key
    /// it is best located at.
    pub(super) fn check(&self) -> Vec<(&'static str, String)> {
        let mut out = vec![];

        let valid_datacenter = !self.datacenter.is_empty()
            && self
                .datacenter
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
        if !valid_datacenter {
            out.push((
                "datacenter",
                format!(
                    "{:?} must consist of lowercase alphanumerics, '-' and '_'",
                    self.datacenter
                ),
            ));
        }

        if self.node_name.as_deref() == Some("") {
            out.push(("node_name", "must not be empty".to_string()));
        }

        if self.server && self.data_dir.is_none() {
            out.push(("server", "data_dir is required to run as a server".to_string()));
        }

        if self.bootstrap && !self.server {
            out.push(("bootstrap", "requires server to be true".to_string()));
        }
        if let Some(n) = self.bootstrap_expect {
            if self.bootstrap {
                out.push((
                    "bootstrap_expect",
                    "bootstrap and bootstrap_expect are mutually exclusive".to_string(),
                ));
            }
            if n == 0 {
                out.push(("bootstrap_expect", "must be at least 1".to_string()));
            }
            if !self.server {
                out.push(("bootstrap_expect", "requires server to be true".to_string()));
            }
        }

        if let Some(addr) = &self.bind_addr {
            if addr.parse::<IpAddr>().is_err() {
                out.push(("bind_addr", format!("{addr:?} is not an IP address")));
            }
        }

        if self.ports.http == 0 {
            out.push(("ports.http", "must not be 0".to_string()));
        }
        if self.ports.server == 0 {
            out.push(("ports.server", "must not be 0".to_string()));
        }
        if self.ports.http != 0 && self.ports.http == self.ports.server {
            out.push((
                "ports",
                format!("http and server both use port {}", self.ports.http),
            ));
        }

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            out.push((
                "log_level",
                format!(
                    "{:?} is not one of {}",
                    self.log_level,
                    LOG_LEVELS.join(", ")
                ),
            ));
        }

        if !(2..=3).contains(&self.raft_protocol) {
            out.push((
                "raft_protocol",
                format!(
                    "unsupported version {} (supported: 2, 3)",
                    self.raft_protocol
                ),
            ));
        }

        out
    }
}
