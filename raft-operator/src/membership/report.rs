use super::*;

const HEADER: [&str; 3] = ["Address", "ID", "Voter"];
const SEPARATOR: &str = "  ";

/// Tabular view of a `Configuration`.
/// Rows follow the order of the configuration and are never re-sorted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerReport {
    pub peers: Vec<Peer>,
    /// The configuration may have been read from a non-leader server.
    pub stale: bool,
}

impl PeerReport {
    pub fn new(config: Configuration, stale: bool) -> Self {
        Self {
            peers: config.servers,
            stale,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    fn rows(&self) -> Vec<[String; 3]> {
        let mut out = vec![HEADER.map(str::to_string)];
        for peer in &self.peers {
            out.push([
                peer.address.clone(),
                peer.id.clone(),
                peer.voter.to_string(),
            ]);
        }
        out
    }
}

impl fmt::Display for PeerReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.rows();
        let mut widths = [0; 3];
        for row in &rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }
        for row in &rows {
            let mut line = String::new();
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    line.push_str(SEPARATOR);
                }
                line.push_str(&format!("{cell:<width$}", width = widths[i]));
            }
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}
