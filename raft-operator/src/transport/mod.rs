use super::*;

use std::sync::Arc;

const MAX_TEXT_LEN: usize = 200;

mod http;
pub use http::{HttpTransport, TransportConfig};

/// Status and body of a reply from a cluster member.
#[derive(Clone, Debug)]
pub struct Response {
    pub status: u16,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The member could not find a leader to forward the request to.
    /// Agents answer with 503, or with 500 and a "No cluster leader" body.
    pub fn is_no_leader(&self) -> bool {
        match self.status {
            503 => true,
            500 => self.text().contains("No cluster leader"),
            _ => false,
        }
    }

    /// The body as one line of at most `MAX_TEXT_LEN` characters.
    pub fn text(&self) -> String {
        let body = String::from_utf8_lossy(&self.body);
        let line = body
            .split(|c: char| c.is_whitespace() || c.is_control())
            .filter(|word| !word.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if line.chars().count() <= MAX_TEXT_LEN {
            return line;
        }
        let mut out: String = line.chars().take(MAX_TEXT_LEN).collect();
        out.push_str("...");
        out
    }
}

/// `Transport` carries one request to one reachable cluster member.
/// Retries and leader discovery are not its business: the contacted member
/// forwards to the leader when it needs to.
#[async_trait::async_trait]
pub trait Transport: Sync + Send {
    /// Read `path`. If `allow_stale` is set, the member may answer from its local
    /// state even if it is not the leader or there is no leader at all.
    async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
        allow_stale: bool,
    ) -> std::result::Result<Response, TransportError>;

    /// Mutate `path`. Mutations always go through the leader.
    async fn put(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Bytes>,
    ) -> std::result::Result<Response, TransportError>;
}

#[async_trait::async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
        allow_stale: bool,
    ) -> std::result::Result<Response, TransportError> {
        (**self).get(path, query, allow_stale).await
    }

    async fn put(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Bytes>,
    ) -> std::result::Result<Response, TransportError> {
        (**self).put(path, query, body).await
    }
}
