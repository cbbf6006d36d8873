use super::*;

use reqwest::Url;
use std::time::Duration;

const TOKEN_HEADER: &str = "X-Raft-Token";

/// Connection settings of `HttpTransport`.
#[derive(Clone, Debug)]
pub struct TransportConfig {
    /// `host:port` or URL of the member to contact.
    pub address: String,
    /// ACL token sent with every request.
    pub token: Option<String>,
    pub connect_timeout: Duration,
    /// Deadline of a whole request. Unbounded if `None`.
    pub timeout: Option<Duration>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            address: "http://127.0.0.1:8500".to_string(),
            token: None,
            connect_timeout: Duration::from_secs(5),
            timeout: None,
        }
    }
}

/// `Transport` over the HTTP API of a cluster member.
#[derive(Clone)]
pub struct HttpTransport {
    base_url: Url,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: TransportConfig) -> std::result::Result<Self, TransportError> {
        let base_url = parse_address(&config.address)?;
        let mut builder = reqwest::Client::builder().connect_timeout(config.connect_timeout);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            base_url,
            token: config.token,
            client: builder.build()?,
        })
    }

    fn url(&self, path: &str) -> std::result::Result<Url, TransportError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|_| TransportError::InvalidAddress(format!("{}{path}", self.base_url)))
    }

    async fn send(
        &self,
        req: reqwest::RequestBuilder,
    ) -> std::result::Result<Response, TransportError> {
        let req = match &self.token {
            Some(token) => req.header(TOKEN_HEADER, token),
            None => req,
        };
        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?;
        debug!("response (status={status}, len={})", body.len());
        Ok(Response { status, body })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
        allow_stale: bool,
    ) -> std::result::Result<Response, TransportError> {
        let url = self.url(path)?;
        let stale = if allow_stale { "true" } else { "false" };
        debug!("GET {url} (stale={stale})");
        let req = self
            .client
            .get(url)
            .query(query)
            .query(&[("stale", stale)]);
        self.send(req).await
    }

    async fn put(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Bytes>,
    ) -> std::result::Result<Response, TransportError> {
        let url = self.url(path)?;
        debug!("PUT {url} {query:?}");
        let mut req = self.client.put(url).query(query);
        if let Some(body) = body {
            req = req.body(body);
        }
        self.send(req).await
    }
}

/// Accepts `host:port` as well as full `http://` and `https://` URLs.
/// A path in the URL is kept as the prefix of every request path.
fn parse_address(address: &str) -> std::result::Result<Url, TransportError> {
    let address = address.trim();
    let invalid = || TransportError::InvalidAddress(address.to_string());
    let mut url = if address.contains("://") {
        Url::parse(address)
    } else {
        Url::parse(&format!("http://{address}"))
    }
    .map_err(|_| invalid())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }
    Ok(url)
}
