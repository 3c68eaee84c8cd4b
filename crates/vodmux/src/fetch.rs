//! Network fetching with optional relay indirection.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::{FetchConfig, RelayConfig};
use crate::error::ConvertError;

/// Retrieves remote resources for the conversion flow.
///
/// When `use_proxy` is set the request goes through the configured relay
/// instead of hitting the target directly; relay failures surface as the
/// same [`ConvertError::Network`] kind as direct ones.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches the raw bytes at `url`.
    async fn fetch_bytes(&self, url: &Url, use_proxy: bool) -> Result<Bytes, ConvertError>;

    /// Fetches `url` and decodes the body as UTF-8 manifest text.
    async fn fetch_text(&self, url: &Url, use_proxy: bool) -> Result<String, ConvertError> {
        let bytes = self.fetch_bytes(url, use_proxy).await?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| ConvertError::malformed_manifest(format!("{url} is not valid UTF-8")))
    }
}

/// [`Fetcher`] backed by a shared `reqwest` client.
pub struct HttpFetcher {
    client: Client,
    relay: RelayConfig,
}

impl HttpFetcher {
    pub fn new(fetch: &FetchConfig, relay: RelayConfig) -> Result<Self, ConvertError> {
        let client = Client::builder()
            .connect_timeout(fetch.connect_timeout)
            .read_timeout(fetch.read_timeout)
            .user_agent(fetch.user_agent.clone())
            .build()
            .map_err(|e| {
                ConvertError::configuration(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self { client, relay })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_bytes(&self, url: &Url, use_proxy: bool) -> Result<Bytes, ConvertError> {
        let request_url = if use_proxy {
            relay_url(&self.relay.endpoint, url)?
        } else {
            url.clone()
        };

        let net = |source| ConvertError::network(url.as_str(), source);
        let response = self.client.get(request_url).send().await.map_err(net)?;
        let response = response.error_for_status().map_err(net)?;
        let bytes = response.bytes().await.map_err(net)?;
        debug!(url = %url, size = bytes.len(), proxied = use_proxy, "fetched resource");
        Ok(bytes)
    }
}

/// Relayed form of `target`: `<endpoint>?url=<url-encoded target>`.
fn relay_url(endpoint: &str, target: &Url) -> Result<Url, ConvertError> {
    let relayed = format!("{endpoint}?url={}", urlencoding::encode(target.as_str()));
    Url::parse(&relayed).map_err(|e| {
        ConvertError::configuration(format!("invalid relay endpoint `{endpoint}`: {e}"))
    })
}
