//! Transport seam for XML-RPC calls.
//!
//! `RpcTransport` is the only thing the client needs from the network;
//! `HttpTransport` is the reqwest implementation that POSTs `text/xml`
//! to the configured `/rpc/api` endpoint.

use crate::error::{SpacewalkError, SpacewalkResult};
use crate::types::ClientConfig;
use crate::xmlrpc::{decode_response, encode_call, Value, XmlRpcError, XmlRpcResult};

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Performs one remote procedure call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn call(&self, method: &str, params: Vec<Value>) -> XmlRpcResult<Value>;
}

/// XML-RPC over HTTP(S).
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Build a transport for the configured endpoint (no request is sent).
    pub fn new(config: &ClientConfig) -> SpacewalkResult<Self> {
        let endpoint = config.endpoint()?;

        let mut builder = Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("swquery/", env!("CARGO_PKG_VERSION")));
        if config.no_proxy {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| SpacewalkError::auth(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn call(&self, method: &str, params: Vec<Value>) -> XmlRpcResult<Value> {
        // Never log params: auth.login carries the password.
        log::debug!("XML-RPC {method} -> {}", self.endpoint);
        let body = encode_call(method, &params)?;

        let resp = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "text/xml")
            .header(ACCEPT, "text/xml")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| {
            XmlRpcError::Transport(format!("Failed to read response body: {e}"))
        })?;

        if !status.is_success() {
            return Err(XmlRpcError::Http {
                status: status.as_u16(),
                body: text.chars().take(500).collect(),
            });
        }

        decode_response(&text)
    }
}
