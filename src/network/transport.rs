use crate::config::Config;
use crate::error::{FactomError, Result};
use crate::network::jsonrpc::{Json2Request, Json2Response};
use log::debug;
use reqwest::blocking::Client;
use std::time::Duration;

/// Synchronous request/response channel to a JSON-RPC endpoint.
///
/// One call, one outcome. Implementations do not retry; a failed submission
/// must not be silently repeated.
pub trait Transport: Send + Sync {
    fn call(&self, request: &Json2Request) -> Result<Json2Response>;
}

/// JSON-RPC over HTTP POST
pub struct HttpTransport {
    client: Client,
    url: String,
}

impl HttpTransport {
    pub fn new(url: &str, timeout: Duration) -> Result<HttpTransport> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FactomError::Transport(format!("Failed to build HTTP client: {e}")))?;
        Ok(HttpTransport {
            client,
            url: url.to_string(),
        })
    }

    pub fn factomd(config: &Config) -> Result<HttpTransport> {
        HttpTransport::new(&config.factomd_server, config.request_timeout())
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for HttpTransport {
    fn call(&self, request: &Json2Request) -> Result<Json2Response> {
        debug!("POST {} {}", self.url, request.method);
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .map_err(|e| FactomError::Transport(format!("{} {}: {e}", self.url, request.method)))?;

        let status = response.status();
        response.json::<Json2Response>().map_err(|e| {
            FactomError::Transport(format!(
                "{} {}: unreadable response (HTTP {status}): {e}",
                self.url, request.method
            ))
        })
    }
}
