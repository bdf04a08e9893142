use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use delve_dns_domain::ResolveError;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

/// Shared HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .use_rustls_tls()
        .pool_max_idle_per_host(4)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

/// Media type of DNS-over-HTTPS bodies (RFC 8484 §6)
const DNS_MESSAGE_CONTENT_TYPE: &str = "application/dns-message";

/// DNS-over-HTTPS transport (RFC 8484)
pub struct HttpsTransport {
    url: String,
}

impl HttpsTransport {
    pub fn new(url: String) -> Self {
        Self { url }
    }
}

#[async_trait]
impl DnsTransport for HttpsTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, ResolveError> {
        debug!(url = %self.url, message_len = message_bytes.len(), "Sending DoH query");

        let exchange = async {
            let response = SHARED_CLIENT
                .post(&self.url)
                .header("Content-Type", DNS_MESSAGE_CONTENT_TYPE)
                .header("Accept", DNS_MESSAGE_CONTENT_TYPE)
                .body(message_bytes.to_vec())
                .send()
                .await
                .map_err(|e| {
                    ResolveError::Transport(format!("DoH request to {} failed: {}", self.url, e))
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(ResolveError::Transport(format!(
                    "DoH server {} returned HTTP {}: {}",
                    self.url,
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                )));
            }

            response.bytes().await.map_err(|e| {
                ResolveError::Transport(format!(
                    "Failed to read DoH response from {}: {}",
                    self.url, e
                ))
            })
        };

        let bytes = tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| ResolveError::Timeout)??;

        debug!(url = %self.url, response_len = bytes.len(), "DoH response received");

        Ok(TransportResponse {
            bytes,
            protocol_used: "HTTPS",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "HTTPS"
    }
}
