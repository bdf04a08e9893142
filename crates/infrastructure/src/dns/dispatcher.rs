use super::codec::MessageCodec;
use super::transport::{self, Transport};
use async_trait::async_trait;
use delve_dns_application::ports::DnsExchange;
use delve_dns_domain::{Address, Message, Protocol, ResolveError};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Floor for the budget handed to the TCP retry of a truncated answer
const MIN_TCP_RETRY_BUDGET: Duration = Duration::from_millis(500);

/// `DnsExchange` over the real network.
///
/// Stamps a fresh message id, picks the transport from the address protocol,
/// checks that the answer carries the same id and retries a truncated UDP
/// answer over TCP.
#[derive(Debug, Default, Clone)]
pub struct TransportDispatcher;

impl TransportDispatcher {
    pub fn new() -> Self {
        Self
    }

    async fn resolve_socket_addr(
        addr: &Address,
        timeout: Duration,
    ) -> Result<Option<SocketAddr>, ResolveError> {
        if addr.protocol == Protocol::Https {
            return Ok(None);
        }
        if let Some(socket_addr) = addr.socket_addr() {
            return Ok(Some(socket_addr));
        }

        let mut candidates = tokio::time::timeout(
            timeout,
            tokio::net::lookup_host((addr.host.as_str(), addr.port)),
        )
        .await
        .map_err(|_| ResolveError::Timeout)?
        .map_err(|e| ResolveError::Transport(format!("Failed to resolve {}: {}", addr.host, e)))?;

        candidates
            .next()
            .map(Some)
            .ok_or_else(|| ResolveError::Transport(format!("No address found for {}", addr.host)))
    }

    async fn send(
        transport: &Transport,
        request_bytes: &[u8],
        request_id: u16,
        timeout: Duration,
    ) -> Result<Message, ResolveError> {
        let response = transport.send(request_bytes, timeout).await?;
        let message = MessageCodec::decode(&response.bytes)?;

        if message.id != request_id {
            return Err(ResolveError::Protocol(format!(
                "Response id {} does not match request id {} ({})",
                message.id, request_id, response.protocol_used
            )));
        }

        Ok(message)
    }
}

#[async_trait]
impl DnsExchange for TransportDispatcher {
    async fn exchange(
        &self,
        request: &Message,
        addr: &Address,
        timeout: Duration,
    ) -> Result<Message, ResolveError> {
        let start = Instant::now();

        let mut request = request.clone();
        request.id = fastrand::u16(..);
        let request_bytes = MessageCodec::encode(&request)?;

        let socket_addr = Self::resolve_socket_addr(addr, timeout).await?;
        let dns_transport = transport::create_transport(addr, socket_addr)?;

        debug!(
            server = %addr,
            protocol = dns_transport.protocol_name(),
            id = request.id,
            "Sending DNS message"
        );

        let response = Self::send(&dns_transport, &request_bytes, request.id, timeout).await?;

        if response.flags.truncated {
            if let (Transport::Udp(_), Some(socket_addr)) = (&dns_transport, socket_addr) {
                debug!(
                    server = %addr,
                    "Response truncated (TC bit), retrying via TCP"
                );

                let tcp_transport =
                    Transport::Tcp(transport::tcp::TcpTransport::new(socket_addr));
                let remaining = tcp_retry_budget(timeout, start.elapsed());

                return Self::send(&tcp_transport, &request_bytes, request.id, remaining).await;
            }
        }

        Ok(response)
    }
}

/// What is left of `timeout` after `elapsed`, never less than
/// [`MIN_TCP_RETRY_BUDGET`].
fn tcp_retry_budget(timeout: Duration, elapsed: Duration) -> Duration {
    timeout.saturating_sub(elapsed).max(MIN_TCP_RETRY_BUDGET)
}
