use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use bytes::Bytes;
use delve_dns_domain::ResolveError;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// DNS over TCP transport (RFC 1035 §4.2.2): each message is preceded by a
/// two-byte big-endian length.
pub struct TcpTransport {
    server_addr: SocketAddr,
}

impl TcpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    async fn exchange(&self, message_bytes: &[u8]) -> Result<Bytes, ResolveError> {
        let length = u16::try_from(message_bytes.len()).map_err(|_| {
            ResolveError::Protocol(format!(
                "DNS message of {} bytes is too large for TCP",
                message_bytes.len()
            ))
        })?;

        let mut stream = TcpStream::connect(self.server_addr).await.map_err(|e| {
            ResolveError::Transport(format!("Failed to connect to {}: {}", self.server_addr, e))
        })?;

        let mut framed = Vec::with_capacity(message_bytes.len() + 2);
        framed.extend_from_slice(&length.to_be_bytes());
        framed.extend_from_slice(message_bytes);

        stream.write_all(&framed).await.map_err(|e| {
            ResolveError::Transport(format!(
                "Failed to send TCP query to {}: {}",
                self.server_addr, e
            ))
        })?;

        debug!(server = %self.server_addr, bytes_sent = framed.len(), "TCP query sent");

        let read_error = |e: std::io::Error| {
            ResolveError::Transport(format!(
                "Failed to read TCP response from {}: {}",
                self.server_addr, e
            ))
        };

        let mut length_buf = [0u8; 2];
        stream.read_exact(&mut length_buf).await.map_err(read_error)?;
        let response_len = u16::from_be_bytes(length_buf) as usize;

        let mut response = vec![0u8; response_len];
        stream.read_exact(&mut response).await.map_err(read_error)?;

        debug!(
            server = %self.server_addr,
            bytes_received = response_len,
            "TCP response received"
        );

        Ok(Bytes::from(response))
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, ResolveError> {
        let bytes = tokio::time::timeout(timeout, self.exchange(message_bytes))
            .await
            .map_err(|_| ResolveError::Timeout)??;

        Ok(TransportResponse {
            bytes,
            protocol_used: "TCP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TCP"
    }
}
