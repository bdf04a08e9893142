#[cfg(feature = "dns-over-https")]
pub mod https;
pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use bytes::Bytes;
use delve_dns_domain::{Address, Protocol, ResolveError};
use std::net::SocketAddr;
use std::time::Duration;

/// Result of a raw DNS transport operation
#[derive(Debug)]
pub struct TransportResponse {
    /// Raw DNS response bytes (wire format)
    pub bytes: Bytes,
    /// Which protocol was used
    pub protocol_used: &'static str,
}

/// Trait for sending raw DNS messages over the wire
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, ResolveError>;

    fn protocol_name(&self) -> &'static str;
}

/// Enum-dispatched transport.
///
/// Built per exchange from the target [`Address`]; static dispatch via match.
pub enum Transport {
    Udp(udp::UdpTransport),
    Tcp(tcp::TcpTransport),
    #[cfg(feature = "dns-over-https")]
    Https(https::HttpsTransport),
}

impl Transport {
    /// Send a DNS message via the appropriate protocol.
    pub async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, ResolveError> {
        match self {
            Self::Udp(t) => DnsTransport::send(t, message_bytes, timeout).await,
            Self::Tcp(t) => DnsTransport::send(t, message_bytes, timeout).await,
            #[cfg(feature = "dns-over-https")]
            Self::Https(t) => DnsTransport::send(t, message_bytes, timeout).await,
        }
    }

    /// Protocol name for logging.
    pub fn protocol_name(&self) -> &'static str {
        match self {
            Self::Udp(_) => "UDP",
            Self::Tcp(_) => "TCP",
            #[cfg(feature = "dns-over-https")]
            Self::Https(_) => "HTTPS",
        }
    }
}

/// Create the transport for `addr`.
///
/// `socket_addr` is the resolved endpoint for UDP and TCP; HTTPS resolves
/// its own host and ignores it.
pub fn create_transport(
    addr: &Address,
    socket_addr: Option<SocketAddr>,
) -> Result<Transport, ResolveError> {
    let resolved = || {
        socket_addr.ok_or_else(|| {
            ResolveError::InvalidAddress(format!("{} has no resolved socket address", addr))
        })
    };

    match addr.protocol {
        Protocol::Udp => Ok(Transport::Udp(udp::UdpTransport::new(resolved()?))),
        Protocol::Tcp => Ok(Transport::Tcp(tcp::TcpTransport::new(resolved()?))),

        #[cfg(feature = "dns-over-https")]
        Protocol::Https => Ok(Transport::Https(https::HttpsTransport::new(addr.url()))),

        #[cfg(not(feature = "dns-over-https"))]
        Protocol::Https => Err(ResolveError::InvalidAddress(format!(
            "HTTPS feature not enabled. Enable 'dns-over-https' feature to use: {}",
            addr
        ))),
    }
}
