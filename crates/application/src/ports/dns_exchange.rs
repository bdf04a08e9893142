use async_trait::async_trait;
use delve_dns_domain::{Address, Message, ResolveError};
use std::time::Duration;

/// Sends one request to one name server and returns the decoded response.
///
/// The implementation picks the wire protocol from `addr.protocol`.
/// Failures map to:
/// - `ResolveError::Timeout` when `timeout` elapses
/// - `ResolveError::Transport` for socket/HTTP errors
/// - `ResolveError::Protocol` for bytes that do not decode
#[async_trait]
pub trait DnsExchange: Send + Sync {
    async fn exchange(
        &self,
        request: &Message,
        addr: &Address,
        timeout: Duration,
    ) -> Result<Message, ResolveError>;
}
