use crate::ports::DnsExchange;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use delve_dns_domain::{Address, Message, RecordType, ResolveError};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

type SharedExchange = Shared<BoxFuture<'static, Result<Message, ResolveError>>>;

/// Identity of a wire request: at most one is in flight per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub fqdn: String,
    pub record_type: RecordType,
    pub addr: Address,
}

impl RequestKey {
    pub fn new(fqdn: &str, record_type: RecordType, addr: &Address) -> Self {
        Self {
            fqdn: delve_dns_domain::name::normalize(fqdn),
            record_type,
            addr: addr.clone(),
        }
    }
}

/// Collapses concurrent identical requests into one exchange.
///
/// The first caller for a key starts the exchange and registers it in the
/// ledger; later callers attach to the same shared future and observe the
/// same result under the first caller's deadline. The exchange runs as a
/// spawned task that removes its own ledger entry when it settles, whether
/// or not anyone is still waiting, so the next logical call goes back to the
/// wire.
pub struct RequestDeduplicator {
    exchange: Arc<dyn DnsExchange>,
    ledger: Arc<DashMap<RequestKey, SharedExchange>>,
    timeout: Duration,
    request_timeout: Duration,
    recursion_desired: bool,
}

impl RequestDeduplicator {
    pub fn new(
        exchange: Arc<dyn DnsExchange>,
        timeout: Duration,
        request_timeout: Duration,
        recursion_desired: bool,
    ) -> Self {
        Self {
            exchange,
            ledger: Arc::new(DashMap::new()),
            timeout,
            request_timeout,
            recursion_desired,
        }
    }

    /// Query `fqdn`/`record_type` from `addr`, sharing any identical request
    /// already in flight.
    pub async fn query(
        &self,
        fqdn: &str,
        record_type: RecordType,
        addr: &Address,
    ) -> Result<Message, ResolveError> {
        let key = RequestKey::new(fqdn, record_type, addr);

        let shared = match self.ledger.entry(key.clone()) {
            Entry::Occupied(entry) => {
                debug!(
                    domain = %key.fqdn,
                    qtype = %key.record_type,
                    server = %key.addr,
                    "Joining in-flight request"
                );
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                let shared = self.start(key);
                entry.insert(shared.clone());
                shared
            }
        };

        shared.await
    }

    /// Number of wire requests currently in flight.
    pub fn in_flight(&self) -> usize {
        self.ledger.len()
    }

    pub fn is_in_flight(&self, fqdn: &str, record_type: RecordType, addr: &Address) -> bool {
        self.ledger
            .contains_key(&RequestKey::new(fqdn, record_type, addr))
    }

    fn start(&self, key: RequestKey) -> SharedExchange {
        let exchange = Arc::clone(&self.exchange);
        let ledger = Arc::clone(&self.ledger);
        let timeout = self.timeout;
        let request_timeout = self.request_timeout;
        let request = Message::query(&key.fqdn, key.record_type, self.recursion_desired);

        // The exchange runs as its own task so it settles and leaves the
        // ledger even when every waiter has gone away.
        let task = tokio::spawn(async move {
            debug!(
                domain = %key.fqdn,
                qtype = %key.record_type,
                server = %key.addr,
                "Sending request"
            );

            let result = match tokio::time::timeout(
                timeout,
                exchange.exchange(&request, &key.addr, request_timeout),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(ResolveError::Timeout),
            };

            ledger.remove(&key);
            result
        });

        async move {
            task.await.unwrap_or_else(|e| {
                Err(ResolveError::Transport(format!("exchange task failed: {}", e)))
            })
        }
        .boxed()
        .shared()
    }
}
