use super::query::Query;
use super::settings::ResolverSettings;
use super::Resolution;
use crate::ports::{DnsExchange, RecordCache};
use crate::services::{NameServerSet, RequestDeduplicator};
use delve_dns_domain::{name, RecordType, ResolveError};
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Entry point of the resolution core.
///
/// Cheap to clone; clones share the cache and the request ledger. Every
/// `resolve*` call runs its own [`Query`] state machine.
#[derive(Clone)]
pub struct Resolver {
    inner: Arc<ResolverInner>,
}

struct ResolverInner {
    settings: ResolverSettings,
    cache: Arc<dyn RecordCache>,
    deduplicator: RequestDeduplicator,
}

impl Resolver {
    pub fn new(
        settings: ResolverSettings,
        cache: Arc<dyn RecordCache>,
        exchange: Arc<dyn DnsExchange>,
    ) -> Self {
        let deduplicator = RequestDeduplicator::new(
            exchange,
            settings.timeout,
            settings.request_timeout,
            !settings.recursive,
        );

        Self {
            inner: Arc::new(ResolverInner {
                settings,
                cache,
                deduplicator,
            }),
        }
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.inner.settings
    }

    pub fn cache(&self) -> &Arc<dyn RecordCache> {
        &self.inner.cache
    }

    pub fn deduplicator(&self) -> &RequestDeduplicator {
        &self.inner.deduplicator
    }

    /// Default candidate servers for `domain`.
    pub fn nameservers_for(&self, domain: &str) -> NameServerSet {
        NameServerSet::new(self.inner.settings.nameservers_for(domain).to_vec())
    }

    /// Resolve `fqdn`/`record_type` starting from the configured servers.
    pub async fn resolve(
        &self,
        fqdn: &str,
        record_type: RecordType,
    ) -> Result<Resolution, ResolveError> {
        let token = CancellationToken::new();
        self.resolve_at_depth(fqdn, record_type, None, &token, 0)
            .await
    }

    /// Resolve with an explicit server set for the first remote step.
    pub async fn resolve_via(
        &self,
        fqdn: &str,
        record_type: RecordType,
        nameservers: NameServerSet,
    ) -> Result<Resolution, ResolveError> {
        let token = CancellationToken::new();
        self.resolve_at_depth(fqdn, record_type, Some(nameservers), &token, 0)
            .await
    }

    /// Resolve until done or until `cancel` fires.
    ///
    /// Returns `Ok(None)` when the query was cancelled; cancellation never
    /// surfaces as an error. Cancelling does not abort a wire request that
    /// other queries are still waiting on.
    pub async fn resolve_cancellable(
        &self,
        fqdn: &str,
        record_type: RecordType,
        nameservers: Option<NameServerSet>,
        cancel: &CancellationToken,
    ) -> Result<Option<Resolution>, ResolveError> {
        match self
            .resolve_at_depth(fqdn, record_type, nameservers, cancel, 0)
            .await
        {
            Ok(resolution) => Ok(Some(resolution)),
            Err(ResolveError::Cancelled) => {
                debug!(domain = %fqdn, qtype = %record_type, "Query cancelled");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Shared entry for top-level calls and CNAME targets found in the cache.
    /// `depth` counts the CNAME hops that led here.
    pub(crate) fn resolve_at_depth<'a>(
        &'a self,
        fqdn: &'a str,
        record_type: RecordType,
        nameservers: Option<NameServerSet>,
        cancel: &'a CancellationToken,
        depth: usize,
    ) -> BoxFuture<'a, Result<Resolution, ResolveError>> {
        Box::pin(async move {
            name::validate(fqdn).map_err(ResolveError::InvalidDomainName)?;

            let max_hops = self.inner.settings.max_cname_hops;
            if depth > max_hops {
                return Err(ResolveError::CnameChainTooLong(max_hops));
            }

            Query::new(self, fqdn, record_type, cancel, depth)
                .run(nameservers)
                .await
        })
    }
}
