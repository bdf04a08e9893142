use crate::dns::cache::MemoryCache;
use crate::dns::dispatcher::TransportDispatcher;
use delve_dns_application::ports::{DnsExchange, RecordCache};
use delve_dns_application::{Resolver, ResolverSettings};
use delve_dns_domain::config::{ResolverConfig, StaticRecord};
use delve_dns_domain::ConfigError;
use std::sync::Arc;
use tracing::info;

/// Wires a [`Resolver`] from configuration.
///
/// Defaults to the network [`TransportDispatcher`] and a [`MemoryCache`]
/// sized by `cache_max_entries`; both can be replaced.
pub struct ResolverBuilder {
    config: ResolverConfig,
    exchange: Option<Arc<dyn DnsExchange>>,
    cache: Option<Arc<dyn RecordCache>>,
}

impl ResolverBuilder {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            exchange: None,
            cache: None,
        }
    }

    pub fn with_exchange(mut self, exchange: Arc<dyn DnsExchange>) -> Self {
        self.exchange = Some(exchange);
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn RecordCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn build(self) -> Result<Resolver, ConfigError> {
        let settings = ResolverSettings::from_config(&self.config)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(MemoryCache::new(self.config.cache_max_entries)));
        seed_static_records(cache.as_ref(), &self.config.static_records)?;

        let exchange = self
            .exchange
            .unwrap_or_else(|| Arc::new(TransportDispatcher::new()));

        info!(
            recursive = settings.recursive,
            nameservers = settings.nameservers.len(),
            forward_zones = settings.forward_zones.len(),
            root_domains = settings.root_domains.len(),
            static_records = self.config.static_records.len(),
            "Resolver ready"
        );

        Ok(Resolver::new(settings, cache, exchange))
    }
}

fn seed_static_records(cache: &dyn RecordCache, records: &[StaticRecord]) -> Result<(), ConfigError> {
    for record in records {
        let parsed = record.to_record().map_err(|e| {
            ConfigError::Invalid(format!("static record '{}': {}", record.name, e))
        })?;
        cache.insert_record(parsed);
    }
    Ok(())
}
