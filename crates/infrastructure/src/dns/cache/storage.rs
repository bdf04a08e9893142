use super::{CacheKey, CacheMetrics, CachedRecord};
use dashmap::DashMap;
use delve_dns_application::ports::RecordCache;
use delve_dns_domain::{DnsRecord, Message, RecordType};
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use std::sync::atomic::Ordering as AtomicOrdering;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info};

type RecordSet = SmallVec<[CachedRecord; 2]>;

/// In-memory record cache.
///
/// Records are grouped by (name, type). Expired records are dropped lazily
/// on read or by [`MemoryCache::purge_expired`]. When the number of groups
/// reaches `max_entries`, a batch of the soonest-expiring dynamic groups is
/// evicted; groups holding a static record are never evicted.
pub struct MemoryCache {
    entries: DashMap<CacheKey, RecordSet, FxBuildHasher>,
    max_entries: usize,
    batch_eviction_percentage: f64,
    metrics: Arc<CacheMetrics>,
}

impl MemoryCache {
    pub fn new(max_entries: usize) -> Self {
        info!(max_entries = max_entries, "Initializing DNS cache");

        Self {
            entries: DashMap::with_capacity_and_hasher(
                max_entries.min(4096),
                FxBuildHasher::default(),
            ),
            max_entries: max_entries.max(1),
            batch_eviction_percentage: 0.1,
            metrics: Arc::new(CacheMetrics::default()),
        }
    }

    /// Number of (name, type) groups held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn metrics(&self) -> Arc<CacheMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Live records for `domain`/`record_type` with their remaining ttl.
    pub fn get(&self, domain: &str, record_type: RecordType) -> Vec<DnsRecord> {
        let key = CacheKey::new(domain, record_type);
        let now = Instant::now();
        let mut saw_expired = false;

        let records: Vec<DnsRecord> = match self.entries.get(&key) {
            Some(entry) => entry
                .iter()
                .filter(|cached| {
                    let expired = cached.is_expired(now);
                    saw_expired |= expired;
                    !expired
                })
                .map(|cached| cached.snapshot(now))
                .collect(),
            None => Vec::new(),
        };

        if saw_expired {
            self.remove_expired(&key, now);
        }

        if records.is_empty() {
            self.metrics.misses.fetch_add(1, AtomicOrdering::Relaxed);
        } else {
            self.metrics.hits.fetch_add(1, AtomicOrdering::Relaxed);
        }

        records
    }

    /// Store one record. A record with the same data replaces the stored one,
    /// refreshing its ttl; a dynamic copy never replaces a static record.
    pub fn insert(&self, record: DnsRecord) {
        if record.ttl == 0 {
            return;
        }

        let key = CacheKey::new(&record.name, record.record_type);
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.batch_evict();
        }

        let cached = CachedRecord::new(record, Instant::now());
        {
            let mut records = self.entries.entry(key.clone()).or_default();
            if !cached.is_static()
                && records
                    .iter()
                    .any(|existing| existing.is_static() && existing.record.data == cached.record.data)
            {
                return;
            }
            records.retain(|existing| existing.record.data != cached.record.data);
            records.push(cached);
        }

        self.metrics.insertions.fetch_add(1, AtomicOrdering::Relaxed);

        debug!(
            domain = %key.domain,
            record_type = %key.record_type,
            cache_size = self.entries.len(),
            "Inserted into cache"
        );
    }

    /// Drop every expired record. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        self.entries.retain(|_, records| {
            let before = records.len();
            records.retain(|cached| !cached.is_expired(now));
            removed += before - records.len();
            !records.is_empty()
        });

        if removed > 0 {
            self.metrics
                .expirations
                .fetch_add(removed as u64, AtomicOrdering::Relaxed);
            debug!(removed = removed, "Purged expired records");
        }

        removed
    }

    fn remove_expired(&self, key: &CacheKey, now: Instant) {
        if let Some(mut records) = self.entries.get_mut(key) {
            let before = records.len();
            records.retain(|cached| !cached.is_expired(now));
            self.metrics
                .expirations
                .fetch_add((before - records.len()) as u64, AtomicOrdering::Relaxed);
        }
        self.entries.remove_if(key, |_, records| records.is_empty());
    }

    fn batch_evict(&self) {
        let evict_count =
            ((self.max_entries as f64 * self.batch_eviction_percentage) as usize).max(1);

        let mut candidates: Vec<(CacheKey, Instant)> = self
            .entries
            .iter()
            .filter(|entry| !entry.value().iter().any(CachedRecord::is_static))
            .filter_map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter_map(|cached| cached.expires_at)
                    .min()
                    .map(|expires_at| (entry.key().clone(), expires_at))
            })
            .collect();
        candidates.sort_by_key(|(_, expires_at)| *expires_at);

        let mut evicted = 0u64;
        for (key, _) in candidates.into_iter().take(evict_count) {
            if self.entries.remove(&key).is_some() {
                evicted += 1;
            }
        }

        if evicted > 0 {
            self.metrics
                .evictions
                .fetch_add(evicted, AtomicOrdering::Relaxed);
            debug!(evicted = evicted, "Batch eviction");
        }
    }
}

impl RecordCache for MemoryCache {
    fn query(&self, name: &str, record_types: &[RecordType]) -> Vec<DnsRecord> {
        record_types
            .iter()
            .flat_map(|record_type| self.get(name, *record_type))
            .collect()
    }

    fn insert_message(&self, message: &Message) {
        for record in message.records() {
            self.insert(record.clone());
        }
    }

    fn insert_record(&self, record: DnsRecord) {
        self.insert(record);
    }
}
