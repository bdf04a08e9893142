use delve_dns_domain::DnsRecord;
use std::time::Duration;
use tokio::time::Instant;

/// A stored record with its absolute expiry.
#[derive(Debug, Clone)]
pub struct CachedRecord {
    pub record: DnsRecord,
    /// `None` for static records
    pub expires_at: Option<Instant>,
}

impl CachedRecord {
    pub fn new(record: DnsRecord, now: Instant) -> Self {
        let expires_at = if record.is_static() {
            None
        } else {
            Some(now + Duration::from_secs(record.ttl as u64))
        };
        Self { record, expires_at }
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.expires_at.is_none()
    }

    #[inline]
    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Copy of the record with the ttl it has left at `now`.
    pub fn snapshot(&self, now: Instant) -> DnsRecord {
        let mut record = self.record.clone();
        if let Some(at) = self.expires_at {
            record.ttl = at.saturating_duration_since(now).as_secs() as i64;
        }
        record
    }
}
