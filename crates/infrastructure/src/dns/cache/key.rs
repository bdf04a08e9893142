use delve_dns_domain::{name, RecordType};

/// Cache key: normalized owner name and record type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub domain: String,
    pub record_type: RecordType,
}

impl CacheKey {
    #[inline]
    pub fn new(domain: &str, record_type: RecordType) -> Self {
        Self {
            domain: name::normalize(domain),
            record_type,
        }
    }
}
