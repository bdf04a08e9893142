use delve_dns_domain::{DnsRecord, Message, RecordType};

/// Record store consulted before any remote query.
///
/// Only the query/insert contract matters to the resolver; storage and
/// eviction policy belong to the implementation.
pub trait RecordCache: Send + Sync {
    /// Live records owned by `name` whose type is one of `record_types`.
    ///
    /// Dynamic records come back with their remaining ttl; static records
    /// keep their negative ttl.
    fn query(&self, name: &str, record_types: &[RecordType]) -> Vec<DnsRecord>;

    /// Absorb every record of a response (answer, authority, additional).
    /// Records with a zero ttl are not stored.
    fn insert_message(&self, message: &Message);

    fn insert_record(&self, record: DnsRecord);
}
