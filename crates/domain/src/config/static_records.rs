use crate::dns_record::{DnsRecord, RecordData, RecordType};
use serde::{Deserialize, Serialize};

/// Static record served from the cache.
///
/// Static records are seeded with a negative ttl: they never expire and
/// answers built from them are marked authoritative.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StaticRecord {
    /// Owner name (e.g. "nas.home.lan")
    pub name: String,

    /// Record type: "A", "AAAA", "CNAME", "NS", "PTR", "MX" or "TXT"
    pub record_type: String,

    /// Presentation-format value (e.g. "192.168.1.100", "10 mail.home.lan")
    pub value: String,
}

impl StaticRecord {
    /// Build the permanent cache record.
    ///
    /// # Examples
    /// ```
    /// use delve_dns_domain::config::StaticRecord;
    ///
    /// let record = StaticRecord {
    ///     name: "nas.home.lan".into(),
    ///     record_type: "A".into(),
    ///     value: "192.168.1.100".into(),
    /// };
    /// let rec = record.to_record().unwrap();
    /// assert_eq!(rec.name, "nas.home.lan");
    /// assert!(rec.is_static());
    /// ```
    pub fn to_record(&self) -> Result<DnsRecord, String> {
        crate::name::validate(&self.name)?;
        let record_type: RecordType = self.record_type.parse()?;
        let data = RecordData::parse(record_type, &self.value)?;
        Ok(DnsRecord::new(&self.name, record_type, -1, data))
    }
}
