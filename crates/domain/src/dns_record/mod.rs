pub mod record;
pub mod record_type;

pub use record::{DnsRecord, RecordData, Soa};
pub use record_type::RecordType;
