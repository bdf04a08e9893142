pub mod dns_exchange;
pub mod record_cache;

pub use dns_exchange::DnsExchange;
pub use record_cache::RecordCache;
