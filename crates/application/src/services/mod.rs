pub mod nameserver_set;
pub mod request_deduplicator;

pub use nameserver_set::NameServerSet;
pub use request_deduplicator::{RequestDeduplicator, RequestKey};
