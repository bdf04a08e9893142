//! delve-dns domain layer
pub mod address;
pub mod config;
pub mod dns_record;
pub mod errors;
pub mod message;
pub mod name;

pub use address::{Address, Protocol};
pub use config::{CliOverrides, Config, ConfigError};
pub use dns_record::{DnsRecord, RecordData, RecordType, Soa};
pub use errors::ResolveError;
pub use message::{Flags, Message, Question, ResponseCode};
