//! delve-dns application layer: ports, failover and deduplication services,
//! and the resolution use case.
pub mod ports;
pub mod services;
pub mod use_cases;

pub use use_cases::resolve::{Resolution, Resolver, ResolverSettings};
