//! Resolution use case.
//!
//! [`Resolver`] is the public entry point. Each call drives a [`query::Query`]
//! through the cache-then-remote loop:
//!
//! - **Cache**: answer, CNAME expansion, NS + glue, local zones
//! - **Remote**: one exchange with failover over a [`NameServerSet`]
//! - **Next hop**: terminal answer, CNAME redirect or NS delegation
//!
//! [`NameServerSet`]: crate::services::NameServerSet

mod query;
pub mod resolver;
pub mod settings;

pub use resolver::Resolver;
pub use settings::ResolverSettings;

use delve_dns_domain::Message;

/// Outcome of a resolve call.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Accumulated answer; a non-zero result code (e.g. NXDOMAIN) is a valid
    /// answer, not an error.
    pub message: Message,
    /// Whether the final step was satisfied from the cache
    pub from_cache: bool,
}
