use serde::{Deserialize, Serialize};

use super::static_records::StaticRecord;

/// IPv4 addresses of the root name servers (a through m).
pub const ROOT_HINTS: [&str; 13] = [
    "198.41.0.4",
    "170.247.170.2",
    "192.33.4.12",
    "199.7.91.13",
    "192.203.230.10",
    "192.5.5.241",
    "192.112.36.4",
    "198.97.190.53",
    "192.36.148.17",
    "192.58.128.30",
    "193.0.14.129",
    "199.7.83.42",
    "202.12.27.33",
];

/// Domain-specific default name servers
///
/// Queries for names under `domain` start from `servers` instead of the
/// global default set. Useful for:
/// - Local network domains (*.home.lan → router)
/// - Corporate domains (*.corp.local → corporate DNS)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ForwardZone {
    /// Zone to match (e.g. "home.lan"); matches the zone and all subdomains
    pub domain: String,

    /// Name server addresses (e.g. "udp://192.168.1.1", "tcp://10.0.0.53:5353")
    pub servers: Vec<String>,
}

impl ForwardZone {
    /// Check if a query domain falls under this zone
    ///
    /// Examples:
    /// - Zone "home.lan" matches: "home.lan", "nas.home.lan"
    /// - Zone "home.lan" does NOT match: "otherhome.lan", "google.com"
    pub fn matches_domain(&self, query_domain: &str) -> bool {
        crate::name::is_subdomain(query_domain, &self.domain)
    }
}

/// Resolution configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Walk delegations from the default servers (true) or return whatever
    /// the queried server reports (false, forwarding mode)
    #[serde(default = "default_true")]
    pub recursive: bool,

    /// Overall budget for one deduplicated wire request, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Budget handed to a single transport call, in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Default name servers; the root servers unless configured
    #[serde(default = "default_nameservers")]
    pub nameservers: Vec<String>,

    #[serde(default)]
    pub forward_zones: Vec<ForwardZone>,

    /// Zones this resolver answers for: names under them that are not in
    /// the cache resolve to NXDOMAIN without asking anyone
    #[serde(default)]
    pub root_domains: Vec<String>,

    /// Records cached permanently at startup
    #[serde(default)]
    pub static_records: Vec<StaticRecord>,

    /// Protocol used for name servers learned from referral glue
    #[serde(default = "default_referral_protocol")]
    pub referral_protocol: String,

    #[serde(default = "default_max_cname_hops")]
    pub max_cname_hops: usize,

    #[serde(default = "default_max_referrals")]
    pub max_referrals: usize,

    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            timeout_ms: default_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            nameservers: default_nameservers(),
            forward_zones: vec![],
            root_domains: vec![],
            static_records: vec![],
            referral_protocol: default_referral_protocol(),
            max_cname_hops: default_max_cname_hops(),
            max_referrals: default_max_referrals(),
            cache_max_entries: default_cache_max_entries(),
        }
    }
}

impl ResolverConfig {
    /// Most specific forward zone covering `domain`.
    pub fn forward_zone_for(&self, domain: &str) -> Option<&ForwardZone> {
        self.forward_zones
            .iter()
            .filter(|zone| zone.matches_domain(domain))
            .max_by_key(|zone| crate::name::normalize(&zone.domain).len())
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_request_timeout_ms() -> u64 {
    3000
}

fn default_nameservers() -> Vec<String> {
    ROOT_HINTS.iter().map(|ip| format!("udp://{}", ip)).collect()
}

fn default_referral_protocol() -> String {
    "udp".to_string()
}

fn default_max_cname_hops() -> usize {
    16
}

fn default_max_referrals() -> usize {
    32
}

fn default_cache_max_entries() -> usize {
    10_000
}
