use delve_dns_domain::config::ResolverConfig;
use delve_dns_domain::{name, Address, Protocol, ResolveError};
use std::time::Duration;

/// Parsed, ready-to-use resolver configuration.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub recursive: bool,
    pub timeout: Duration,
    pub request_timeout: Duration,
    pub nameservers: Vec<Address>,
    /// (zone, servers), most specific zone first
    pub forward_zones: Vec<(String, Vec<Address>)>,
    pub root_domains: Vec<String>,
    pub referral_protocol: Protocol,
    pub max_cname_hops: usize,
    pub max_referrals: usize,
}

impl ResolverSettings {
    pub fn from_config(config: &ResolverConfig) -> Result<Self, ResolveError> {
        let nameservers = parse_addresses(&config.nameservers)?;

        let mut forward_zones = config
            .forward_zones
            .iter()
            .map(|zone| Ok((name::normalize(&zone.domain), parse_addresses(&zone.servers)?)))
            .collect::<Result<Vec<_>, ResolveError>>()?;
        forward_zones.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Ok(Self {
            recursive: config.recursive,
            timeout: Duration::from_millis(config.timeout_ms),
            request_timeout: Duration::from_millis(config.request_timeout_ms),
            nameservers,
            forward_zones,
            root_domains: config.root_domains.iter().map(|d| name::normalize(d)).collect(),
            referral_protocol: config.referral_protocol.parse()?,
            max_cname_hops: config.max_cname_hops,
            max_referrals: config.max_referrals,
        })
    }

    /// Default server list for `domain`: the most specific forward zone, or
    /// the global defaults.
    pub fn nameservers_for(&self, domain: &str) -> &[Address] {
        self.forward_zones
            .iter()
            .find(|(zone, _)| name::is_subdomain(domain, zone))
            .map(|(_, servers)| servers.as_slice())
            .unwrap_or(&self.nameservers)
    }

    /// Whether `domain` belongs to a zone this resolver answers for.
    pub fn is_local(&self, domain: &str) -> bool {
        self.root_domains
            .iter()
            .any(|root| name::is_subdomain(domain, root))
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            recursive: true,
            timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(3),
            nameservers: Vec::new(),
            forward_zones: Vec::new(),
            root_domains: Vec::new(),
            referral_protocol: Protocol::Udp,
            max_cname_hops: 16,
            max_referrals: 32,
        }
    }
}

fn parse_addresses(servers: &[String]) -> Result<Vec<Address>, ResolveError> {
    servers.iter().map(|s| s.parse()).collect()
}
