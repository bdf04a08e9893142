use crate::errors::ResolveError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

/// Wire protocol used to reach a name server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Connectionless (plain DNS over UDP)
    Udp,
    /// Connection-oriented (DNS over TCP, length-prefixed)
    Tcp,
    /// Encrypted transport (DNS-over-HTTPS, RFC 8484)
    Https,
}

impl Protocol {
    pub fn default_port(&self) -> u16 {
        match self {
            Self::Udp | Self::Tcp => 53,
            Self::Https => 443,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Udp => "udp",
            Self::Tcp => "tcp",
            Self::Https => "https",
        }
    }
}

impl FromStr for Protocol {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "udp" => Ok(Self::Udp),
            "tcp" => Ok(Self::Tcp),
            "https" | "doh" => Ok(Self::Https),
            other => Err(ResolveError::InvalidAddress(format!(
                "unknown protocol '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name server endpoint. Compared by value, so two requests to the same
/// endpoint share a deduplication key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub protocol: Protocol,
    pub host: String,
    pub port: u16,
    /// Request path, only used by DNS-over-HTTPS
    pub path: Option<String>,
}

impl Address {
    pub fn new(protocol: Protocol, host: impl Into<String>, port: u16) -> Self {
        Self {
            protocol,
            host: host.into(),
            port,
            path: None,
        }
    }

    /// Plain UDP address on the given port.
    pub fn udp(ip: IpAddr, port: u16) -> Self {
        Self::new(Protocol::Udp, ip.to_string(), port)
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Socket address when the host is an IP literal.
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        self.host
            .parse::<IpAddr>()
            .ok()
            .map(|ip| SocketAddr::new(ip, self.port))
    }

    /// URL for DNS-over-HTTPS requests.
    pub fn url(&self) -> String {
        let path = self.path.as_deref().unwrap_or("/dns-query");
        format!("https://{}:{}{}", self.host_for_url(), self.port, path)
    }

    fn host_for_url(&self) -> String {
        match self.host.parse::<IpAddr>() {
            Ok(IpAddr::V6(v6)) => format!("[{}]", v6),
            _ => self.host.clone(),
        }
    }

    /// Parse `host[:port]`, accepting bracketed IPv6 literals.
    fn split_host_port(rest: &str) -> Result<(String, Option<u16>), ResolveError> {
        let invalid = || ResolveError::InvalidAddress(rest.to_string());

        if let Some(stripped) = rest.strip_prefix('[') {
            let (host, after) = stripped.split_once(']').ok_or_else(invalid)?;
            let port = match after.strip_prefix(':') {
                Some(p) => Some(p.parse::<u16>().map_err(|_| invalid())?),
                None if after.is_empty() => None,
                None => return Err(invalid()),
            };
            return Ok((host.to_string(), port));
        }

        // A bare IPv6 literal carries colons but no port.
        if rest.parse::<IpAddr>().is_ok() {
            return Ok((rest.to_string(), None));
        }

        match rest.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| invalid())?;
                Ok((host.to_string(), Some(port)))
            }
            None => Ok((rest.to_string(), None)),
        }
    }
}

impl FromStr for Address {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (protocol, rest) = match s.split_once("://") {
            Some((scheme, rest)) => (scheme.parse::<Protocol>()?, rest),
            None => (Protocol::Udp, s),
        };

        let (authority, path) = match rest.find('/') {
            Some(idx) => (&rest[..idx], Some(&rest[idx..])),
            None => (rest, None),
        };

        let (host, port) = Self::split_host_port(authority)?;
        if host.is_empty() {
            return Err(ResolveError::InvalidAddress(s.to_string()));
        }
        if protocol != Protocol::Https && path.is_some() {
            return Err(ResolveError::InvalidAddress(format!(
                "path is only allowed for https: {}",
                s
            )));
        }

        let mut address = Self::new(protocol, host, port.unwrap_or(protocol.default_port()));
        if let Some(path) = path {
            address = address.with_path(path);
        }
        Ok(address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.protocol {
            Protocol::Https => f.write_str(&self.url()),
            protocol => write!(f, "{}://{}:{}", protocol, self.host_for_url(), self.port),
        }
    }
}
