use super::RecordType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Start-of-authority fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Soa {
    /// Primary name server of the zone
    pub mname: String,
    pub rname: String,
    pub serial: u32,
    pub refresh: i32,
    pub retry: i32,
    pub expire: i32,
    pub minimum: u32,
}

/// Record payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordData {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Cname(String),
    Ns(String),
    Ptr(String),
    Mx { preference: u16, exchange: String },
    Txt(Vec<String>),
    Soa(Soa),
    /// Rdata of a type the resolver does not interpret
    Other(Vec<u8>),
}

impl RecordData {
    /// Parse presentation-format data for the given type.
    ///
    /// Used for static records from configuration; only the types that make
    /// sense there are accepted.
    pub fn parse(record_type: RecordType, value: &str) -> Result<Self, String> {
        let value = value.trim();
        match record_type {
            RecordType::A => value
                .parse()
                .map(RecordData::A)
                .map_err(|e| format!("Invalid IPv4 address '{}': {}", value, e)),
            RecordType::AAAA => value
                .parse()
                .map(RecordData::Aaaa)
                .map_err(|e| format!("Invalid IPv6 address '{}': {}", value, e)),
            RecordType::CNAME => Ok(RecordData::Cname(crate::name::normalize(value))),
            RecordType::NS => Ok(RecordData::Ns(crate::name::normalize(value))),
            RecordType::PTR => Ok(RecordData::Ptr(crate::name::normalize(value))),
            RecordType::TXT => Ok(RecordData::Txt(vec![value.to_string()])),
            RecordType::MX => {
                let (preference, exchange) = value
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| format!("MX value must be '<preference> <host>': {}", value))?;
                let preference = preference
                    .parse()
                    .map_err(|e| format!("Invalid MX preference '{}': {}", preference, e))?;
                Ok(RecordData::Mx {
                    preference,
                    exchange: crate::name::normalize(exchange),
                })
            }
            other => Err(format!("Static records of type {} are not supported", other)),
        }
    }
}

/// DNS resource record.
///
/// A negative `ttl` marks a locally synthesized entry: it never expires and is
/// treated as authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Owner name (normalized)
    pub name: String,
    pub record_type: RecordType,
    /// Time to live in seconds
    pub ttl: i64,
    pub data: RecordData,
}

impl DnsRecord {
    pub fn new(name: impl AsRef<str>, record_type: RecordType, ttl: i64, data: RecordData) -> Self {
        Self {
            name: crate::name::normalize(name.as_ref()),
            record_type,
            ttl,
            data,
        }
    }

    pub fn a(name: impl AsRef<str>, ip: Ipv4Addr, ttl: i64) -> Self {
        Self::new(name, RecordType::A, ttl, RecordData::A(ip))
    }

    pub fn cname(name: impl AsRef<str>, target: &str, ttl: i64) -> Self {
        Self::new(
            name,
            RecordType::CNAME,
            ttl,
            RecordData::Cname(crate::name::normalize(target)),
        )
    }

    pub fn ns(name: impl AsRef<str>, host: &str, ttl: i64) -> Self {
        Self::new(
            name,
            RecordType::NS,
            ttl,
            RecordData::Ns(crate::name::normalize(host)),
        )
    }

    /// Whether the record is static (never expires).
    pub fn is_static(&self) -> bool {
        self.ttl < 0
    }

    /// Copy of this record owned by `name`.
    pub fn rehome(&self, name: &str) -> Self {
        Self {
            name: crate::name::normalize(name),
            ..self.clone()
        }
    }

    /// Host name carried in the rdata, if any.
    pub fn target(&self) -> Option<&str> {
        match &self.data {
            RecordData::Cname(host) | RecordData::Ns(host) | RecordData::Ptr(host) => Some(host),
            RecordData::Mx { exchange, .. } => Some(exchange),
            _ => None,
        }
    }
}

impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordData::A(ip) => write!(f, "{}", ip),
            RecordData::Aaaa(ip) => write!(f, "{}", ip),
            RecordData::Cname(host) | RecordData::Ns(host) | RecordData::Ptr(host) => {
                write!(f, "{}.", host)
            }
            RecordData::Mx {
                preference,
                exchange,
            } => write!(f, "{} {}.", preference, exchange),
            RecordData::Txt(parts) => {
                let quoted: Vec<String> = parts.iter().map(|p| format!("{:?}", p)).collect();
                f.write_str(&quoted.join(" "))
            }
            RecordData::Soa(soa) => write!(
                f,
                "{}. {}. {} {} {} {} {}",
                soa.mname, soa.rname, soa.serial, soa.refresh, soa.retry, soa.expire, soa.minimum
            ),
            RecordData::Other(bytes) => write!(f, "\\# {}", bytes.len()),
        }
    }
}

impl fmt::Display for DnsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.\t{}\tIN\t{}\t{}",
            self.name, self.ttl, self.record_type, self.data
        )
    }
}
