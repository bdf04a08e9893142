use crate::dns_record::{DnsRecord, RecordType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result code carried in a message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResponseCode {
    #[default]
    NoError,
    FormErr,
    ServFail,
    NXDomain,
    NotImp,
    Refused,
    Other(u16),
}

impl ResponseCode {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => Self::NoError,
            1 => Self::FormErr,
            2 => Self::ServFail,
            3 => Self::NXDomain,
            4 => Self::NotImp,
            5 => Self::Refused,
            other => Self::Other(other),
        }
    }

    pub fn to_u16(&self) -> u16 {
        match self {
            Self::NoError => 0,
            Self::FormErr => 1,
            Self::ServFail => 2,
            Self::NXDomain => 3,
            Self::NotImp => 4,
            Self::Refused => 5,
            Self::Other(code) => *code,
        }
    }

    pub fn is_error(&self) -> bool {
        *self != Self::NoError
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoError => "NOERROR",
            Self::FormErr => "FORMERR",
            Self::ServFail => "SERVFAIL",
            Self::NXDomain => "NXDOMAIN",
            Self::NotImp => "NOTIMP",
            Self::Refused => "REFUSED",
            Self::Other(_) => "UNKNOWN",
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header flags the resolver reads or sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Flags {
    pub response: bool,
    pub authoritative: bool,
    pub truncated: bool,
    pub recursion_desired: bool,
    pub recursion_available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Question {
    pub name: String,
    pub record_type: RecordType,
}

impl Question {
    pub fn new(name: impl AsRef<str>, record_type: RecordType) -> Self {
        Self {
            name: crate::name::normalize(name.as_ref()),
            record_type,
        }
    }
}

/// One DNS exchange unit.
///
/// The resolution engine accumulates its final answer into one of these
/// across loop iterations; transport code never touches a message after
/// receipt.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Message {
    pub id: u16,
    pub flags: Flags,
    pub rcode: ResponseCode,
    pub questions: Vec<Question>,
    pub answers: Vec<DnsRecord>,
    pub authority: Vec<DnsRecord>,
    pub additional: Vec<DnsRecord>,
}

impl Message {
    /// Request with a single question.
    pub fn query(name: &str, record_type: RecordType, recursion_desired: bool) -> Self {
        Self {
            flags: Flags {
                recursion_desired,
                ..Flags::default()
            },
            questions: vec![Question::new(name, record_type)],
            ..Self::default()
        }
    }

    /// Empty response carrying the given question.
    pub fn response_to(name: &str, record_type: RecordType, recursion_available: bool) -> Self {
        Self {
            flags: Flags {
                response: true,
                recursion_available,
                ..Flags::default()
            },
            questions: vec![Question::new(name, record_type)],
            ..Self::default()
        }
    }

    pub fn question(&self) -> Option<&Question> {
        self.questions.first()
    }

    /// All records of the answer, authority and additional sections.
    pub fn records(&self) -> impl Iterator<Item = &DnsRecord> {
        self.answers
            .iter()
            .chain(self.authority.iter())
            .chain(self.additional.iter())
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut flags = Vec::new();
        if self.flags.response {
            flags.push("qr");
        }
        if self.flags.authoritative {
            flags.push("aa");
        }
        if self.flags.truncated {
            flags.push("tc");
        }
        if self.flags.recursion_desired {
            flags.push("rd");
        }
        if self.flags.recursion_available {
            flags.push("ra");
        }

        writeln!(
            f,
            ";; status: {}, id: {}, flags: {}",
            self.rcode,
            self.id,
            flags.join(" ")
        )?;

        writeln!(f, ";; QUESTION SECTION:")?;
        for question in &self.questions {
            writeln!(f, ";{}.\tIN\t{}", question.name, question.record_type)?;
        }

        for (title, records) in [
            ("ANSWER", &self.answers),
            ("AUTHORITY", &self.authority),
            ("ADDITIONAL", &self.additional),
        ] {
            if records.is_empty() {
                continue;
            }
            writeln!(f, "\n;; {} SECTION:", title)?;
            for record in records {
                writeln!(f, "{}", record)?;
            }
        }
        Ok(())
    }
}
