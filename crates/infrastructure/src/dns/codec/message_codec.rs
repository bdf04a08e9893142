//! Wire codec
//!
//! Converts between the domain [`Message`] and RFC 1035 wire bytes using
//! `hickory-proto`. Record data without a dedicated domain variant travels as
//! opaque bytes.

use super::record_type_map::RecordTypeMapper;
use delve_dns_domain::{
    name, DnsRecord, Flags, Message, Question, RecordData, ResolveError, ResponseCode, Soa,
};
use hickory_proto::op::{
    Message as WireMessage, MessageType, OpCode, Query, ResponseCode as WireResponseCode,
};
use hickory_proto::rr::rdata::{A, AAAA, CNAME, MX, NS, NULL, PTR, SOA, TXT};
use hickory_proto::rr::{Name, RData, Record};
use hickory_proto::serialize::binary::BinEncodable;

pub struct MessageCodec;

impl MessageCodec {
    /// Serialize a message to wire format.
    pub fn encode(message: &Message) -> Result<Vec<u8>, ResolveError> {
        let message_type = if message.flags.response {
            MessageType::Response
        } else {
            MessageType::Query
        };
        let rcode: WireResponseCode = message.rcode.to_u16().into();

        let mut wire = WireMessage::new();
        wire.set_id(message.id)
            .set_message_type(message_type)
            .set_op_code(OpCode::Query)
            .set_authoritative(message.flags.authoritative)
            .set_truncated(message.flags.truncated)
            .set_recursion_desired(message.flags.recursion_desired)
            .set_recursion_available(message.flags.recursion_available)
            .set_response_code(rcode);

        for question in &message.questions {
            wire.add_query(Query::query(
                to_wire_name(&question.name)?,
                RecordTypeMapper::to_hickory(question.record_type),
            ));
        }
        for record in &message.answers {
            wire.add_answer(to_wire_record(record)?);
        }
        for record in &message.authority {
            wire.add_name_server(to_wire_record(record)?);
        }
        for record in &message.additional {
            wire.add_additional(to_wire_record(record)?);
        }

        wire.to_vec()
            .map_err(|e| ResolveError::Protocol(format!("Failed to serialize DNS message: {}", e)))
    }

    /// Parse wire bytes into a message.
    pub fn decode(bytes: &[u8]) -> Result<Message, ResolveError> {
        let wire = WireMessage::from_vec(bytes)
            .map_err(|e| ResolveError::Protocol(format!("Failed to parse DNS message: {}", e)))?;

        Ok(Message {
            id: wire.id(),
            flags: Flags {
                response: wire.message_type() == MessageType::Response,
                authoritative: wire.authoritative(),
                truncated: wire.truncated(),
                recursion_desired: wire.recursion_desired(),
                recursion_available: wire.recursion_available(),
            },
            rcode: ResponseCode::from_u16(u16::from(wire.response_code())),
            questions: wire
                .queries()
                .iter()
                .map(|q| {
                    Question::new(
                        from_wire_name(q.name()),
                        RecordTypeMapper::from_hickory(q.query_type()),
                    )
                })
                .collect(),
            answers: wire.answers().iter().map(from_wire_record).collect(),
            authority: wire.name_servers().iter().map(from_wire_record).collect(),
            additional: wire.additionals().iter().map(from_wire_record).collect(),
        })
    }
}

fn to_wire_name(domain: &str) -> Result<Name, ResolveError> {
    let domain = name::normalize(domain);
    if domain.is_empty() {
        return Ok(Name::root());
    }
    Name::from_ascii(format!("{}.", domain))
        .map_err(|e| ResolveError::InvalidDomainName(format!("'{}': {}", domain, e)))
}

fn from_wire_name(wire: &Name) -> String {
    name::normalize(&wire.to_ascii())
}

fn to_wire_record(record: &DnsRecord) -> Result<Record, ResolveError> {
    let rdata = match &record.data {
        RecordData::A(ip) => RData::A(A::from(*ip)),
        RecordData::Aaaa(ip) => RData::AAAA(AAAA::from(*ip)),
        RecordData::Cname(host) => RData::CNAME(CNAME(to_wire_name(host)?)),
        RecordData::Ns(host) => RData::NS(NS(to_wire_name(host)?)),
        RecordData::Ptr(host) => RData::PTR(PTR(to_wire_name(host)?)),
        RecordData::Mx {
            preference,
            exchange,
        } => RData::MX(MX::new(*preference, to_wire_name(exchange)?)),
        RecordData::Txt(parts) => RData::TXT(TXT::new(parts.clone())),
        RecordData::Soa(soa) => RData::SOA(SOA::new(
            to_wire_name(&soa.mname)?,
            to_wire_name(&soa.rname)?,
            soa.serial,
            soa.refresh,
            soa.retry,
            soa.expire,
            soa.minimum,
        )),
        RecordData::Other(bytes) => RData::Unknown {
            code: RecordTypeMapper::to_hickory(record.record_type),
            rdata: if bytes.is_empty() {
                NULL::new()
            } else {
                NULL::with(bytes.clone())
            },
        },
    };

    // Static records carry a negative ttl; on the wire they read as 0.
    let ttl = record.ttl.clamp(0, i64::from(u32::MAX)) as u32;
    Ok(Record::from_rdata(to_wire_name(&record.name)?, ttl, rdata))
}

fn from_wire_record(record: &Record) -> DnsRecord {
    let data = match record.data() {
        RData::A(a) => RecordData::A(a.0),
        RData::AAAA(aaaa) => RecordData::Aaaa(aaaa.0),
        RData::CNAME(cname) => RecordData::Cname(from_wire_name(&cname.0)),
        RData::NS(ns) => RecordData::Ns(from_wire_name(&ns.0)),
        RData::PTR(ptr) => RecordData::Ptr(from_wire_name(&ptr.0)),
        RData::MX(mx) => RecordData::Mx {
            preference: mx.preference(),
            exchange: from_wire_name(mx.exchange()),
        },
        RData::TXT(txt) => RecordData::Txt(
            txt.txt_data()
                .iter()
                .map(|part| String::from_utf8_lossy(part).into_owned())
                .collect(),
        ),
        RData::SOA(soa) => RecordData::Soa(Soa {
            mname: from_wire_name(soa.mname()),
            rname: from_wire_name(soa.rname()),
            serial: soa.serial(),
            refresh: soa.refresh(),
            retry: soa.retry(),
            expire: soa.expire(),
            minimum: soa.minimum(),
        }),
        other => RecordData::Other(other.to_bytes().unwrap_or_default()),
    };

    DnsRecord::new(
        from_wire_name(record.name()),
        RecordTypeMapper::from_hickory(record.record_type()),
        i64::from(record.ttl()),
        data,
    )
}
