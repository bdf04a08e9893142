#![allow(dead_code)]

use async_trait::async_trait;
use delve_dns_application::ports::{DnsExchange, RecordCache};
use delve_dns_domain::{
    name, Address, DnsRecord, Message, Protocol, RecordData, RecordType, ResolveError,
    ResponseCode, Soa,
};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn udp(host: &str) -> Address {
    Address::new(Protocol::Udp, host, 53)
}

// ============================================================================
// Scripted DnsExchange
// ============================================================================

#[derive(Clone)]
struct Script {
    result: Result<Message, ResolveError>,
    delay: Duration,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub addr: Address,
    pub request: Message,
}

/// Exchange that answers from a script keyed by (server, name, type).
///
/// The response gets the request id and, when the scripted message has no
/// question, the request question. Unscripted requests fail with a transport
/// error.
#[derive(Default)]
pub struct FakeExchange {
    scripts: Mutex<HashMap<(Address, String, RecordType), Script>>,
    calls: Mutex<Vec<Call>>,
    started: AtomicUsize,
}

impl FakeExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, addr: &Address, name: &str, record_type: RecordType, message: Message) {
        self.script(addr, name, record_type, Ok(message), Duration::ZERO);
    }

    pub fn respond_after(
        &self,
        addr: &Address,
        name: &str,
        record_type: RecordType,
        delay: Duration,
        message: Message,
    ) {
        self.script(addr, name, record_type, Ok(message), delay);
    }

    pub fn fail(&self, addr: &Address, name: &str, record_type: RecordType, error: ResolveError) {
        self.script(addr, name, record_type, Err(error), Duration::ZERO);
    }

    fn script(
        &self,
        addr: &Address,
        name: &str,
        record_type: RecordType,
        result: Result<Message, ResolveError>,
        delay: Duration,
    ) {
        self.scripts.lock().unwrap().insert(
            (addr.clone(), name::normalize(name), record_type),
            Script { result, delay },
        );
    }

    /// Number of exchanges started.
    pub fn call_count(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Servers contacted, in order.
    pub fn servers(&self) -> Vec<String> {
        self.calls().iter().map(|c| c.addr.host.clone()).collect()
    }
}

#[async_trait]
impl DnsExchange for FakeExchange {
    async fn exchange(
        &self,
        request: &Message,
        addr: &Address,
        _timeout: Duration,
    ) -> Result<Message, ResolveError> {
        let question = request.question().cloned().expect("request without question");
        self.started.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(Call {
            addr: addr.clone(),
            request: request.clone(),
        });

        let script = self
            .scripts
            .lock()
            .unwrap()
            .get(&(addr.clone(), question.name.clone(), question.record_type))
            .cloned();
        let Some(script) = script else {
            return Err(ResolveError::Transport(format!("no route to {}", addr)));
        };

        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }

        let mut response = script.result?;
        response.id = request.id;
        response.flags.response = true;
        if response.questions.is_empty() {
            response.questions = request.questions.clone();
        }
        Ok(response)
    }
}

// ============================================================================
// In-memory RecordCache
// ============================================================================

#[derive(Default)]
pub struct FakeCache {
    records: Mutex<Vec<DnsRecord>>,
}

impl FakeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<DnsRecord>) -> Self {
        let cache = Self::new();
        for record in records {
            cache.insert_record(record);
        }
        cache
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

impl RecordCache for FakeCache {
    fn query(&self, name: &str, record_types: &[RecordType]) -> Vec<DnsRecord> {
        let name = name::normalize(name);
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.name == name && record_types.contains(&r.record_type))
            .cloned()
            .collect()
    }

    fn insert_message(&self, message: &Message) {
        for record in message.records() {
            if record.ttl != 0 {
                self.insert_record(record.clone());
            }
        }
    }

    fn insert_record(&self, record: DnsRecord) {
        let mut records = self.records.lock().unwrap();
        if !records.contains(&record) {
            records.push(record);
        }
    }
}

// ============================================================================
// Response builders
// ============================================================================

pub fn answer(records: Vec<DnsRecord>) -> Message {
    Message {
        answers: records,
        ..Message::default()
    }
}

pub fn with_rcode(rcode: ResponseCode) -> Message {
    Message {
        rcode,
        ..Message::default()
    }
}

/// Delegation of `zone` to `ns_host`, with an A glue record when `glue` is set.
pub fn referral(zone: &str, ns_host: &str, glue: Option<Ipv4Addr>) -> Message {
    Message {
        authority: vec![DnsRecord::ns(zone, ns_host, 3600)],
        additional: glue
            .map(|ip| vec![DnsRecord::a(ns_host, ip, 3600)])
            .unwrap_or_default(),
        ..Message::default()
    }
}

/// Negative answer carrying the zone SOA.
pub fn negative(rcode: ResponseCode, zone: &str) -> Message {
    let soa = Soa {
        mname: format!("ns1.{}", zone),
        rname: format!("hostmaster.{}", zone),
        serial: 2024010101,
        refresh: 7200,
        retry: 3600,
        expire: 1209600,
        minimum: 300,
    };
    Message {
        rcode,
        authority: vec![DnsRecord::new(zone, RecordType::SOA, 300, RecordData::Soa(soa))],
        ..Message::default()
    }
}
