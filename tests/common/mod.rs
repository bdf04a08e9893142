#![allow(dead_code)]
use delve_dns_application::Resolver;
use delve_dns_domain::config::{ForwardZone, ResolverConfig, StaticRecord};
use delve_dns_infrastructure::dns::ResolverBuilder;
use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::rr::rdata::{A, CNAME};
use hickory_proto::rr::{Name, RData, Record};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

type Handler = Arc<dyn Fn(&Message) -> Option<Message> + Send + Sync>;

/// Loopback UDP name server that records every question it receives.
pub struct TestServer {
    addr: SocketAddr,
    seen: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

impl TestServer {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&Message) -> Option<Message> + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(handler);
        let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("bind loopback");
        let addr = socket.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let task = tokio::spawn(serve(socket, handler, seen.clone()));
        Self { addr, seen, task }
    }

    /// Server that reads queries and never answers.
    pub async fn black_hole() -> Self {
        Self::start(|_| None).await
    }

    pub fn url(&self) -> String {
        format!("udp://{}", self.addr)
    }

    pub fn queries(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn questions(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(socket: UdpSocket, handler: Handler, seen: Arc<Mutex<Vec<String>>>) {
    let mut buf = vec![0u8; 4096];
    loop {
        let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
            break;
        };
        let Ok(query) = Message::from_vec(&buf[..len]) else {
            continue;
        };
        if let Some(q) = query.queries().first() {
            seen.lock()
                .unwrap()
                .push(format!("{} {}", q.name().to_ascii(), q.query_type()));
        }
        if let Some(response) = handler(&query) {
            let _ = socket.send_to(&response.to_vec().unwrap(), peer).await;
        }
    }
}

pub fn queried_name(query: &Message) -> String {
    query
        .queries()
        .first()
        .map(|q| q.name().to_ascii().trim_end_matches('.').to_lowercase())
        .unwrap_or_default()
}

/// Empty response echoing the query id and question.
pub fn reply_to(query: &Message) -> Message {
    let mut response = Message::new();
    response
        .set_id(query.id())
        .set_message_type(MessageType::Response)
        .set_recursion_desired(query.recursion_desired())
        .set_recursion_available(true);
    for q in query.queries() {
        response.add_query(q.clone());
    }
    response
}

pub fn a_answer(query: &Message, ip: Ipv4Addr, ttl: u32) -> Message {
    let mut response = reply_to(query);
    if let Some(q) = query.queries().first() {
        response.add_answer(Record::from_rdata(q.name().clone(), ttl, RData::A(A::from(ip))));
    }
    response
}

pub fn cname_answer(query: &Message, target: &str, ttl: u32) -> Message {
    let mut response = reply_to(query);
    if let Some(q) = query.queries().first() {
        let target = Name::from_ascii(format!("{}.", target)).unwrap();
        response.add_answer(Record::from_rdata(
            q.name().clone(),
            ttl,
            RData::CNAME(CNAME(target)),
        ));
    }
    response
}

pub fn rcode_answer(query: &Message, rcode: ResponseCode) -> Message {
    let mut response = reply_to(query);
    response.set_response_code(rcode);
    response
}

/// Forwarding-mode configuration pointing at `servers`, with short budgets.
pub fn forwarding_config(servers: &[&TestServer]) -> ResolverConfig {
    ResolverConfig {
        recursive: false,
        timeout_ms: 400,
        request_timeout_ms: 300,
        nameservers: servers.iter().map(|s| s.url()).collect(),
        ..ResolverConfig::default()
    }
}

pub fn forward_zone(domain: &str, server: &TestServer) -> ForwardZone {
    ForwardZone {
        domain: domain.to_string(),
        servers: vec![server.url()],
    }
}

pub fn static_record(name: &str, record_type: &str, value: &str) -> StaticRecord {
    StaticRecord {
        name: name.to_string(),
        record_type: record_type.to_string(),
        value: value.to_string(),
    }
}

pub fn build(config: ResolverConfig) -> Resolver {
    ResolverBuilder::new(config).build().expect("valid config")
}
