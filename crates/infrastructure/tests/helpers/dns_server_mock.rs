#![allow(dead_code)]
use hickory_proto::op::{Message, MessageType};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{RData, Record};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::task::JoinHandle;

/// Transport a query arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Via {
    Udp,
    Tcp,
}

/// Builds the reply for a query; `None` leaves the query unanswered.
pub type Handler = Arc<dyn Fn(&Message, Via) -> Option<Message> + Send + Sync>;

/// Loopback DNS server answering UDP and TCP on the same port.
pub struct MockDnsServer {
    addr: SocketAddr,
    udp_queries: Arc<AtomicUsize>,
    tcp_queries: Arc<AtomicUsize>,
    tasks: Vec<JoinHandle<()>>,
}

impl MockDnsServer {
    pub async fn start<F>(handler: F) -> std::io::Result<Self>
    where
        F: Fn(&Message, Via) -> Option<Message> + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(handler);
        let (udp, tcp) = bind_pair().await?;
        let addr = udp.local_addr()?;
        let udp_queries = Arc::new(AtomicUsize::new(0));
        let tcp_queries = Arc::new(AtomicUsize::new(0));

        let tasks = vec![
            tokio::spawn(serve_udp(udp, handler.clone(), udp_queries.clone())),
            tokio::spawn(serve_tcp(tcp, handler, tcp_queries.clone())),
        ];

        Ok(Self {
            addr,
            udp_queries,
            tcp_queries,
            tasks,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn udp_queries(&self) -> usize {
        self.udp_queries.load(Ordering::SeqCst)
    }

    pub fn tcp_queries(&self) -> usize {
        self.tcp_queries.load(Ordering::SeqCst)
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// UDP socket and TCP listener on the same loopback port.
async fn bind_pair() -> std::io::Result<(UdpSocket, TcpListener)> {
    let mut last_error = None;
    for _ in 0..16 {
        let udp = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await?;
        let port = udp.local_addr()?.port();
        match TcpListener::bind((Ipv4Addr::LOCALHOST, port)).await {
            Ok(tcp) => return Ok((udp, tcp)),
            Err(e) => last_error = Some(e),
        }
    }
    Err(last_error.unwrap_or_else(|| std::io::Error::other("no free port")))
}

async fn serve_udp(socket: UdpSocket, handler: Handler, counter: Arc<AtomicUsize>) {
    let mut buf = vec![0u8; 4096];
    loop {
        let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
            break;
        };
        let Ok(query) = Message::from_vec(&buf[..len]) else {
            continue;
        };
        counter.fetch_add(1, Ordering::SeqCst);
        if let Some(response) = handler(&query, Via::Udp) {
            let _ = socket.send_to(&response.to_vec().unwrap(), peer).await;
        }
    }
}

async fn serve_tcp(listener: TcpListener, handler: Handler, counter: Arc<AtomicUsize>) {
    loop {
        let Ok((stream, _)) = listener.accept().await else {
            break;
        };
        tokio::spawn(serve_tcp_connection(stream, handler.clone(), counter.clone()));
    }
}

async fn serve_tcp_connection(mut stream: TcpStream, handler: Handler, counter: Arc<AtomicUsize>) {
    loop {
        let mut len_buf = [0u8; 2];
        if stream.read_exact(&mut len_buf).await.is_err() {
            return;
        }
        let mut buf = vec![0u8; u16::from_be_bytes(len_buf) as usize];
        if stream.read_exact(&mut buf).await.is_err() {
            return;
        }
        let Ok(query) = Message::from_vec(&buf) else {
            return;
        };
        counter.fetch_add(1, Ordering::SeqCst);
        let Some(response) = handler(&query, Via::Tcp) else {
            continue;
        };
        let bytes = response.to_vec().unwrap();
        let mut framed = (bytes.len() as u16).to_be_bytes().to_vec();
        framed.extend_from_slice(&bytes);
        if stream.write_all(&framed).await.is_err() {
            return;
        }
    }
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

/// Response with one A record for the queried name.
pub fn a_answer(query: &Message, ip: Ipv4Addr, ttl: u32) -> Message {
    let mut response = reply_to(query);
    if let Some(q) = query.queries().first() {
        response.add_answer(Record::from_rdata(q.name().clone(), ttl, RData::A(A::from(ip))));
    }
    response
}
