#[path = "../common/mod.rs"]
mod common;

use common::*;
use delve_dns_application::services::NameServerSet;
use delve_dns_domain::{Address, RecordData, RecordType, ResolveError};
use hickory_proto::op::ResponseCode as WireCode;
use std::net::Ipv4Addr;

#[tokio::test]
async fn test_silent_server_fails_over_to_next() {
    let silent = TestServer::black_hole().await;
    let healthy = TestServer::start(|q| Some(a_answer(q, Ipv4Addr::new(192, 0, 2, 7), 60))).await;
    let resolver = build(forwarding_config(&[&silent, &healthy]));

    let resolution = resolver.resolve("example.net", RecordType::A).await.unwrap();
    assert_eq!(
        resolution.message.answers[0].data,
        RecordData::A(Ipv4Addr::new(192, 0, 2, 7))
    );
    assert_eq!(silent.queries(), 1);
    assert_eq!(healthy.queries(), 1);
}

#[tokio::test]
async fn test_servfail_fails_over_to_next() {
    let broken = TestServer::start(|q| Some(rcode_answer(q, WireCode::ServFail))).await;
    let healthy = TestServer::start(|q| Some(a_answer(q, Ipv4Addr::new(192, 0, 2, 8), 60))).await;
    let resolver = build(forwarding_config(&[&broken, &healthy]));

    let resolution = resolver.resolve("example.net", RecordType::A).await.unwrap();
    assert_eq!(
        resolution.message.answers[0].data,
        RecordData::A(Ipv4Addr::new(192, 0, 2, 8))
    );
    assert_eq!(broken.queries(), 1);
}

#[tokio::test]
async fn test_every_server_failing_is_an_error() {
    let first = TestServer::black_hole().await;
    let second = TestServer::start(|q| Some(rcode_answer(q, WireCode::ServFail))).await;
    let resolver = build(forwarding_config(&[&first, &second]));

    let result = resolver.resolve("example.net", RecordType::A).await;
    assert!(matches!(result, Err(ResolveError::NoUsableNameServer)));

    // Each candidate is tried once per step.
    assert_eq!(first.queries(), 1);
    assert_eq!(second.queries(), 1);
}

#[tokio::test]
async fn test_explicit_servers_override_defaults() {
    let default = TestServer::black_hole().await;
    let chosen = TestServer::start(|q| Some(a_answer(q, Ipv4Addr::new(198, 51, 100, 1), 60))).await;
    let resolver = build(forwarding_config(&[&default]));

    let servers = NameServerSet::new(vec![chosen.url().parse::<Address>().unwrap()]);
    let resolution = resolver
        .resolve_via("example.net", RecordType::A, servers)
        .await
        .unwrap();

    assert_eq!(
        resolution.message.answers[0].data,
        RecordData::A(Ipv4Addr::new(198, 51, 100, 1))
    );
    assert_eq!(default.queries(), 0);
}
