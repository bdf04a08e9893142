#[path = "../common/mod.rs"]
mod common;

use common::*;
use delve_dns_domain::{RecordData, RecordType};
use futures::future::join_all;
use std::net::Ipv4Addr;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_concurrent_identical_queries_share_one_request() {
    let upstream = TestServer::start(|q| Some(a_answer(q, Ipv4Addr::new(203, 0, 113, 9), 60))).await;
    let resolver = build(forwarding_config(&[&upstream]));

    let results = join_all((0..10).map(|_| resolver.resolve("shared.example", RecordType::A))).await;

    for result in results {
        let resolution = result.unwrap();
        assert_eq!(
            resolution.message.answers[0].data,
            RecordData::A(Ipv4Addr::new(203, 0, 113, 9))
        );
    }
    assert_eq!(upstream.queries(), 1);
    assert_eq!(resolver.deduplicator().in_flight(), 0);
}

#[tokio::test]
async fn test_distinct_queries_are_not_merged() {
    let upstream = TestServer::start(|q| Some(a_answer(q, Ipv4Addr::new(203, 0, 113, 10), 60))).await;
    let resolver = build(forwarding_config(&[&upstream]));

    let names = ["a.example", "b.example", "c.example"];
    let results = join_all(names.iter().map(|name| resolver.resolve(name, RecordType::A))).await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(upstream.queries(), 3);
}

#[tokio::test]
async fn test_cancelled_query_sends_nothing() {
    let upstream = TestServer::start(|q| Some(a_answer(q, Ipv4Addr::new(203, 0, 113, 11), 60))).await;
    let resolver = build(forwarding_config(&[&upstream]));

    let cancel = CancellationToken::new();
    cancel.cancel();
    let outcome = resolver
        .resolve_cancellable("example.org", RecordType::A, None, &cancel)
        .await
        .unwrap();

    assert!(outcome.is_none());
    assert_eq!(upstream.queries(), 0);
}
