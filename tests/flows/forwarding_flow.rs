#[path = "../common/mod.rs"]
mod common;

use common::*;
use delve_dns_domain::config::ResolverConfig;
use delve_dns_domain::{RecordData, RecordType, ResponseCode};
use hickory_proto::op::ResponseCode as WireCode;
use std::net::Ipv4Addr;

#[tokio::test]
async fn test_forwarded_answer_then_cache_hit() {
    let upstream = TestServer::start(|q| Some(a_answer(q, Ipv4Addr::new(93, 184, 216, 34), 300))).await;
    let resolver = build(forwarding_config(&[&upstream]));

    let first = resolver.resolve("example.com", RecordType::A).await.unwrap();
    assert!(!first.from_cache);
    assert_eq!(first.message.rcode, ResponseCode::NoError);
    assert_eq!(first.message.answers.len(), 1);
    assert_eq!(
        first.message.answers[0].data,
        RecordData::A(Ipv4Addr::new(93, 184, 216, 34))
    );

    let second = resolver.resolve("EXAMPLE.com.", RecordType::A).await.unwrap();
    assert!(second.from_cache);
    assert_eq!(second.message.answers[0].data, first.message.answers[0].data);
    assert_eq!(upstream.queries(), 1);
}

#[tokio::test]
async fn test_upstream_nxdomain_is_an_answer() {
    let upstream = TestServer::start(|q| Some(rcode_answer(q, WireCode::NXDomain))).await;
    let resolver = build(forwarding_config(&[&upstream]));

    let resolution = resolver
        .resolve("missing.example", RecordType::A)
        .await
        .unwrap();
    assert_eq!(resolution.message.rcode, ResponseCode::NXDomain);
    assert!(resolution.message.answers.is_empty());
}

#[tokio::test]
async fn test_remote_cname_is_followed() {
    let upstream = TestServer::start(|q| match queried_name(q).as_str() {
        "www.example" => Some(cname_answer(q, "web.example", 300)),
        "web.example" => Some(a_answer(q, Ipv4Addr::new(10, 0, 0, 80), 300)),
        _ => Some(rcode_answer(q, WireCode::NXDomain)),
    })
    .await;
    let resolver = build(forwarding_config(&[&upstream]));

    let resolution = resolver.resolve("www.example", RecordType::A).await.unwrap();
    let answers = &resolution.message.answers;
    assert_eq!(answers.len(), 2);
    assert_eq!(answers[0].record_type, RecordType::CNAME);
    assert_eq!(answers[1].name, "web.example");
    assert_eq!(answers[1].data, RecordData::A(Ipv4Addr::new(10, 0, 0, 80)));
    assert_eq!(
        upstream.questions(),
        vec!["www.example. A".to_string(), "web.example. A".to_string()]
    );
}

#[tokio::test]
async fn test_forward_zone_uses_its_own_servers() {
    let public = TestServer::start(|q| Some(a_answer(q, Ipv4Addr::new(1, 1, 1, 1), 60))).await;
    let corp = TestServer::start(|q| Some(a_answer(q, Ipv4Addr::new(10, 1, 1, 1), 60))).await;

    let mut config = forwarding_config(&[&public]);
    config.forward_zones = vec![forward_zone("corp.example", &corp)];
    let resolver = build(config);

    let internal = resolver.resolve("db.corp.example", RecordType::A).await.unwrap();
    assert_eq!(
        internal.message.answers[0].data,
        RecordData::A(Ipv4Addr::new(10, 1, 1, 1))
    );

    let external = resolver.resolve("example.org", RecordType::A).await.unwrap();
    assert_eq!(
        external.message.answers[0].data,
        RecordData::A(Ipv4Addr::new(1, 1, 1, 1))
    );

    assert_eq!(corp.queries(), 1);
    assert_eq!(public.queries(), 1);
}

#[tokio::test]
async fn test_local_zone_never_leaves_the_host() {
    let upstream = TestServer::black_hole().await;
    let config = ResolverConfig {
        root_domains: vec!["home.lan".into()],
        static_records: vec![
            static_record("nas.home.lan", "A", "192.168.1.10"),
            static_record("files.home.lan", "CNAME", "nas.home.lan"),
        ],
        ..forwarding_config(&[&upstream])
    };
    let resolver = build(config);

    let alias = resolver.resolve("files.home.lan", RecordType::A).await.unwrap();
    assert!(alias.from_cache);
    assert!(alias.message.flags.authoritative);
    assert_eq!(alias.message.answers.len(), 2);
    assert_eq!(
        alias.message.answers[1].data,
        RecordData::A(Ipv4Addr::new(192, 168, 1, 10))
    );

    let missing = resolver.resolve("printer.home.lan", RecordType::A).await.unwrap();
    assert_eq!(missing.message.rcode, ResponseCode::NXDomain);
    assert!(missing.message.flags.authoritative);

    assert_eq!(upstream.queries(), 0);
}
