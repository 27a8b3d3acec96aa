use ferrous_pdns_domain::{
    DnsClass, EntryKind, ErrorCodeFilter, RecordType, RecordTypeFilter, Timestamp,
};
use ferrous_pdns_infrastructure::dns::{DecodedAnswer, DecodedMessage, DecodedQuestion, DnsDecoder};
use ferrous_pdns_infrastructure::output::PdnsOutput;
use ferrous_pdns_infrastructure::pdns::{
    AnswerObservation, AssetUpdate, ErrorObservation, ErrorUpdate, PdnsCache, PdnsCacheConfig,
};
use std::net::{IpAddr, Ipv4Addr};

mod helpers;
use helpers::*;

fn config() -> PdnsCacheConfig {
    PdnsCacheConfig {
        timeout_secs: 3600,
        print_interval_secs: 86_400,
        memory_limit_bytes: usize::MAX,
        record_types: RecordTypeFilter::from_flags("46CDNPRSM").unwrap(),
        error_codes: ErrorCodeFilter::from_flags("xs").unwrap(),
        cname_chase: true,
    }
}

fn cache_with(config: PdnsCacheConfig) -> (PdnsCache, MemorySink) {
    let (output, sink) = memory_output();
    (PdnsCache::new(config, output), sink)
}

fn client() -> IpAddr {
    IpAddr::V4(CLIENT_V4)
}

fn server() -> IpAddr {
    IpAddr::V4(SERVER_V4)
}

fn answer<'a>(query: &'a str, value: &'a str, ttl: u32, at: Timestamp) -> AnswerObservation<'a> {
    AnswerObservation {
        query,
        class: DnsClass::IN,
        record_type: RecordType::A,
        ttl,
        answer: value,
        client: client(),
        server: server(),
        timestamp: at,
    }
}

fn error<'a>(query: &'a str, rcode: u16, at: Timestamp) -> ErrorObservation<'a> {
    ErrorObservation {
        query,
        class: DnsClass::IN,
        query_type: "A",
        rcode,
        client: client(),
        server: server(),
        timestamp: at,
    }
}

#[test]
fn test_first_sighting_prints_immediately() {
    let (mut cache, sink) = cache_with(config());

    let update = cache.record_answer(&answer("example.com.", "93.184.216.34", 300, ts(1000)));

    assert_eq!(update, Some(AssetUpdate::Inserted));
    assert_eq!(
        sink.lines(),
        vec!["1000.000000||10.0.0.5||8.8.8.8||IN||example.com.||A||93.184.216.34||300||1"]
    );
    let record = cache.record("example.com.").unwrap();
    assert_eq!(record.assets.len(), 1);
    assert_eq!(record.first_seen, ts(1000));
}

#[test]
fn test_repeat_inside_window_counts_without_printing() {
    let (mut cache, sink) = cache_with(config());
    cache.record_answer(&answer("example.com.", "93.184.216.34", 300, ts(1000)));

    let update = cache.record_answer(&answer("example.com.", "93.184.216.34", 300, ts(1005)));

    assert_eq!(update, Some(AssetUpdate::Suppressed));
    assert_eq!(sink.len(), 1);
    let asset = cache
        .record("example.com.")
        .unwrap()
        .asset(RecordType::A, "93.184.216.34")
        .unwrap();
    assert_eq!(asset.seen, 2);
    assert_eq!(asset.last_seen, ts(1005));
    assert!(asset.is_pending());
}

#[test]
fn test_ttl_keeps_maximum_observed() {
    let (mut cache, _sink) = cache_with(config());
    for (offset, ttl) in [(0, 300), (1, 900), (2, 60)] {
        cache.record_answer(&answer("example.com.", "1.2.3.4", ttl, ts(1000 + offset)));
    }

    let asset = cache
        .record("example.com.")
        .unwrap()
        .asset(RecordType::A, "1.2.3.4")
        .unwrap();
    assert_eq!(asset.ttl, 900);
}

#[test]
fn test_print_window_dedups_and_reopens() {
    let (mut cache, sink) = cache_with(PdnsCacheConfig {
        print_interval_secs: 100,
        ..config()
    });

    cache.record_answer(&answer("example.com.", "1.2.3.4", 300, ts(1000)));
    let inside = cache.record_answer(&answer("example.com.", "1.2.3.4", 300, ts(1099)));
    assert_eq!(inside, Some(AssetUpdate::Suppressed));
    assert_eq!(sink.len(), 1);

    let after = cache.record_answer(&answer("example.com.", "1.2.3.4", 300, ts(1101)));
    assert_eq!(after, Some(AssetUpdate::Reprinted));
    assert_eq!(sink.len(), 2);

    let reprint = &sink.entries()[1];
    assert_eq!(reprint.timestamp, ts(1101));
    assert_eq!(reprint.count, 3);

    let asset = cache
        .record("example.com.")
        .unwrap()
        .asset(RecordType::A, "1.2.3.4")
        .unwrap();
    assert_eq!(asset.seen, 0);
    assert!(!asset.is_pending());
}

#[test]
fn test_new_assets_go_to_the_head() {
    let (mut cache, sink) = cache_with(config());
    cache.record_answer(&answer("example.com.", "1.1.1.1", 300, ts(1000)));
    cache.record_answer(&answer("example.com.", "2.2.2.2", 300, ts(1000)));

    let record = cache.record("example.com.").unwrap();
    assert_eq!(record.assets[0].answer, "2.2.2.2");
    assert_eq!(record.assets[1].answer, "1.1.1.1");
    assert_eq!(sink.len(), 2);
}

#[test]
fn test_unselected_record_type_is_skipped() {
    let (mut cache, sink) = cache_with(PdnsCacheConfig {
        record_types: RecordTypeFilter::from_flags("6").unwrap(),
        ..config()
    });

    assert_eq!(cache.record_answer(&answer("example.com.", "1.2.3.4", 300, ts(1000))), None);
    assert!(cache.is_empty());
    assert_eq!(sink.len(), 0);
    assert_eq!(cache.metrics().answers_filtered, 1);
}

#[test]
fn test_query_names_are_case_sensitive() {
    let (mut cache, _sink) = cache_with(config());
    cache.record_answer(&answer("Example.com.", "1.2.3.4", 300, ts(1000)));
    cache.record_answer(&answer("example.com.", "1.2.3.4", 300, ts(1000)));

    assert_eq!(cache.len(), 2);
}

#[test]
fn test_error_prints_once_per_record_window() {
    let (mut cache, sink) = cache_with(config());

    assert_eq!(
        cache.record_error(&error("nonexist.example.", 3, ts(1000))),
        ErrorUpdate::Printed
    );
    assert_eq!(
        cache.record_error(&error("nonexist.example.", 3, ts(1010))),
        ErrorUpdate::Suppressed
    );

    assert_eq!(
        sink.lines(),
        vec!["1000.000000||10.0.0.5||8.8.8.8||IN||nonexist.example.||A||NXDOMAIN||0||1"]
    );
    let record = cache.record("nonexist.example.").unwrap();
    assert!(record.assets.is_empty());
    assert!(record.pending_error.is_some());
    assert_eq!(sink.entries()[0].kind, EntryKind::Error);
}

#[test]
fn test_unselected_error_code_creates_nothing() {
    let (mut cache, sink) = cache_with(config());

    assert_eq!(
        cache.record_error(&error("example.com.", 5, ts(1000))),
        ErrorUpdate::Filtered
    );
    assert!(cache.is_empty());
    assert_eq!(sink.len(), 0);
}

#[test]
fn test_errors_route_to_error_sink() {
    let (output, answers, errors) = split_output();
    let mut cache = PdnsCache::new(config(), output);

    cache.record_answer(&answer("example.com.", "1.2.3.4", 300, ts(1000)));
    cache.record_error(&error("broken.example.", 2, ts(1000)));

    assert_eq!(answers.len(), 1);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.entries()[0].answer, "SERVFAIL");
}

#[test]
fn test_expire_removes_everything_at_or_before_cutoff() {
    let (mut cache, _sink) = cache_with(config());
    cache.record_answer(&answer("a.example.", "1.1.1.1", 300, ts(1000)));
    cache.record_answer(&answer("b.example.", "2.2.2.2", 300, ts(2000)));
    cache.record_answer(&answer("c.example.", "3.3.3.3", 300, ts(5000)));

    let now = ts(5600);
    let report = cache.expire(now);

    let cutoff = now.secs() - 3600;
    assert_eq!(report.cutoff_secs, cutoff);
    assert_eq!(report.records_removed, 2);
    assert_eq!(cache.len(), 1);
    assert!(cache.record("c.example.").unwrap().last_seen.secs() > cutoff);
}

#[test]
fn test_expire_flushes_pending_updates() {
    let (mut cache, sink) = cache_with(config());
    cache.record_answer(&answer("example.com.", "1.2.3.4", 300, ts(1000)));
    cache.record_answer(&answer("example.com.", "1.2.3.4", 600, ts(1005)));

    let report = cache.expire(ts(10_000));

    assert_eq!(report.lines_flushed, 1);
    assert_eq!(
        sink.lines()[1],
        "1005.000000||10.0.0.5||8.8.8.8||IN||example.com.||A||1.2.3.4||600||2"
    );
    assert!(cache.is_empty());
    assert_eq!(cache.memory_bytes(), 0);
}

#[test]
fn test_expire_drops_stale_assets_of_live_records() {
    let (mut cache, sink) = cache_with(config());
    cache.record_answer(&answer("example.com.", "1.1.1.1", 300, ts(1000)));
    cache.record_answer(&answer("example.com.", "2.2.2.2", 300, ts(5000)));

    let report = cache.expire(ts(5600));

    assert_eq!(report.records_removed, 0);
    assert_eq!(report.assets_removed, 1);
    let record = cache.record("example.com.").unwrap();
    assert_eq!(record.assets.len(), 1);
    assert_eq!(record.assets[0].answer, "2.2.2.2");
    assert_eq!(sink.len(), 2, "Printed assets are not printed again on expiry");
}

#[test]
fn test_expire_flushes_pending_error() {
    let (mut cache, sink) = cache_with(config());
    cache.record_error(&error("nonexist.example.", 3, ts(1000)));
    cache.record_error(&error("nonexist.example.", 3, ts(1010)));

    cache.expire(ts(10_000));

    let entries = sink.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].timestamp, ts(1010));
    assert_eq!(entries[1].answer, "NXDOMAIN");
}

#[test]
fn test_suppressed_error_counts_toward_memory() {
    let (mut cache, _sink) = cache_with(config());
    cache.record_error(&error("nonexist.example.", 3, ts(1000)));
    let after_print = cache.memory_bytes();

    cache.record_error(&error("nonexist.example.", 3, ts(1010)));
    assert_eq!(cache.memory_bytes(), after_print + "A".len());

    cache.record_error(&ErrorObservation {
        query_type: "AAAA",
        ..error("nonexist.example.", 3, ts(1020))
    });
    assert_eq!(cache.memory_bytes(), after_print + "AAAA".len());

    cache.expire(ts(10_000));
    assert!(cache.is_empty());
    assert_eq!(cache.memory_bytes(), 0);
}

#[test]
fn test_memory_pressure_drains_oldest_first() {
    let probe_footprint = {
        let (mut probe, _sink) = cache_with(config());
        probe.record_answer(&answer("a1.example.", "10.0.0.1", 300, ts(1000)));
        probe.memory_bytes()
    };

    let (mut cache, _sink) = cache_with(PdnsCacheConfig {
        timeout_secs: 1_000_000,
        memory_limit_bytes: probe_footprint * 2,
        ..config()
    });
    cache.record_answer(&answer("a1.example.", "10.0.0.1", 300, ts(1000)));
    cache.record_answer(&answer("a2.example.", "10.0.0.2", 300, ts(2000)));
    cache.record_answer(&answer("a3.example.", "10.0.0.3", 300, ts(3000)));
    assert_eq!(cache.memory_bytes(), probe_footprint * 3);

    let report = cache.expire(ts(3000));

    assert_eq!(report.passes, 2);
    assert_eq!(report.cutoff_secs, 1300);
    assert!(cache.record("a1.example.").is_none());
    assert!(cache.record("a2.example.").is_some());
    assert!(cache.record("a3.example.").is_some());
    assert!(cache.memory_bytes() <= probe_footprint * 2);
    assert_eq!(cache.metrics().memory_sweeps, 1);
}

#[test]
fn test_memory_pressure_converges_to_empty() {
    let (mut cache, sink) = cache_with(PdnsCacheConfig {
        timeout_secs: 1_000_000,
        memory_limit_bytes: 0,
        ..config()
    });
    cache.record_answer(&answer("a.example.", "1.1.1.1", 300, ts(1000)));
    cache.record_answer(&answer("b.example.", "2.2.2.2", 300, ts(2000)));
    cache.record_answer(&answer("c.example.", "3.3.3.3", 300, ts(3000)));

    let report = cache.expire(ts(3000));

    assert!(cache.is_empty());
    assert_eq!(cache.memory_bytes(), 0);
    assert_eq!(report.records_removed, 3);
    assert_eq!(report.passes, 4);
    assert_eq!(sink.len(), 3);
}

#[test]
fn test_expire_all_flushes_everything() {
    let (mut cache, sink) = cache_with(config());
    cache.record_answer(&answer("example.com.", "1.2.3.4", 300, ts(1000)));
    cache.record_answer(&answer("example.com.", "1.2.3.4", 300, ts(1001)));
    cache.record_answer(&answer("other.example.", "5.6.7.8", 300, ts(1002)));

    let report = cache.expire_all();

    assert_eq!(report.records_removed, 2);
    assert_eq!(report.lines_flushed, 1);
    assert_eq!(sink.len(), 3);
    assert!(cache.is_empty());
    assert_eq!(cache.memory_bytes(), 0);
}

fn cname_response() -> DecodedMessage {
    DecodedMessage {
        id: 1,
        is_response: true,
        truncated: false,
        rcode: 0,
        question: Some(DecodedQuestion {
            name: "www.example.com.".into(),
            qtype: 1,
            type_name: "A".into(),
            qclass: DnsClass::IN,
        }),
        answers: vec![
            DecodedAnswer {
                name: "www.example.com.".into(),
                rtype: 5,
                class: DnsClass::IN,
                ttl: 60,
                rdata: "edge.example.net.".to_string(),
            },
            DecodedAnswer {
                name: "edge.example.net.".into(),
                rtype: 1,
                class: DnsClass::IN,
                ttl: 20,
                rdata: "192.0.2.10".to_string(),
            },
        ],
    }
}

#[test]
fn test_cname_chase_rekeys_following_answers() {
    let (mut cache, sink) = cache_with(config());

    let cached = cache.record_response(&cname_response(), client(), server(), ts(1000));

    assert_eq!(cached, 2);
    let alias = cache.record("www.example.com.").unwrap();
    assert!(alias.asset(RecordType::CNAME, "edge.example.net.").is_some());
    assert!(alias.asset(RecordType::A, "192.0.2.10").is_none());
    let target = cache.record("edge.example.net.").unwrap();
    assert!(target.asset(RecordType::A, "192.0.2.10").is_some());
    assert_eq!(
        sink.lines()[1],
        "1000.000000||10.0.0.5||8.8.8.8||IN||edge.example.net.||A||192.0.2.10||20||1"
    );
}

#[test]
fn test_cname_chase_to_punycode_target_shares_record_with_direct_query() {
    let (mut cache, sink) = cache_with(config());
    let target = Ipv4Addr::new(192, 0, 2, 77);

    let chased = DnsDecoder::decode(&build_response(
        1,
        "www.example.com",
        TYPE_A,
        &[
            cname_record("www.example.com", 60, "xn--bcher-kva.example"),
            a_record("xn--bcher-kva.example", 20, target),
        ],
    ))
    .unwrap();
    let direct = DnsDecoder::decode(&build_response(
        2,
        "xn--bcher-kva.example",
        TYPE_A,
        &[a_record("xn--bcher-kva.example", 20, target)],
    ))
    .unwrap();

    cache.record_response(&chased, client(), server(), ts(1000));
    cache.record_response(&direct, client(), server(), ts(1001));

    assert_eq!(cache.len(), 2);
    assert!(cache.record("bücher.example.").is_none());
    let record = cache.record("xn--bcher-kva.example.").unwrap();
    assert_eq!(record.assets.len(), 1);
    assert!(record.asset(RecordType::A, "192.0.2.77").is_some());
    let a_lines = sink
        .entries()
        .iter()
        .filter(|entry| entry.record_type == "A")
        .count();
    assert_eq!(a_lines, 1);
}

#[test]
fn test_without_cname_chase_answers_stay_on_question() {
    let (mut cache, _sink) = cache_with(PdnsCacheConfig {
        cname_chase: false,
        ..config()
    });

    cache.record_response(&cname_response(), client(), server(), ts(1000));

    assert_eq!(cache.len(), 1);
    let record = cache.record("www.example.com.").unwrap();
    assert_eq!(record.assets.len(), 2);
}

#[test]
fn test_error_response_goes_to_error_path() {
    let (mut cache, sink) = cache_with(config());
    let message = DecodedMessage {
        rcode: 3,
        answers: Vec::new(),
        ..cname_response()
    };

    assert_eq!(cache.record_response(&message, client(), server(), ts(1000)), 0);
    assert_eq!(sink.entries()[0].answer, "NXDOMAIN");
    assert!(cache.record("www.example.com.").unwrap().assets.is_empty());
}

#[test]
fn test_sink_failures_are_counted_not_fatal() {
    let mut cache = PdnsCache::new(config(), PdnsOutput::single(Box::new(FailingSink)));

    cache.record_answer(&answer("example.com.", "1.2.3.4", 300, ts(1000)));

    assert_eq!(cache.metrics().sink_failures, 1);
    assert_eq!(cache.len(), 1);
    assert!(cache.flush().is_err());
}

#[test]
fn test_ipv6_client_sets_record_family() {
    let (mut cache, _sink) = cache_with(config());
    let v6: IpAddr = "2001:db8::5".parse().unwrap();
    cache.record_answer(&AnswerObservation {
        client: v6,
        server: IpAddr::V4(Ipv4Addr::new(192, 0, 2, 53)),
        ..answer("example.com.", "1.2.3.4", 300, ts(1000))
    });

    assert_eq!(
        cache.record("example.com.").unwrap().family,
        ferrous_pdns_domain::AddressFamily::Inet6
    );
}
