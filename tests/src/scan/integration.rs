use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, TcpListener};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use synscan_common::config::{Config, DispatchPolicy, SourcePortPolicy};
use synscan_common::ports::{self, PortSet};
use synscan_common::{ProbeOutcome, ScanError, ScanReport, ScanResult};
use synscan_core::scanner::{self, Scanner};

use super::simulated::{PortState, SimulatedHost};

const HOST: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 10));

fn fast_config() -> Config {
    Config {
        collection_window: Duration::from_millis(20),
        ..Config::default()
    }
}

async fn completed(host: SimulatedHost, cfg: Config, ports: &PortSet) -> (ScanResult, SimulatedHost) {
    let mut scanner = Scanner::new(host, cfg);
    let report = scanner.scan(HOST, ports).await.unwrap();
    let ScanReport::Completed(result) = report else {
        panic!("expected a completed scan, got {report:?}");
    };
    (result, scanner.into_transport())
}

#[tokio::test]
async fn down_host_gets_no_probes() {
    let ports = ports::parse("1-1000").unwrap();
    let mut scanner = Scanner::new(SimulatedHost::down(), fast_config());

    let report = scanner.scan(HOST, &ports).await.unwrap();

    assert!(matches!(report, ScanReport::HostDown { host, .. } if host == HOST));
    assert!(scanner.into_transport().sent.is_empty());
}

#[tokio::test]
async fn every_category_is_reported() {
    let host = SimulatedHost::up()
        .with(PortState::Listening, [22, 443])
        .with(PortState::Refusing, [23])
        .with(PortState::Rejected(13), [25])
        .with(PortState::Rejected(4), [110])
        .with(PortState::Garbled, [8080]);
    let ports = ports::parse("443,22-25,110,8080,9000").unwrap();

    let (result, _) = completed(host, fast_config(), &ports).await;

    assert_eq!(result.open, vec![443, 22]);
    assert_eq!(result.closed, vec![23]);
    assert_eq!(result.filtered, vec![25]);
    assert_eq!(result.dropped, vec![24, 9000]);
    assert_eq!(result.unknown, vec![110, 8080]);
    assert_eq!(result.responses, 6);
    assert_eq!(result.total, 8);
    assert_eq!(result.hit_rate(), 75.0);
}

#[tokio::test]
async fn categories_partition_the_port_set() {
    let host = SimulatedHost::up()
        .with(PortState::Listening, (1..=300).step_by(7))
        .with(PortState::Refusing, (2..=300).step_by(5))
        .with(PortState::Rejected(3), (3..=300).step_by(11));
    let ports = ports::parse("300-1").unwrap();

    let (result, _) = completed(host, fast_config(), &ports).await;

    let mut seen = HashSet::new();
    for outcome in ProbeOutcome::ALL {
        for port in result.ports(outcome) {
            assert!(seen.insert(*port), "port {port} filed twice");
        }
    }
    let probed: HashSet<u16> = (1..=300).collect();
    assert_eq!(seen, probed);
    assert_eq!(result.classified(), result.total);
}

#[tokio::test]
async fn batches_follow_capacity() {
    let ports = ports::parse("1-250").unwrap();
    let (result, host) = completed(SimulatedHost::up(), fast_config(), &ports).await;

    assert_eq!(result.batches, 3);
    assert_eq!(host.batch_sizes, vec![100, 100, 50]);
    assert_eq!(result.dropped.len(), 250);
    assert_eq!(result.hit_rate(), 0.0);
}

#[tokio::test]
async fn unbounded_policy_sends_once() {
    let cfg = Config {
        dispatch: DispatchPolicy::Unbounded,
        ..fast_config()
    };
    let ports = ports::parse("1-250").unwrap();
    let (result, host) = completed(SimulatedHost::up(), cfg, &ports).await;

    assert_eq!(result.batches, 1);
    assert_eq!(host.batch_sizes, vec![250]);
}

#[tokio::test]
async fn unique_source_ports_never_repeat_in_a_batch() {
    let cfg = Config {
        source_ports: SourcePortPolicy::Unique,
        ..fast_config()
    };
    let host = SimulatedHost::up().with(PortState::Listening, 1..=100);
    let ports = ports::parse("1-100").unwrap();

    let (result, host) = completed(host, cfg, &ports).await;

    let sources: HashSet<u16> = host.sent.iter().map(|p| p.key.source_port).collect();
    assert_eq!(sources.len(), 100);
    assert!(sources.iter().all(|port| *port >= 49_152));
    assert_eq!(result.open.len(), 100);
}

#[tokio::test]
async fn progress_is_reported_once_per_batch() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut scanner = Scanner::new(SimulatedHost::up(), fast_config())
        .on_batch(move |progress| sink.lock().unwrap().push((progress.index, progress.total_batches)));

    scanner.scan(HOST, &ports::parse("1-201").unwrap()).await.unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![(0, 3), (1, 3), (2, 3)]);
}

#[tokio::test]
async fn invalid_port_aborts_before_liveness() {
    let ports = ports::parse("80,99999").unwrap();
    let mut scanner = Scanner::new(SimulatedHost::up(), fast_config());

    let err = scanner.scan(HOST, &ports).await.unwrap_err();

    assert!(matches!(err, ScanError::PortOutOfRange(99_999)));
    assert!(scanner.into_transport().sent.is_empty());
}

#[tokio::test]
async fn oversized_range_fails_without_expanding() {
    let ports = ports::parse("1-30000000").unwrap();
    let mut scanner = Scanner::new(SimulatedHost::up(), fast_config());

    let err = scanner.scan(HOST, &ports).await.unwrap_err();

    assert!(matches!(err, ScanError::PortOutOfRange(65_536)));
    assert!(ports.len() <= 65_536);
    assert!(scanner.into_transport().sent.is_empty());
}

#[tokio::test]
async fn default_port_list_is_scanned_in_ten_batches() {
    let (result, host) = completed(SimulatedHost::up(), fast_config(), ports::top_1000()).await;

    assert_eq!(result.total, 1000);
    assert_eq!(host.batch_sizes.len(), 10);
}

/// Needs root: real raw sockets against a loopback listener.
#[tokio::test]
#[ignore]
async fn loopback_listener_is_open() {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let port = listener.local_addr().unwrap().port();
    let ports: PortSet = [u32::from(port)].into_iter().collect();

    let report = scanner::perform_scan(IpAddr::V4(Ipv4Addr::LOCALHOST), &ports, Config::default(), None)
        .await
        .unwrap();

    let ScanReport::Completed(result) = report else {
        panic!("loopback should answer echo");
    };
    assert_eq!(result.open, vec![port]);
}
