//! Probe engine behavior against local endpoints and scripted strategies.
//!
//! Covers the three per-domain rules: DNS failure fills every slot, a baseline
//! connect failure fills every slot, and otherwise each strategy fails on its own.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::{
    accepting_port, local_addr, refused_port, registry_of, single_accept_port, Script,
    ScriptedStrategy, StaticResolver, LOCALHOST,
};
use stack_compare::{ErrorKind, ProbeEngine};
use tokio_util::sync::CancellationToken;

fn three(scripts: [Script; 3]) -> Vec<Arc<ScriptedStrategy>> {
    ["tls", "utls", "utlslight"]
        .iter()
        .zip(scripts)
        .map(|(name, script)| ScriptedStrategy::new(name, script))
        .collect()
}

#[tokio::test]
async fn test_unresolvable_domain_fails_every_slot_with_dns_error() {
    let strategies = three([Script::Succeed; 3]);
    let engine = ProbeEngine::new(registry_of(&strategies), Arc::new(StaticResolver::new()));

    let result = engine
        .probe("nonexistent.invalid", &CancellationToken::new())
        .await;

    assert_eq!(result.server_name(), "nonexistent.invalid");
    assert_eq!(result.addr(), None);
    assert_eq!(result.bit_mask(), 0b111);
    for outcome in result.outcomes() {
        let error = outcome.error().expect("slot should be a failure");
        assert_eq!(error.kind(), ErrorKind::DnsResolution);
        assert_eq!(outcome.error_message(), "unable to lookup IP");
    }
    assert!(strategies.iter().all(|s| s.started() == 0));
}

#[tokio::test]
async fn test_empty_address_list_counts_as_dns_failure() {
    let strategies = three([Script::Succeed; 3]);
    let resolver = StaticResolver::new().with_empty("empty.test");
    let engine = ProbeEngine::new(registry_of(&strategies), Arc::new(resolver));

    let result = engine.probe("empty.test", &CancellationToken::new()).await;

    assert_eq!(result.bit_mask(), 0b111);
    assert!(result.outcomes()[2]
        .error()
        .is_some_and(|e| e.is(ErrorKind::DnsResolution)));
}

#[tokio::test]
async fn test_baseline_connect_failure_fills_every_slot() {
    let port = refused_port().await;
    let strategies = three([Script::Succeed; 3]);
    let resolver = StaticResolver::new().with("refused.test", LOCALHOST);
    let engine = ProbeEngine::new(registry_of(&strategies), Arc::new(resolver)).with_port(port);

    let result = engine.probe("refused.test", &CancellationToken::new()).await;

    assert_eq!(result.addr(), Some(local_addr(port)));
    assert_eq!(result.bit_mask(), 0b111);
    for outcome in result.outcomes() {
        assert_eq!(outcome.error_message(), "unable to connect");
        assert!(outcome.error().is_some_and(|e| e.is(ErrorKind::Connect)));
    }
    assert!(strategies.iter().all(|s| s.started() == 0));
}

#[tokio::test]
async fn test_one_failing_strategy_sets_only_its_bit() {
    let port = accepting_port().await;
    let strategies = three([Script::Succeed, Script::FailHandshake, Script::Succeed]);
    let resolver = StaticResolver::new().with("example.test", LOCALHOST);
    let engine = ProbeEngine::new(registry_of(&strategies), Arc::new(resolver)).with_port(port);

    let result = engine.probe("example.test", &CancellationToken::new()).await;

    assert_eq!(result.bit_mask(), 0b010);
    assert_eq!(result.addr(), Some(local_addr(port)));
    assert_eq!(result.outcomes()[0].error_message(), "");
    assert_eq!(
        result.outcomes()[1].error_message(),
        "utls: remote error: handshake failure"
    );
    assert!(result.outcomes()[1]
        .error()
        .is_some_and(|e| e.is(ErrorKind::Handshake)));
    assert_eq!(result.outcomes()[2].error_message(), "");
    assert!(strategies.iter().all(|s| s.started() == 1));
}

#[tokio::test]
async fn test_later_connect_failure_only_fails_that_strategy() {
    let port = single_accept_port().await;
    // The baseline holds its handshake long enough for the listener to close.
    let strategies = vec![
        ScriptedStrategy::delayed("tls", Script::Succeed, Duration::from_millis(200)),
        ScriptedStrategy::new("utls", Script::Succeed),
    ];
    let resolver = StaticResolver::new().with("example.test", LOCALHOST);
    let engine = ProbeEngine::new(registry_of(&strategies), Arc::new(resolver)).with_port(port);

    let result = engine.probe("example.test", &CancellationToken::new()).await;

    assert_eq!(result.addr(), Some(local_addr(port)));
    assert_eq!(result.bit_mask(), 0b10);
    assert_eq!(result.outcomes()[0].error_message(), "");
    let error = result.outcomes()[1].error().expect("second dial should fail");
    assert_eq!(error.kind(), ErrorKind::Connect);
    assert_eq!(error.message(), "unable to connect");
    assert_eq!(strategies[0].started(), 1);
    assert_eq!(strategies[1].started(), 0);
}

#[tokio::test]
async fn test_baseline_handshake_failure_does_not_skip_other_strategies() {
    let port = accepting_port().await;
    let strategies = three([Script::FailHandshake, Script::Succeed, Script::Succeed]);
    let resolver = StaticResolver::new().with("example.test", LOCALHOST);
    let engine = ProbeEngine::new(registry_of(&strategies), Arc::new(resolver)).with_port(port);

    let result = engine.probe("example.test", &CancellationToken::new()).await;

    assert_eq!(result.bit_mask(), 0b001);
    assert!(strategies.iter().all(|s| s.started() == 1));
}

#[tokio::test]
async fn test_failed_probe_request_is_recorded_unless_handshake_only() {
    let port = accepting_port().await;
    let strategies = three([Script::Succeed, Script::Succeed, Script::FailRequest]);
    let resolver = Arc::new(StaticResolver::new().with("example.test", LOCALHOST));

    let engine = ProbeEngine::new(registry_of(&strategies), resolver.clone()).with_port(port);
    let result = engine.probe("example.test", &CancellationToken::new()).await;
    assert_eq!(result.bit_mask(), 0b100);
    assert!(result.outcomes()[2]
        .error()
        .is_some_and(|e| e.is(ErrorKind::Request)));

    let engine = ProbeEngine::new(registry_of(&strategies), resolver)
        .with_port(port)
        .with_probe_request(false);
    let result = engine.probe("example.test", &CancellationToken::new()).await;
    assert!(result.all_succeeded());
}

#[tokio::test]
async fn test_cancelled_probe_reports_timeout() {
    let strategies = three([Script::Succeed; 3]);
    let resolver = StaticResolver::new().with("example.test", LOCALHOST);
    let engine = ProbeEngine::new(registry_of(&strategies), Arc::new(resolver));

    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = engine.probe("example.test", &cancel).await;

    assert_eq!(result.addr(), None);
    assert_eq!(result.bit_mask(), 0b111);
    assert!(result
        .outcomes()
        .iter()
        .all(|o| o.error_message() == "timeout reached"));
    assert!(strategies.iter().all(|s| s.started() == 0));
}
