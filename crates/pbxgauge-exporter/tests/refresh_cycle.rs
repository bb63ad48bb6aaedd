#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod support;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use pbxgauge_core::{DomainFamily, ErrorKind, FailurePolicy, GlobalMetric};
use pbxgauge_exporter::obs::MetricRegistry;
use pbxgauge_exporter::refresh::{run_cycle, Scheduler};

use support::{CycleScript, ScriptedSource};
use DomainFamily::*;

fn registry() -> Arc<MetricRegistry> {
    Arc::new(MetricRegistry::standard().unwrap())
}

#[tokio::test]
async fn deleted_domain_reads_zero_next_cycle() {
    let reg = registry();
    let src = ScriptedSource::new([
        CycleScript::new(1.0).row(Extensions, "acme.com", Some(5.0)),
        CycleScript::new(0.0),
    ]);

    run_cycle(1, &reg, &src).await.unwrap();
    assert_eq!(reg.get(Extensions, "acme.com"), Some(5.0));

    run_cycle(2, &reg, &src).await.unwrap();
    assert_eq!(reg.get(Extensions, "acme.com"), Some(0.0));
}

#[tokio::test]
async fn domain_count_is_set_exactly() {
    let reg = registry();
    let src = ScriptedSource::new([CycleScript::new(12.0).row(Extensions, "a.com", Some(1.0))]);

    let report = run_cycle(1, &reg, &src).await.unwrap();
    assert_eq!(reg.global(GlobalMetric::DomainsCount), Some(12.0));
    assert_eq!(report.domains, 12.0);
    assert_eq!(report.rows, 1);
    assert_eq!(report.families, DomainFamily::ALL.len());
}

#[tokio::test]
async fn absent_domain_is_reset_while_present_one_updates() {
    let reg = registry();
    let src = ScriptedSource::new([
        CycleScript::new(2.0)
            .row(AnsweredCalls, "a.com", Some(1.0))
            .row(AnsweredCalls, "b.com", Some(4.0)),
        CycleScript::new(2.0).row(AnsweredCalls, "a.com", Some(3.0)),
    ]);

    run_cycle(1, &reg, &src).await.unwrap();
    run_cycle(2, &reg, &src).await.unwrap();

    assert_eq!(reg.get(AnsweredCalls, "a.com"), Some(3.0));
    assert_eq!(reg.get(AnsweredCalls, "b.com"), Some(0.0));
}

#[tokio::test]
async fn null_aggregate_reads_zero() {
    let reg = registry();
    let src = ScriptedSource::new([CycleScript::new(1.0).row(AverageMos, "nomos.com", None)]);

    run_cycle(1, &reg, &src).await.unwrap();
    assert_eq!(reg.get(AverageMos, "nomos.com"), Some(0.0));
    assert_eq!(reg.series_count(AverageMos), 1);
}

#[tokio::test]
async fn failed_query_keeps_last_good_values() {
    let reg = registry();
    let src = ScriptedSource::new([
        CycleScript::new(1.0)
            .row(Extensions, "acme.com", Some(5.0))
            .row(OutboundCalls, "acme.com", Some(3.0)),
        CycleScript::new(1.0)
            .row(Extensions, "acme.com", Some(6.0))
            .failing(OutboundCalls),
    ]);

    run_cycle(1, &reg, &src).await.unwrap();
    let err = run_cycle(2, &reg, &src).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Query);

    // families before the failure were refreshed, the failing one was not touched
    assert_eq!(reg.get(Extensions, "acme.com"), Some(6.0));
    assert_eq!(reg.get(OutboundCalls, "acme.com"), Some(3.0));
}

#[tokio::test]
async fn non_finite_row_aborts_before_reset() {
    let reg = registry();
    let src = ScriptedSource::new([
        CycleScript::new(1.0).row(AverageDuration, "a.com", Some(30.0)),
        CycleScript::new(1.0)
            .row(AverageDuration, "a.com", Some(45.0))
            .row(AverageDuration, "b.com", Some(f64::NAN)),
    ]);

    run_cycle(1, &reg, &src).await.unwrap();
    let err = run_cycle(2, &reg, &src).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
    assert_eq!(reg.get(AverageDuration, "a.com"), Some(30.0));
    assert_eq!(reg.get(AverageDuration, "b.com"), None);
}

async fn wait_for_opens(src: &ScriptedSource, n: usize) {
    for _ in 0..400 {
        if src.opened() >= n {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("source opened {} times, wanted {n}", src.opened());
}

#[tokio::test]
async fn retry_policy_survives_failures_until_shutdown() {
    let reg = registry();
    let src = Arc::new(ScriptedSource::new([
        CycleScript::unreachable(),
        CycleScript::new(3.0).row(InboundCalls, "a.com", Some(2.0)),
    ]));
    let scheduler = Scheduler::new(reg.clone(), src.clone(), Duration::from_millis(5), FailurePolicy::Retry);

    let (tx, rx) = watch::channel(false);
    let handle = tokio::spawn(scheduler.run(rx));

    // third open hits the exhausted script and fails again; loop must keep going
    wait_for_opens(&src, 3).await;
    assert_eq!(reg.get(InboundCalls, "a.com"), Some(2.0));
    assert_eq!(reg.global(GlobalMetric::DomainsCount), Some(3.0));

    tx.send(true).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn exit_policy_stops_on_first_failure() {
    let reg = registry();
    let src = Arc::new(ScriptedSource::new([CycleScript::unreachable()]));
    let scheduler = Scheduler::new(reg, src.clone(), Duration::from_millis(5), FailurePolicy::Exit);

    let (_tx, rx) = watch::channel(false);
    let err = scheduler.run(rx).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert_eq!(src.opened(), 1);
}

#[tokio::test]
async fn fatal_error_stops_even_under_retry() {
    // No domains_count registered: a caller bug, not a runtime condition.
    let reg = Arc::new(MetricRegistry::builder().family(Extensions).unwrap().build());
    let src = Arc::new(ScriptedSource::new([CycleScript::new(1.0)]));
    let scheduler = Scheduler::new(reg, src, Duration::from_millis(5), FailurePolicy::Retry);

    let (_tx, rx) = watch::channel(false);
    let err = scheduler.run(rx).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownMetric);
}

#[tokio::test]
async fn dropped_shutdown_sender_stops_the_loop() {
    let reg = registry();
    let src = Arc::new(ScriptedSource::new([CycleScript::new(1.0)]));
    let scheduler = Scheduler::new(reg, src, Duration::from_secs(3600), FailurePolicy::Retry);

    let (tx, rx) = watch::channel(false);
    let handle = tokio::spawn(scheduler.run(rx));
    tokio::time::sleep(Duration::from_millis(20)).await;
    drop(tx);

    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("loop did not stop")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn shutdown_abandons_a_stuck_cycle() {
    let reg = registry();
    reg.observe(OutboundCalls, "acme.com", 4.0).unwrap();
    let src = Arc::new(ScriptedSource::new([CycleScript::new(1.0)
        .row(Extensions, "acme.com", Some(5.0))
        .hanging(OutboundCalls)]));
    let scheduler = Scheduler::new(reg.clone(), src.clone(), Duration::from_secs(3600), FailurePolicy::Retry);

    let (tx, rx) = watch::channel(false);
    let handle = tokio::spawn(scheduler.run(rx));
    wait_for_opens(&src, 1).await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("loop kept waiting on the stuck cycle")
        .unwrap()
        .unwrap();

    // families refreshed before the stall keep their new values; the stuck one is untouched
    assert_eq!(reg.get(Extensions, "acme.com"), Some(5.0));
    assert_eq!(reg.get(OutboundCalls, "acme.com"), Some(4.0));
}
