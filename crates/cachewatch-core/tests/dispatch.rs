mod common;

use cachewatch_core::{
    ComponentStatus, DispatchError, DispatchObserver, DispatchOutcome, InstanceKey, Metric,
    MetricRequest, MetricResult, MetricValue, ProcessingStage,
};
use common::{dispatcher, FakeCache, FakeRegistry, HitCounter, Loader, Passthrough, Transactions};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn key() -> InstanceKey {
    InstanceKey::new("containerX", "cacheY")
}

fn read(registry: &Arc<FakeRegistry>, attribute: &str) -> DispatchOutcome {
    dispatcher(registry).handle(&MetricRequest::new(&key(), attribute))
}

#[test]
fn test_hits_from_counting_stage() {
    let registry = Arc::new(FakeRegistry::default());
    registry.insert(
        key(),
        FakeCache::new("cacheY", vec![Arc::new(HitCounter::new(42))]),
    );

    assert_eq!(
        read(&registry, "hits"),
        DispatchOutcome::Success(MetricResult {
            value: MetricValue::Long(42),
            present: true,
        })
    );
}

#[test]
fn test_hits_without_counting_stage_is_present_zero() {
    let registry = Arc::new(FakeRegistry::default());
    registry.insert(key(), FakeCache::new("cacheY", vec![Arc::new(Passthrough)]));

    assert_eq!(
        read(&registry, "hits"),
        DispatchOutcome::Success(MetricResult {
            value: MetricValue::Long(0),
            present: true,
        })
    );
}

#[test]
fn test_unknown_metric() {
    let registry = Arc::new(FakeRegistry::default());
    registry.insert(key(), FakeCache::new("cacheY", vec![]));

    let outcome = read(&registry, "bogus");
    assert_eq!(
        outcome,
        DispatchOutcome::SoftFailure(DispatchError::UnknownMetric("bogus".into()))
    );
    assert_eq!(
        outcome.failure_description().as_deref(),
        Some("unknown metric bogus")
    );
}

#[test]
fn test_unknown_metric_checked_before_instance() {
    let registry = Arc::new(FakeRegistry::default());
    let outcome = read(&registry, "bogus");
    assert!(matches!(
        outcome,
        DispatchOutcome::SoftFailure(DispatchError::UnknownMetric(_))
    ));
}

#[test]
fn test_unavailable_instance() {
    let registry = Arc::new(FakeRegistry::default());
    let outcome = read(&registry, "hits");
    assert_eq!(
        outcome,
        DispatchOutcome::SoftFailure(DispatchError::UnavailableInstance("cacheY".into()))
    );
    assert_eq!(
        outcome.failure_description().as_deref(),
        Some("unavailable cache cacheY")
    );
}

#[test]
fn test_terminated_instance_is_unavailable() {
    let registry = Arc::new(FakeRegistry::default());
    let cache = registry.insert(key(), FakeCache::new("cacheY", vec![]));

    assert!(read(&registry, "cache-status").is_success());
    cache.set_status(ComponentStatus::Terminated);
    assert!(matches!(
        read(&registry, "cache-status"),
        DispatchOutcome::SoftFailure(DispatchError::UnavailableInstance(_))
    ));
}

#[test]
fn test_malformed_key_is_unavailable() {
    let registry = Arc::new(FakeRegistry::default());
    registry.insert(
        InstanceKey::new("", "cacheY"),
        FakeCache::new("cacheY", vec![]),
    );

    let dispatcher = dispatcher(&registry);
    let key = InstanceKey::new("", "cacheY");
    let outcome = dispatcher.handle(&MetricRequest::new(&key, "hits"));
    assert!(matches!(
        outcome,
        DispatchOutcome::SoftFailure(DispatchError::UnavailableInstance(_))
    ));
}

#[test]
fn test_direct_and_lock_properties() {
    let registry = Arc::new(FakeRegistry::default());
    registry.insert(key(), FakeCache::new("cacheY", vec![]));

    let value = |name: &str| read(&registry, name).into_result().unwrap().value;
    assert_eq!(value("cache-status"), MetricValue::Str("RUNNING".into()));
    assert_eq!(value("cache-name"), MetricValue::Str("cacheY".into()));
    assert_eq!(value("version"), MetricValue::Str("9.4.0".into()));
    assert_eq!(value("number-of-locks-available"), MetricValue::Int(990));
    assert_eq!(value("number-of-locks-held"), MetricValue::Int(10));
    assert_eq!(value("concurrency-level"), MetricValue::Int(1000));
}

#[test]
fn test_entry_count_saturates_into_int() {
    let registry = Arc::new(FakeRegistry::default());
    registry.insert(
        key(),
        FakeCache::new("cacheY", vec![Arc::new(HitCounter::new(1))]),
    );

    let result = read(&registry, "number-of-entries").into_result().unwrap();
    assert_eq!(result.value, MetricValue::Int(i32::MAX));
}

#[test]
fn test_first_stage_governs() {
    let registry = Arc::new(FakeRegistry::default());
    let chain: Vec<Arc<dyn ProcessingStage>> = vec![
        Arc::new(Passthrough),
        Arc::new(Transactions { commits: 5 }),
        Arc::new(Transactions { commits: 50 }),
    ];
    registry.insert(key(), FakeCache::new("cacheY", chain));

    let value = |name: &str| read(&registry, name).into_result().unwrap().value;
    assert_eq!(value("commits"), MetricValue::Long(5));
    assert_eq!(value("prepares"), MetricValue::Long(6));
    assert_eq!(value("rollbacks"), MetricValue::Long(1));
}

#[test]
fn test_loader_counters_and_missing_store_writer() {
    let registry = Arc::new(FakeRegistry::default());
    registry.insert(key(), FakeCache::new("cacheY", vec![Arc::new(Loader)]));

    let value = |name: &str| read(&registry, name).into_result().unwrap();
    assert_eq!(value("cache-loader-loads").value, MetricValue::Long(11));
    assert_eq!(value("cache-loader-misses").value, MetricValue::Long(4));

    let stores = value("cache-loader-stores");
    assert!(stores.present);
    assert_eq!(stores.value, MetricValue::Long(0));
}

#[test]
fn test_managers_present_and_absent() {
    let registry = Arc::new(FakeRegistry::default());
    registry.insert(key(), FakeCache::new("cacheY", vec![]));
    registry.insert(
        InstanceKey::new("containerX", "managed"),
        FakeCache::new("managed", vec![]).with_managers(),
    );

    let absent = read(&registry, "passivations").into_result().unwrap();
    assert_eq!(absent, MetricResult::present(0i64));

    let dispatcher = dispatcher(&registry);
    let managed = InstanceKey::new("containerX", "managed");
    let passivations = dispatcher.handle(&MetricRequest::new(&managed, "passivations"));
    let activations = dispatcher.handle(&MetricRequest::new(&managed, "activations"));
    assert_eq!(
        passivations,
        DispatchOutcome::Success(MetricResult::present(5i64))
    );
    assert_eq!(
        activations,
        DispatchOutcome::Success(MetricResult::present(6i64))
    );
}

#[test]
fn test_replication_metrics() {
    let registry = Arc::new(FakeRegistry::default());
    registry.insert(key(), FakeCache::new("cacheY", vec![]).clustered());

    let value = |name: &str| read(&registry, name).into_result().unwrap();
    assert_eq!(
        value("average-replication-time").value,
        MetricValue::Long(7)
    );
    assert_eq!(value("replication-count").value, MetricValue::Long(3));
    assert_eq!(value("replication-failures").value, MetricValue::Long(1));
    assert_eq!(value("success-ratio").value, MetricValue::Double(0.75));
}

#[test]
fn test_replication_metric_on_local_cache_is_absent() {
    let registry = Arc::new(FakeRegistry::default());
    registry.insert(key(), FakeCache::new("cacheY", vec![]));

    let result = read(&registry, "success-ratio").into_result().unwrap();
    assert!(!result.present);
    assert_eq!(result.value, MetricValue::Double(0.0));
}

#[test]
fn test_repeated_reads_are_identical() {
    let registry = Arc::new(FakeRegistry::default());
    registry.insert(
        key(),
        FakeCache::new(
            "cacheY",
            vec![Arc::new(HitCounter::new(42)), Arc::new(Loader)],
        )
        .with_managers(),
    );

    let dispatcher = dispatcher(&registry);
    let key = key();
    for metric in Metric::ALL {
        let first = dispatcher.handle(&MetricRequest::new(&key, metric.name()));
        let second = dispatcher.handle(&MetricRequest::new(&key, metric.name()));
        assert_eq!(first, second, "{}", metric.name());
    }
}

#[test]
fn test_reads_reflect_counter_changes() {
    let registry = Arc::new(FakeRegistry::default());
    let stage = Arc::new(HitCounter::new(1));
    registry.insert(key(), FakeCache::new("cacheY", vec![stage.clone()]));

    assert_eq!(
        read(&registry, "hits").into_result().unwrap().value,
        MetricValue::Long(1)
    );
    stage.hits.store(2, Ordering::Relaxed);
    assert_eq!(
        read(&registry, "hits").into_result().unwrap().value,
        MetricValue::Long(2)
    );
}

#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<(String, bool)>>,
}

impl DispatchObserver for Recorder {
    fn observe(&self, attribute: &str, outcome: &DispatchOutcome, _elapsed: Duration) {
        self.seen
            .lock()
            .unwrap()
            .push((attribute.to_string(), outcome.is_success()));
    }
}

#[test]
fn test_observer_sees_every_dispatch() {
    let registry = Arc::new(FakeRegistry::default());
    registry.insert(key(), FakeCache::new("cacheY", vec![]));

    let recorder = Arc::new(Recorder::default());
    let dispatcher = dispatcher(&registry).with_observer(recorder.clone());
    let key = key();
    dispatcher.handle(&MetricRequest::new(&key, "hits"));
    dispatcher.handle(&MetricRequest::new(&key, "bogus"));

    let seen = recorder.seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![("hits".to_string(), true), ("bogus".to_string(), false)]
    );
}

#[test]
fn test_concurrent_dispatch() {
    let registry = Arc::new(FakeRegistry::default());
    registry.insert(
        key(),
        FakeCache::new("cacheY", vec![Arc::new(HitCounter::new(42))]),
    );
    let dispatcher = dispatcher(&registry);
    let successes = AtomicUsize::new(0);

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                let key = key();
                for _ in 0..100 {
                    let outcome = dispatcher.handle(&MetricRequest::new(&key, "hits"));
                    if outcome == DispatchOutcome::Success(MetricResult::present(42i64)) {
                        successes.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }
    });

    assert_eq!(successes.load(Ordering::Relaxed), 800);
}
