//! Exercises `JobRegistry` memoization end-to-end: identical `JobConfig`s
//! submitted through the same registry execute the underlying module at
//! most once, whether they arrive sequentially or concurrently.

use std::collections::BTreeMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use kiara_core::{JobRegistry, JobStatus, ModuleRegistry};
use kiara_domain::value_objects::{JobConfig, Manifest, ValueSchema};

use crate::common::{build_harness, CountingIncrement};

fn registry_with_counter() -> (ModuleRegistry, Arc<std::sync::atomic::AtomicUsize>) {
    let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let mut modules = ModuleRegistry::new();
    modules.register(Arc::new(CountingIncrement { calls: calls.clone() }));
    (modules, calls)
}

#[tokio::test]
async fn repeated_submissions_of_the_same_job_reuse_the_stored_result() {
    let (modules, calls) = registry_with_counter();
    let harness = build_harness(modules);

    let input_id = harness
        .data
        .register_orphan("ctx", ValueSchema::new("integer"), &serde_json::Value::from(7), false)
        .await
        .unwrap();

    let manifest = Manifest::bare("increment");
    let inputs = BTreeMap::from([("value".to_string(), input_id)]);
    let config = JobConfig::new(manifest, inputs, BTreeMap::new());

    let mut value_map = kiara_core::ValueMap::new(BTreeMap::from([("value".to_string(), ValueSchema::new("integer"))]));
    value_map.set_value("value", harness.data.get_value(input_id).await.unwrap()).unwrap();

    let first = harness.jobs.submit(config.clone(), value_map.clone()).await.unwrap();
    let second = harness.jobs.submit(config, value_map).await.unwrap();

    assert_eq!(first.status(), JobStatus::Succeeded);
    assert_eq!(second.status(), JobStatus::Succeeded);
    assert_eq!(first.job_id(), second.job_id());
    assert_eq!(calls.load(Ordering::SeqCst), 1, "the module should have executed exactly once");
}

#[tokio::test]
async fn concurrent_submissions_of_the_same_job_coalesce() {
    let (modules, calls) = registry_with_counter();
    let harness = build_harness(modules);

    let input_id = harness
        .data
        .register_orphan("ctx", ValueSchema::new("integer"), &serde_json::Value::from(9), false)
        .await
        .unwrap();

    let manifest = Manifest::bare("increment");
    let inputs = BTreeMap::from([("value".to_string(), input_id)]);
    let config = JobConfig::new(manifest, inputs, BTreeMap::new());

    let mut value_map = kiara_core::ValueMap::new(BTreeMap::from([("value".to_string(), ValueSchema::new("integer"))]));
    value_map.set_value("value", harness.data.get_value(input_id).await.unwrap()).unwrap();

    let jobs_a = harness.jobs.clone();
    let jobs_b = harness.jobs.clone();
    let config_b = config.clone();
    let value_map_b = value_map.clone();

    let (a, b) = tokio::join!(jobs_a.submit(config, value_map), jobs_b.submit(config_b, value_map_b));

    assert_eq!(a.unwrap().job_id(), b.unwrap().job_id());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
