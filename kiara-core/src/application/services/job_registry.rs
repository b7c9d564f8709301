// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Job registry
//!
//! The memoization core (§5): submitting a `JobConfig` either returns a
//! prior terminal `JobRecord` for the same `inputs_hash`, joins an in-flight
//! request for that same hash (singleflight -- concurrent identical
//! requests run the module exactly once), or becomes the leader that
//! actually runs it through the `ModuleExecutor`, gated by the
//! `WorkerPool`. A non-idempotent module (`ModuleExecutor::is_idempotent`
//! returns `false`) skips all of that: every `submit` runs it fresh and its
//! `JobRecord` is never written to the archive, since a cached or
//! deduplicated run would silently stand in for an effect that was supposed
//! to happen again.
//!
//! [`queue`](JobRegistry::queue) is the async sibling of `submit`: it hands
//! back a `JobId` immediately and runs the job on a spawned task, so a
//! caller can queue many jobs and later poll [`status`](JobRegistry::status),
//! block on [`wait_for`](JobRegistry::wait_for), collect the result with
//! [`retrieve_result`](JobRegistry::retrieve_result), or
//! [`cancel`](JobRegistry::cancel) one that hasn't started running yet.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, Notify, RwLock};

use kiara_domain::entities::{JobRecord, JobStatus, ValueMap};
use kiara_domain::value_objects::{Digest, JobConfig, JobId, ValueId};
use kiara_domain::{JobArchive, KiaraError, ModuleExecutor, PayloadStore};

use crate::infrastructure::metrics::MetricsService;
use crate::infrastructure::runtime::WorkerPool;

struct QueuedJob {
    record: Arc<RwLock<JobRecord>>,
    notify: Arc<Notify>,
    cancel: Arc<AtomicBool>,
}

pub struct JobRegistry {
    archive: Arc<dyn JobArchive>,
    executor: Arc<dyn ModuleExecutor>,
    payloads: Arc<dyn PayloadStore>,
    worker_pool: Arc<WorkerPool>,
    metrics: Option<Arc<MetricsService>>,
    in_flight: Mutex<HashMap<Digest, Arc<Notify>>>,
    queued: Mutex<HashMap<JobId, QueuedJob>>,
}

impl JobRegistry {
    pub fn new(
        archive: Arc<dyn JobArchive>,
        executor: Arc<dyn ModuleExecutor>,
        payloads: Arc<dyn PayloadStore>,
        worker_pool: Arc<WorkerPool>,
    ) -> Self {
        Self {
            archive,
            executor,
            payloads,
            worker_pool,
            metrics: None,
            in_flight: Mutex::new(HashMap::new()),
            queued: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsService>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Runs (or reuses a memoized run of) the module named by
    /// `config.manifest`. `inputs` must already be bound to the `ValueId`s
    /// listed in `config.inputs` -- the caller resolved those value ids
    /// through the data registry before calling here.
    pub async fn submit(&self, config: JobConfig, inputs: ValueMap) -> Result<JobRecord, KiaraError> {
        if let Some(metrics) = &self.metrics {
            metrics.record_job_submitted();
        }

        let is_idempotent = self.executor.is_idempotent(&config.manifest.module_type);
        if !is_idempotent {
            return self.run(JobRecord::new(config), inputs, false).await;
        }

        let inputs_hash = config.inputs_hash();
        if let Some(record) = self.lookup_terminal(inputs_hash).await? {
            if let Some(metrics) = &self.metrics {
                metrics.record_cache_hit();
            }
            return Ok(record);
        }

        loop {
            let leader_notify = {
                let mut in_flight = self.in_flight.lock().await;
                match in_flight.get(&inputs_hash) {
                    Some(notify) => Some(notify.clone()),
                    None => {
                        in_flight.insert(inputs_hash, Arc::new(Notify::new()));
                        None
                    }
                }
            };

            let Some(follower_notify) = leader_notify else {
                // We are the leader: run the job, then wake every follower.
                let record = self.run(JobRecord::new(config.clone()), inputs, true).await;
                let notify = self.in_flight.lock().await.remove(&inputs_hash);
                if let Some(notify) = notify {
                    notify.notify_waiters();
                }
                return record;
            };

            follower_notify.notified().await;
            if let Some(record) = self.lookup_terminal(inputs_hash).await? {
                if let Some(metrics) = &self.metrics {
                    metrics.record_cache_hit();
                }
                return Ok(record);
            }
            // The leader's run never reached a terminal state (e.g. it was
            // cancelled before storing); loop around and try to lead ourselves.
        }
    }

    /// Queues the module named by `config.manifest` to run on a background
    /// task and returns its `JobId` immediately, without waiting for it to
    /// start or finish.
    pub async fn queue(self: &Arc<Self>, config: JobConfig, inputs: ValueMap) -> Result<JobId, KiaraError> {
        if let Some(metrics) = &self.metrics {
            metrics.record_job_submitted();
        }

        let is_idempotent = self.executor.is_idempotent(&config.manifest.module_type);
        let record = Arc::new(RwLock::new(JobRecord::new(config.clone())));
        let job_id = record.read().await.job_id();
        let notify = Arc::new(Notify::new());
        let cancel = Arc::new(AtomicBool::new(false));

        self.queued
            .lock()
            .await
            .insert(job_id, QueuedJob { record: record.clone(), notify: notify.clone(), cancel: cancel.clone() });

        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.run_queued(config, inputs, record, &cancel, is_idempotent).await;
            notify.notify_waiters();
        });

        Ok(job_id)
    }

    /// The current status of a queued or previously-submitted job.
    pub async fn status(&self, job_id: JobId) -> Result<JobStatus, KiaraError> {
        if let Some(queued) = self.queued.lock().await.get(&job_id) {
            return Ok(queued.record.read().await.status());
        }
        Ok(self.archive.load_job(job_id).await?.status())
    }

    /// Blocks until every named job reaches a terminal status. Jobs not
    /// known to this registry (never queued, and not in the archive) are
    /// treated as already settled.
    pub async fn wait_for(&self, job_ids: &[JobId]) -> Result<(), KiaraError> {
        for &job_id in job_ids {
            self.wait_for_one(job_id).await;
        }
        Ok(())
    }

    async fn wait_for_one(&self, job_id: JobId) {
        let Some((record, notify)) = ({
            let queued = self.queued.lock().await;
            queued.get(&job_id).map(|q| (q.record.clone(), q.notify.clone()))
        }) else {
            return;
        };

        loop {
            let notified = notify.notified();
            if record.read().await.status().is_terminal() {
                return;
            }
            notified.await;
        }
    }

    /// The finished `JobRecord` for a job, once it has reached a terminal
    /// status. Returns `KiaraError::JobNotReady` if it's still queued or
    /// running.
    pub async fn retrieve_result(&self, job_id: JobId) -> Result<JobRecord, KiaraError> {
        if let Some(queued) = self.queued.lock().await.get(&job_id) {
            let record = queued.record.read().await.clone();
            return if record.status().is_terminal() {
                Ok(record)
            } else {
                Err(KiaraError::job_not_ready(job_id.to_string()))
            };
        }
        self.archive.load_job(job_id).await
    }

    /// Requests cancellation of a queued job. Only effective if the job
    /// hasn't started running yet; a job already executing runs to
    /// completion.
    pub async fn cancel(&self, job_id: JobId) -> Result<(), KiaraError> {
        match self.queued.lock().await.get(&job_id) {
            Some(queued) => {
                queued.cancel.store(true, Ordering::SeqCst);
                Ok(())
            }
            None => Err(KiaraError::UnknownJob(job_id.to_string())),
        }
    }

    async fn lookup_terminal(&self, inputs_hash: Digest) -> Result<Option<JobRecord>, KiaraError> {
        match self.archive.find_by_inputs_hash(inputs_hash).await? {
            Some(record) if record.status().is_terminal() => Ok(Some(record)),
            _ => Ok(None),
        }
    }

    async fn run(&self, mut record: JobRecord, inputs: ValueMap, is_idempotent: bool) -> Result<JobRecord, KiaraError> {
        let config = record.config().clone();
        record.start();

        let is_cpu_intensive = self.executor.is_cpu_intensive(&config.manifest.module_type);
        let _permit = self.worker_pool.acquire(is_cpu_intensive).await?;

        let started_at = Instant::now();
        let outcome = self
            .executor
            .execute(&config.manifest.module_type, &config.manifest.module_config, &inputs, self.payloads.as_ref())
            .await;

        match outcome {
            Ok(outputs) => {
                let output_ids: BTreeMap<String, ValueId> =
                    outputs.values().map(|(field, value)| (field.clone(), value.value_id())).collect();
                record.succeed(output_ids);
                if let Some(metrics) = &self.metrics {
                    metrics.record_job_executed(started_at.elapsed());
                }
            }
            Err(err) => {
                record.fail(err.to_string());
                if let Some(metrics) = &self.metrics {
                    metrics.record_job_failed();
                }
            }
        }

        if is_idempotent {
            self.archive.store_job(record.clone()).await?;
        }
        Ok(record)
    }

    /// The body `queue` spawns onto a background task: same execution path
    /// as `run`, but against a `JobRecord` whose id was already handed back
    /// to the caller, and honoring `cancel` before the module actually
    /// starts.
    async fn run_queued(
        &self,
        config: JobConfig,
        inputs: ValueMap,
        record: Arc<RwLock<JobRecord>>,
        cancel: &AtomicBool,
        is_idempotent: bool,
    ) {
        if cancel.load(Ordering::SeqCst) {
            record.write().await.cancel();
            return;
        }

        let is_cpu_intensive = self.executor.is_cpu_intensive(&config.manifest.module_type);
        let permit = match self.worker_pool.acquire(is_cpu_intensive).await {
            Ok(permit) => permit,
            Err(err) => {
                record.write().await.fail(err.to_string());
                return;
            }
        };

        if cancel.load(Ordering::SeqCst) {
            drop(permit);
            record.write().await.cancel();
            return;
        }

        record.write().await.start();
        let started_at = Instant::now();
        let outcome = self
            .executor
            .execute(&config.manifest.module_type, &config.manifest.module_config, &inputs, self.payloads.as_ref())
            .await;
        drop(permit);

        let mut record = record.write().await;
        match outcome {
            Ok(outputs) => {
                let output_ids: BTreeMap<String, ValueId> =
                    outputs.values().map(|(field, value)| (field.clone(), value.value_id())).collect();
                record.succeed(output_ids);
                if let Some(metrics) = &self.metrics {
                    metrics.record_job_executed(started_at.elapsed());
                }
            }
            Err(err) => {
                record.fail(err.to_string());
                if let Some(metrics) = &self.metrics {
                    metrics.record_job_failed();
                }
            }
        }

        if is_idempotent {
            let _ = self.archive.store_job(record.clone()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::archives::MemoryArchive;
    use async_trait::async_trait;
    use kiara_domain::value_objects::{Manifest, ModuleConfig, ValueSchema, ValueSize};
    use std::sync::atomic::{AtomicBool as StdAtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingExecutor {
        calls: Arc<AtomicUsize>,
        idempotent: StdAtomicBool,
    }

    impl CountingExecutor {
        fn new(calls: Arc<AtomicUsize>) -> Self {
            Self { calls, idempotent: StdAtomicBool::new(true) }
        }

        fn non_idempotent(calls: Arc<AtomicUsize>) -> Self {
            Self { calls, idempotent: StdAtomicBool::new(false) }
        }
    }

    #[async_trait]
    impl ModuleExecutor for CountingExecutor {
        async fn execute(
            &self,
            _module_type: &str,
            _module_config: &ModuleConfig,
            _inputs: &ValueMap,
            _data: &dyn PayloadStore,
        ) -> Result<ValueMap, KiaraError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ValueMap::new(Default::default()))
        }

        fn is_cpu_intensive(&self, _module_type: &str) -> bool {
            false
        }

        fn is_idempotent(&self, _module_type: &str) -> bool {
            self.idempotent.load(Ordering::SeqCst)
        }
    }

    struct NullStore;

    #[async_trait]
    impl PayloadStore for NullStore {
        async fn read(&self, _value: &kiara_domain::entities::Value) -> Result<serde_json::Value, KiaraError> {
            unimplemented!("test executor never reads payload data")
        }
        async fn write(&self, _schema: &ValueSchema, _data: &serde_json::Value) -> Result<(Digest, ValueSize), KiaraError> {
            unimplemented!("test executor never writes payload data")
        }
    }

    fn pool() -> Arc<WorkerPool> {
        Arc::new(WorkerPool::new(kiara_domain::WorkerCount::new(4), kiara_domain::WorkerCount::new(4)))
    }

    #[tokio::test]
    async fn identical_configs_execute_the_module_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let executor = Arc::new(CountingExecutor::new(calls.clone()));
        let archive = Arc::new(MemoryArchive::new());
        let registry = Arc::new(JobRegistry::new(archive, executor, Arc::new(NullStore), pool()));

        let config = JobConfig::new(Manifest::bare("noop"), BTreeMap::new(), BTreeMap::new());

        let first = registry.submit(config.clone(), ValueMap::new(Default::default())).await.unwrap();
        assert_eq!(first.status(), JobStatus::Succeeded);

        let second = registry.submit(config, ValueMap::new(Default::default())).await.unwrap();
        assert_eq!(second.status(), JobStatus::Succeeded);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_identical_submissions_coalesce() {
        let calls = Arc::new(AtomicUsize::new(0));
        let executor = Arc::new(CountingExecutor::new(calls.clone()));
        let archive = Arc::new(MemoryArchive::new());
        let registry = Arc::new(JobRegistry::new(archive, executor, Arc::new(NullStore), pool()));
        let config = JobConfig::new(Manifest::bare("noop"), BTreeMap::new(), BTreeMap::new());

        let a = registry.clone();
        let config_a = config.clone();
        let b = registry.clone();
        let config_b = config.clone();

        let (r1, r2) = tokio::join!(
            a.submit(config_a, ValueMap::new(Default::default())),
            b.submit(config_b, ValueMap::new(Default::default())),
        );
        assert_eq!(r1.unwrap().status(), JobStatus::Succeeded);
        assert_eq!(r2.unwrap().status(), JobStatus::Succeeded);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_idempotent_modules_bypass_caching_and_storage() {
        let calls = Arc::new(AtomicUsize::new(0));
        let executor = Arc::new(CountingExecutor::non_idempotent(calls.clone()));
        let archive = Arc::new(MemoryArchive::new());
        let registry = Arc::new(JobRegistry::new(archive.clone(), executor, Arc::new(NullStore), pool()));
        let config = JobConfig::new(Manifest::bare("roll_dice"), BTreeMap::new(), BTreeMap::new());

        let first = registry.submit(config.clone(), ValueMap::new(Default::default())).await.unwrap();
        let second = registry.submit(config.clone(), ValueMap::new(Default::default())).await.unwrap();

        assert_ne!(first.job_id(), second.job_id());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(archive.find_by_inputs_hash(config.inputs_hash()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn queued_jobs_are_pollable_and_retrievable() {
        let calls = Arc::new(AtomicUsize::new(0));
        let executor = Arc::new(CountingExecutor::new(calls.clone()));
        let archive = Arc::new(MemoryArchive::new());
        let registry = Arc::new(JobRegistry::new(archive, executor, Arc::new(NullStore), pool()));
        let config = JobConfig::new(Manifest::bare("noop"), BTreeMap::new(), BTreeMap::new());

        let job_id = registry.queue(config, ValueMap::new(Default::default())).await.unwrap();
        registry.wait_for(&[job_id]).await.unwrap();

        assert_eq!(registry.status(job_id).await.unwrap(), JobStatus::Succeeded);
        let record = registry.retrieve_result(job_id).await.unwrap();
        assert_eq!(record.job_id(), job_id);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancelling_before_it_starts_prevents_the_module_from_running() {
        let calls = Arc::new(AtomicUsize::new(0));
        let executor = Arc::new(CountingExecutor::new(calls.clone()));
        let archive = Arc::new(MemoryArchive::new());
        let registry = Arc::new(JobRegistry::new(archive, executor, Arc::new(NullStore), pool()));
        let config = JobConfig::new(Manifest::bare("noop"), BTreeMap::new(), BTreeMap::new());

        let job_id = registry.queue(config, ValueMap::new(Default::default())).await.unwrap();
        registry.cancel(job_id).await.unwrap();
        registry.wait_for(&[job_id]).await.unwrap();

        assert_eq!(registry.status(job_id).await.unwrap(), JobStatus::Cancelled);
    }

    #[tokio::test]
    async fn a_hundred_concurrent_queues_each_get_a_distinct_job_id() {
        let calls = Arc::new(AtomicUsize::new(0));
        let executor = Arc::new(CountingExecutor::new(calls.clone()));
        let archive = Arc::new(MemoryArchive::new());
        let registry = Arc::new(JobRegistry::new(archive, executor, Arc::new(NullStore), pool()));

        let mut job_ids = Vec::new();
        for n in 0..100 {
            let mut module_config = BTreeMap::new();
            module_config.insert("n".to_string(), serde_json::Value::from(n));
            let config = JobConfig::new(Manifest::new("noop", module_config), BTreeMap::new(), BTreeMap::new());
            job_ids.push(registry.queue(config, ValueMap::new(Default::default())).await.unwrap());
        }

        let unique: std::collections::HashSet<_> = job_ids.iter().copied().collect();
        assert_eq!(unique.len(), 100);

        registry.wait_for(&job_ids).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        for job_id in job_ids {
            assert_eq!(registry.status(job_id).await.unwrap(), JobStatus::Succeeded);
        }
    }
}
