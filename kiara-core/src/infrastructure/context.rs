// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Kiara context
//!
//! The composition root: turns a `KiaraConfig` into the full set of wired
//! application-layer registries, a `WorkerPool`, and a `MetricsService`.
//! Only one context may be open against a given archive path at a time --
//! a second attempt fails with `ContextLocked` rather than silently
//! corrupting a SQLite file two processes both believe they own.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock, Mutex};

use kiara_domain::{KiaraError, WorkerCount};

use crate::application::services::{
    AliasRegistry, DataRegistry, DataTypeRegistry, JobRegistry, ModuleRegistry, OperationRegistry, PipelineRuntime,
};
use crate::infrastructure::adapters::{AnyType, BooleanType, FloatType, IntegerType, ListType, StringType};
use crate::infrastructure::archives::{MemoryArchive, SqliteArchive};
use crate::infrastructure::config::{ArchiveBackend, KiaraConfig};
use crate::infrastructure::metrics::MetricsService;
use crate::infrastructure::runtime::WorkerPool;

fn locked_contexts() -> &'static Mutex<HashSet<String>> {
    static LOCKS: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();
    LOCKS.get_or_init(|| Mutex::new(HashSet::new()))
}

/// Releases a context's archive-path lock when dropped, so the same path
/// can be reopened once this `KiaraContext` goes out of scope.
struct ContextLock(String);

impl Drop for ContextLock {
    fn drop(&mut self) {
        locked_contexts().lock().unwrap().remove(&self.0);
    }
}

fn acquire_lock(key: &str) -> Result<ContextLock, KiaraError> {
    let mut locks = locked_contexts().lock().unwrap();
    if !locks.insert(key.to_string()) {
        return Err(KiaraError::ContextLocked(key.to_string()));
    }
    Ok(ContextLock(key.to_string()))
}

pub struct KiaraContext {
    _lock: ContextLock,
    pub data_types: DataTypeRegistry,
    pub modules: Arc<ModuleRegistry>,
    pub operations: OperationRegistry,
    pub data: Arc<DataRegistry>,
    pub aliases: Arc<AliasRegistry>,
    pub jobs: Arc<JobRegistry>,
    pub pipelines: Arc<PipelineRuntime>,
    pub worker_pool: Arc<WorkerPool>,
    pub metrics: Arc<MetricsService>,
}

impl KiaraContext {
    /// Builds a fully wired context from `config` with no modules
    /// registered; callers that run pipelines need [`KiaraContext::build_with_modules`]
    /// instead, since a `ModuleRegistry` is immutable once handed to the
    /// job registry and pipeline runtime it wires here.
    pub async fn build(config: &KiaraConfig) -> Result<Self, KiaraError> {
        Self::build_with_modules(config, ModuleRegistry::new()).await
    }

    /// Builds a fully wired context from `config`, using `modules` as the
    /// module registry every step and job executes against. The archive
    /// backend named by `config.archive` is constructed, every built-in
    /// data type is registered, and the worker pool is sized from `config`
    /// or the host's available parallelism.
    pub async fn build_with_modules(config: &KiaraConfig, modules: ModuleRegistry) -> Result<Self, KiaraError> {
        let lock_key = match &config.archive {
            ArchiveBackend::Memory => "memory".to_string(),
            ArchiveBackend::Sqlite { path } => path.clone(),
        };
        let lock = acquire_lock(&lock_key)?;

        let metrics = Arc::new(MetricsService::new()?);

        let mut data_types = DataTypeRegistry::new();
        data_types.register(Arc::new(IntegerType));
        data_types.register(Arc::new(FloatType));
        data_types.register(Arc::new(StringType));
        data_types.register(Arc::new(BooleanType));
        data_types.register(Arc::new(ListType));
        data_types.register(Arc::new(AnyType));

        let modules = Arc::new(modules);
        let operations = OperationRegistry::new();

        let cpu_count = config.cpu_workers.map(WorkerCount::new).unwrap_or_else(WorkerCount::default_cpu_pool);
        let io_count = config.io_workers.map(WorkerCount::new).unwrap_or_else(WorkerCount::default_io_pool);
        let worker_pool = Arc::new(WorkerPool::new(cpu_count, io_count));

        let (data, aliases, jobs) = match &config.archive {
            ArchiveBackend::Memory => {
                let archive = Arc::new(MemoryArchive::new());
                Self::wire(data_types.clone(), archive.clone(), archive.clone(), archive, modules.clone(), worker_pool.clone(), metrics.clone())
            }
            ArchiveBackend::Sqlite { path } => {
                let archive = Arc::new(SqliteArchive::connect(path).await?);
                Self::wire(data_types.clone(), archive.clone(), archive.clone(), archive, modules.clone(), worker_pool.clone(), metrics.clone())
            }
        };

        let pipelines = Arc::new(PipelineRuntime::new(jobs.clone(), data.clone(), modules.clone()));

        Ok(Self {
            _lock: lock,
            data_types,
            modules,
            operations,
            data,
            aliases,
            jobs,
            pipelines,
            worker_pool,
            metrics,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn wire<A>(
        data_types: DataTypeRegistry,
        data_archive: Arc<A>,
        alias_archive: Arc<A>,
        job_archive: Arc<A>,
        modules: Arc<ModuleRegistry>,
        worker_pool: Arc<WorkerPool>,
        metrics: Arc<MetricsService>,
    ) -> (Arc<DataRegistry>, Arc<AliasRegistry>, Arc<JobRegistry>)
    where
        A: kiara_domain::DataArchive + kiara_domain::AliasArchive + kiara_domain::JobArchive + 'static,
    {
        let data = Arc::new(DataRegistry::new(data_types, data_archive.clone()).with_metrics(metrics.clone()));
        let aliases = Arc::new(AliasRegistry::new(alias_archive, data_archive));
        let payloads: Arc<dyn kiara_domain::PayloadStore> = data.clone();
        let jobs = Arc::new(JobRegistry::new(job_archive, modules, payloads, worker_pool).with_metrics(metrics));
        (data, aliases, jobs)
    }
}
