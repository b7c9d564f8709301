// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Shared test harness
//!
//! Builds a fully wired set of registries over a `MemoryArchive`, with two
//! toy modules (`increment`, `double`) registered so integration tests can
//! exercise real pipelines and job memoization without standing up the
//! full `KiaraContext`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use kiara_core::{
    DataRegistry, DataTypeRegistry, JobRegistry, KiaraError, Module, ModuleConfig, ModuleRegistry, PayloadStore,
    PipelineRuntime, ValueMap,
};
use kiara_core::infrastructure::adapters::IntegerType;
use kiara_core::infrastructure::archives::MemoryArchive;
use kiara_core::infrastructure::runtime::WorkerPool;
use kiara_domain::value_objects::{canonical_hash, ValuePedigree, ValueSchema, WorkerCount};
use kiara_domain::entities::Value;

/// Adds one to its `value` input, producing `result`.
pub struct Increment;

#[async_trait]
impl Module for Increment {
    fn module_type(&self) -> &'static str {
        "increment"
    }

    fn inputs_schema(&self, _module_config: &ModuleConfig) -> Result<BTreeMap<String, ValueSchema>, KiaraError> {
        Ok(BTreeMap::from([("value".to_string(), ValueSchema::new("integer"))]))
    }

    fn outputs_schema(&self, _module_config: &ModuleConfig) -> Result<BTreeMap<String, ValueSchema>, KiaraError> {
        Ok(BTreeMap::from([("result".to_string(), ValueSchema::new("integer"))]))
    }

    async fn process(&self, _module_config: &ModuleConfig, inputs: &ValueMap, _data: &dyn PayloadStore) -> Result<ValueMap, KiaraError> {
        let input = inputs.get("value").expect("value bound by runtime");
        let pedigree = ValuePedigree::new(
            "increment",
            canonical_hash(&"increment"),
            BTreeMap::from([("value".to_string(), input.value_id())]),
            BTreeMap::new(),
        );
        let mut outputs = ValueMap::new(self.outputs_schema(&ModuleConfig::new())?);
        let value = Value::new_computed(
            ValueSchema::new("integer"),
            input.status(),
            input.value_hash(),
            input.value_size(),
            pedigree,
            "result",
        );
        outputs.set_value("result", value)?;
        Ok(outputs)
    }

    fn is_cpu_intensive(&self) -> bool {
        false
    }
}

/// Counts how many times it actually ran, to make singleflight
/// coalescing and cache-hit behavior observable from the outside.
pub struct CountingIncrement {
    pub calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Module for CountingIncrement {
    fn module_type(&self) -> &'static str {
        "increment"
    }

    fn inputs_schema(&self, _module_config: &ModuleConfig) -> Result<BTreeMap<String, ValueSchema>, KiaraError> {
        Ok(BTreeMap::from([("value".to_string(), ValueSchema::new("integer"))]))
    }

    fn outputs_schema(&self, _module_config: &ModuleConfig) -> Result<BTreeMap<String, ValueSchema>, KiaraError> {
        Ok(BTreeMap::from([("result".to_string(), ValueSchema::new("integer"))]))
    }

    async fn process(&self, _module_config: &ModuleConfig, inputs: &ValueMap, _data: &dyn PayloadStore) -> Result<ValueMap, KiaraError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let input = inputs.get("value").expect("value bound by runtime");
        let pedigree = ValuePedigree::new(
            "increment",
            canonical_hash(&"increment"),
            BTreeMap::from([("value".to_string(), input.value_id())]),
            BTreeMap::new(),
        );
        let mut outputs = ValueMap::new(self.outputs_schema(&ModuleConfig::new())?);
        let value = Value::new_computed(
            ValueSchema::new("integer"),
            input.status(),
            input.value_hash(),
            input.value_size(),
            pedigree,
            "result",
        );
        outputs.set_value("result", value)?;
        Ok(outputs)
    }

    fn is_cpu_intensive(&self) -> bool {
        false
    }
}

pub struct Harness {
    pub data: Arc<DataRegistry>,
    pub jobs: Arc<JobRegistry>,
    pub pipelines: Arc<PipelineRuntime>,
}

pub fn build_harness(modules: ModuleRegistry) -> Harness {
    let archive = Arc::new(MemoryArchive::new());
    let modules = Arc::new(modules);
    let pool = Arc::new(WorkerPool::new(WorkerCount::new(4), WorkerCount::new(4)));

    let mut data_types = DataTypeRegistry::new();
    data_types.register(Arc::new(IntegerType));
    let data = Arc::new(DataRegistry::new(data_types, archive.clone()));

    let payloads: Arc<dyn PayloadStore> = data.clone();
    let jobs = Arc::new(JobRegistry::new(archive, modules.clone(), payloads, pool));

    let pipelines = Arc::new(PipelineRuntime::new(jobs.clone(), data.clone(), modules));
    Harness { data, jobs, pipelines }
}
