// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline runtime
//!
//! Executes a `PipelineStructure` stage by stage (§5): each stage's steps
//! have no dependency on each other and run concurrently, while a step
//! cannot start until every stage before it has produced the outputs its
//! `input_links` reference. Every step submission goes through the
//! `JobRegistry`, so a step whose `inputs_hash` was already computed in an
//! earlier run (or by a sibling step with the same manifest and inputs)
//! never re-executes its module.
//!
//! Each step transition also emits the causal `RuntimeEvent` chain
//! documented on `kiara_domain::events`: a step's resolved inputs produce a
//! `StepInputChanged`, its job's outputs produce a `StepOutputChanged`
//! caused by that input event, and a pipeline output alias produces a
//! `PipelineOutputChanged` caused by the step output it exposes.
//!
//! `PipelineRuntime` itself is a stateless facade over the job/data/module
//! registries; the per-run state (which steps are ready, which have already
//! produced outputs) lives in a `PipelineRun` (§4.5), so a caller can drive a
//! pipeline incrementally -- bind inputs, run one step or one whole stage at
//! a time, inspect `StepStatus` in between -- instead of only getting an
//! all-or-nothing `run`.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::try_join_all;
use tokio::sync::mpsc::UnboundedSender;

use kiara_domain::aggregates::{InputSource, PipelineStructure};
use kiara_domain::entities::ValueMap;
use kiara_domain::events::{DomainEvent, PipelineOutputChanged, RuntimeEvent, StepInputChanged, StepOutputChanged};
use kiara_domain::value_objects::{JobConfig, ProcessingStage, StepId, ValueId};
use kiara_domain::KiaraError;

use super::data_registry::DataRegistry;
use super::job_registry::JobRegistry;
use super::module_registry::ModuleRegistry;

/// Where a step stands relative to the data it needs and the data it has
/// produced (§4.5). A step starts `AwaitingInputs`, becomes `ReadyToRun`
/// once every `input_links` source has a bound value, and becomes
/// `Completed` once its job has run and produced outputs. A step whose
/// inputs never arrive (an optional branch nothing ever feeds) stays
/// `AwaitingInputs` for the life of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    AwaitingInputs,
    ReadyToRun,
    Completed,
}

pub struct PipelineRuntime {
    job_registry: Arc<JobRegistry>,
    data_registry: Arc<DataRegistry>,
    module_registry: Arc<ModuleRegistry>,
    events: Option<UnboundedSender<RuntimeEvent>>,
}

impl PipelineRuntime {
    pub fn new(
        job_registry: Arc<JobRegistry>,
        data_registry: Arc<DataRegistry>,
        module_registry: Arc<ModuleRegistry>,
    ) -> Self {
        Self { job_registry, data_registry, module_registry, events: None }
    }

    pub fn with_events(mut self, events: UnboundedSender<RuntimeEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Starts a new incremental run against `structure`. Nothing has
    /// happened yet -- every step is `AwaitingInputs` until
    /// `set_pipeline_inputs` binds the pipeline-level fields.
    pub fn start<'a>(&self, structure: &'a PipelineStructure) -> PipelineRun<'a> {
        PipelineRun::new(structure)
    }

    /// Runs every required step of `structure` against `pipeline_inputs` in
    /// one call, returning the `ValueId` bound to each declared pipeline
    /// output alias. Equivalent to `start` + `set_pipeline_inputs` +
    /// `process_all` + `resolve_outputs` on a fresh run.
    pub async fn run(
        &self,
        structure: &PipelineStructure,
        pipeline_inputs: BTreeMap<String, ValueId>,
    ) -> Result<BTreeMap<String, ValueId>, KiaraError> {
        let mut run = self.start(structure);
        run.set_pipeline_inputs(self, pipeline_inputs);
        run.process_all(self).await?;
        run.resolve_outputs(self)
    }

    async fn run_step(
        &self,
        structure: &PipelineStructure,
        step_id: &StepId,
        pipeline_inputs: &BTreeMap<String, ValueId>,
        step_outputs: &BTreeMap<StepId, BTreeMap<String, ValueId>>,
    ) -> Result<(StepId, BTreeMap<String, ValueId>, uuid::Uuid), KiaraError> {
        let step = structure
            .step(step_id)
            .ok_or_else(|| KiaraError::InvalidPipelineStepConfig(format!("unknown step '{step_id}'")))?;

        let module = self.module_registry.get(&step.manifest.module_type)?;
        let inputs_schema = module.inputs_schema(&step.manifest.module_config)?;

        let mut resolved_ids = BTreeMap::new();
        let mut inputs = ValueMap::new(inputs_schema);
        let mut input_event_id = None;

        for (field, source) in &step.input_links {
            let value_id = match source {
                InputSource::PipelineInput(name) => pipeline_inputs.get(name).copied().ok_or_else(|| {
                    KiaraError::InputValuesInvalid(format!("step '{step_id}' needs pipeline input '{name}'"))
                })?,
                InputSource::StepOutput(addr) => {
                    let upstream = step_outputs.get(&addr.step_id).ok_or_else(|| {
                        KiaraError::InvalidPipelineStepConfig(format!(
                            "step '{step_id}' depends on '{}' before it ran",
                            addr.step_id
                        ))
                    })?;
                    upstream.get(&addr.field_name).copied().ok_or_else(|| {
                        KiaraError::InvalidPipelineStepConfig(format!(
                            "step '{}' never produced field '{}'",
                            addr.step_id, addr.field_name
                        ))
                    })?
                }
                InputSource::Constant => continue,
            };

            resolved_ids.insert(field.clone(), value_id);
            let value = self.data_registry.get_value(value_id).await?;
            inputs.set_value(field, value)?;

            let event = DomainEvent::new(StepInputChanged { step_id: step_id.clone(), field: field.clone(), value_id });
            input_event_id.get_or_insert(event.event_id);
            self.emit(RuntimeEvent::StepInputChanged(event));
        }

        let config = JobConfig::new(step.manifest.clone(), resolved_ids, BTreeMap::new());
        let record = self.job_registry.submit(config, inputs).await?;

        if record.status() != kiara_domain::entities::JobStatus::Succeeded {
            return Err(KiaraError::job_failed(format!(
                "step '{step_id}' did not succeed: {}",
                record.error_message().unwrap_or("unknown error")
            )));
        }

        let causation_id = input_event_id.unwrap_or_else(uuid::Uuid::new_v4);
        for (field, value_id) in record.outputs() {
            let event = DomainEvent::new(StepOutputChanged {
                step_id: step_id.clone(),
                field: field.clone(),
                value_id: *value_id,
            })
            .caused_by(causation_id);
            self.emit(RuntimeEvent::StepOutputChanged(event));
        }

        Ok((step_id.clone(), record.outputs().clone(), causation_id))
    }

    fn emit(&self, event: RuntimeEvent) {
        if let Some(sender) = &self.events {
            let _ = sender.send(event);
        }
    }
}

/// The stateful side of running a `PipelineStructure`: bound pipeline
/// inputs, the outputs each step has produced so far, and every step's
/// current `StepStatus` (§4.5). Borrows the structure it was started from,
/// so the two stay in sync for the run's lifetime.
pub struct PipelineRun<'a> {
    structure: &'a PipelineStructure,
    pipeline_inputs: BTreeMap<String, ValueId>,
    step_outputs: BTreeMap<StepId, BTreeMap<String, ValueId>>,
    statuses: BTreeMap<StepId, StepStatus>,
    input_event_ids: BTreeMap<StepId, uuid::Uuid>,
}

impl<'a> PipelineRun<'a> {
    fn new(structure: &'a PipelineStructure) -> Self {
        let statuses = structure.steps().map(|s| (s.step_id.clone(), StepStatus::AwaitingInputs)).collect();
        Self {
            structure,
            pipeline_inputs: BTreeMap::new(),
            step_outputs: BTreeMap::new(),
            statuses,
            input_event_ids: BTreeMap::new(),
        }
    }

    /// The current status of a step, or `AwaitingInputs` for a step id this
    /// run doesn't know about.
    pub fn status(&self, step_id: &StepId) -> StepStatus {
        self.statuses.get(step_id).copied().unwrap_or(StepStatus::AwaitingInputs)
    }

    /// Binds the pipeline-level input fields, emits a `PipelineInputChanged`
    /// per field, and recomputes which steps are now `ReadyToRun`.
    pub fn set_pipeline_inputs(&mut self, runtime: &PipelineRuntime, pipeline_inputs: BTreeMap<String, ValueId>) {
        for (field, value_id) in &pipeline_inputs {
            runtime.emit(RuntimeEvent::PipelineInputChanged(DomainEvent::new(
                kiara_domain::events::PipelineInputChanged { field: field.clone(), value_id: *value_id },
            )));
        }
        self.pipeline_inputs = pipeline_inputs;
        self.refresh_statuses();
    }

    fn refresh_statuses(&mut self) {
        for step in self.structure.steps() {
            if self.statuses.get(&step.step_id) == Some(&StepStatus::Completed) {
                continue;
            }
            let ready = step.input_links.values().all(|source| match source {
                InputSource::PipelineInput(name) => self.pipeline_inputs.contains_key(name),
                InputSource::StepOutput(addr) => {
                    self.step_outputs.get(&addr.step_id).is_some_and(|o| o.contains_key(&addr.field_name))
                }
                InputSource::Constant => true,
            });
            self.statuses
                .insert(step.step_id.clone(), if ready { StepStatus::ReadyToRun } else { StepStatus::AwaitingInputs });
        }
    }

    /// Runs a single step, which must currently be `ReadyToRun`.
    pub async fn process_step(&mut self, runtime: &PipelineRuntime, step_id: &StepId) -> Result<(), KiaraError> {
        if self.status(step_id) != StepStatus::ReadyToRun {
            return Err(KiaraError::InvalidPipelineStepConfig(format!(
                "step '{step_id}' is not ready to run"
            )));
        }
        let (step_id, outputs, causation_id) =
            runtime.run_step(self.structure, step_id, &self.pipeline_inputs, &self.step_outputs).await?;
        self.input_event_ids.insert(step_id.clone(), causation_id);
        self.step_outputs.insert(step_id.clone(), outputs);
        self.statuses.insert(step_id, StepStatus::Completed);
        self.refresh_statuses();
        Ok(())
    }

    /// Runs every required, currently-`ReadyToRun` step in `stage`
    /// concurrently. Steps in the stage that are required but still
    /// `AwaitingInputs` (an optional branch upstream, a pipeline input never
    /// bound) are silently skipped, not an error.
    pub async fn process_stage(&mut self, runtime: &PipelineRuntime, stage: ProcessingStage) -> Result<(), KiaraError> {
        let step_ids = self.ready_required_steps_in(stage);
        if step_ids.is_empty() {
            return Ok(());
        }

        let runs = step_ids
            .iter()
            .map(|step_id| runtime.run_step(self.structure, step_id, &self.pipeline_inputs, &self.step_outputs));
        let results = try_join_all(runs).await?;

        for (step_id, outputs, causation_id) in results {
            self.input_event_ids.insert(step_id.clone(), causation_id);
            self.step_outputs.insert(step_id.clone(), outputs);
            self.statuses.insert(step_id, StepStatus::Completed);
        }
        self.refresh_statuses();
        Ok(())
    }

    fn ready_required_steps_in(&self, stage: ProcessingStage) -> Vec<StepId> {
        self.structure
            .stages_in_order()
            .into_iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, ids)| {
                ids.into_iter()
                    .filter(|id| self.structure.is_required(id))
                    .filter(|id| self.status(id) == StepStatus::ReadyToRun)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Runs every stage of `structure` in order, required steps only, each
    /// stage's steps concurrently.
    pub async fn process_all(&mut self, runtime: &PipelineRuntime) -> Result<(), KiaraError> {
        let stages: Vec<ProcessingStage> = self.structure.stages_in_order().into_iter().map(|(stage, _)| stage).collect();
        for stage in stages {
            self.process_stage(runtime, stage).await?;
        }
        Ok(())
    }

    /// Resolves every declared pipeline output alias to the `ValueId` its
    /// source step produced, emitting a `PipelineOutputChanged` for each.
    /// Fails if a required step behind an output never ran.
    pub fn resolve_outputs(&self, runtime: &PipelineRuntime) -> Result<BTreeMap<String, ValueId>, KiaraError> {
        let mut resolved = BTreeMap::new();
        for output in self.structure.pipeline_outputs() {
            let outputs = self.step_outputs.get(&output.source.step_id).ok_or_else(|| {
                KiaraError::InvalidPipelineStepConfig(format!(
                    "pipeline output '{}' step '{}' never ran",
                    output.alias, output.source.step_id
                ))
            })?;
            let value_id = *outputs.get(&output.source.field_name).ok_or_else(|| {
                KiaraError::InvalidPipelineStepConfig(format!(
                    "pipeline output '{}' field '{}' was never produced",
                    output.alias, output.source.field_name
                ))
            })?;
            resolved.insert(output.alias.clone(), value_id);

            let causation = self.input_event_ids.get(&output.source.step_id).copied();
            let mut event = DomainEvent::new(PipelineOutputChanged { alias: output.alias.clone(), value_id });
            if let Some(id) = causation {
                event = event.caused_by(id);
            }
            runtime.emit(RuntimeEvent::PipelineOutputChanged(event));
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::archives::MemoryArchive;
    use crate::infrastructure::runtime::WorkerPool;
    use async_trait::async_trait;
    use kiara_domain::aggregates::{PipelineOutputAlias, StepDefinition};
    use kiara_domain::entities::Value;
    use kiara_domain::services::Module;
    use kiara_domain::value_objects::{canonical_hash, Manifest, ModuleConfig, StepValueAddress, ValueSchema, ValueSize, WorkerCount};

    struct Increment;

    #[async_trait]
    impl Module for Increment {
        fn module_type(&self) -> &'static str {
            "increment"
        }
        fn inputs_schema(&self, _module_config: &ModuleConfig) -> Result<BTreeMap<String, ValueSchema>, KiaraError> {
            let mut schema = BTreeMap::new();
            schema.insert("value".to_string(), ValueSchema::new("integer"));
            Ok(schema)
        }
        fn outputs_schema(&self, _module_config: &ModuleConfig) -> Result<BTreeMap<String, ValueSchema>, KiaraError> {
            let mut schema = BTreeMap::new();
            schema.insert("result".to_string(), ValueSchema::new("integer"));
            Ok(schema)
        }
        async fn process(
            &self,
            _module_config: &ModuleConfig,
            inputs: &ValueMap,
            _data: &dyn kiara_domain::PayloadStore,
        ) -> Result<ValueMap, KiaraError> {
            let input = inputs.get("value").expect("value bound by runtime");
            let pedigree = kiara_domain::value_objects::ValuePedigree::new(
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

    fn harness() -> (Arc<PipelineRuntime>, Arc<DataRegistry>) {
        let archive = Arc::new(MemoryArchive::new());
        let mut modules = ModuleRegistry::new();
        modules.register(Arc::new(Increment));
        let modules = Arc::new(modules);
        let pool = Arc::new(WorkerPool::new(WorkerCount::new(4), WorkerCount::new(4)));

        let mut data_types = crate::application::services::DataTypeRegistry::new();
        data_types.register(Arc::new(crate::infrastructure::adapters::IntegerType));
        let data_registry = Arc::new(DataRegistry::new(data_types, archive.clone()));

        let payloads: Arc<dyn kiara_domain::PayloadStore> = data_registry.clone();
        let job_registry = Arc::new(JobRegistry::new(archive, modules.clone(), payloads, pool));

        (Arc::new(PipelineRuntime::new(job_registry, data_registry.clone(), modules)), data_registry)
    }

    #[tokio::test]
    async fn a_step_without_its_pipeline_input_bound_stays_awaiting_inputs() {
        let (runtime, _data_registry) = harness();
        let step = StepDefinition {
            step_id: StepId::new("inc").unwrap(),
            manifest: Manifest::bare("increment"),
            input_links: BTreeMap::from([("value".to_string(), InputSource::PipelineInput("n".to_string()))]),
        };
        let outputs = vec![PipelineOutputAlias {
            alias: "answer".to_string(),
            source: StepValueAddress::new(StepId::new("inc").unwrap(), "result"),
        }];
        let structure = PipelineStructure::build(vec![step], outputs).unwrap();

        let mut run = runtime.start(&structure);
        run.set_pipeline_inputs(&runtime, BTreeMap::new());
        assert_eq!(run.status(&StepId::new("inc").unwrap()), StepStatus::AwaitingInputs);
        run.process_all(&runtime).await.unwrap();
        assert_eq!(run.status(&StepId::new("inc").unwrap()), StepStatus::AwaitingInputs);
    }

    #[tokio::test]
    async fn incremental_processing_reaches_completed() {
        let (runtime, data_registry) = harness();
        let input_id = data_registry
            .register_orphan("ctx", ValueSchema::new("integer"), &serde_json::Value::from(5), false)
            .await
            .unwrap();

        let step = StepDefinition {
            step_id: StepId::new("inc").unwrap(),
            manifest: Manifest::bare("increment"),
            input_links: BTreeMap::from([("value".to_string(), InputSource::PipelineInput("n".to_string()))]),
        };
        let outputs = vec![PipelineOutputAlias {
            alias: "answer".to_string(),
            source: StepValueAddress::new(StepId::new("inc").unwrap(), "result"),
        }];
        let structure = PipelineStructure::build(vec![step], outputs).unwrap();

        let step_id = StepId::new("inc").unwrap();
        let mut run = runtime.start(&structure);
        run.set_pipeline_inputs(&runtime, BTreeMap::from([("n".to_string(), input_id)]));
        assert_eq!(run.status(&step_id), StepStatus::ReadyToRun);

        run.process_step(&runtime, &step_id).await.unwrap();
        assert_eq!(run.status(&step_id), StepStatus::Completed);

        let resolved = run.resolve_outputs(&runtime).unwrap();
        assert!(resolved.contains_key("answer"));
    }

    #[tokio::test]
    async fn runs_a_single_step_pipeline_end_to_end() {
        let (runtime, data_registry) = harness();
        let input_id = data_registry
            .register_orphan("ctx", ValueSchema::new("integer"), &serde_json::Value::from(5), false)
            .await
            .unwrap();

        let step = StepDefinition {
            step_id: StepId::new("inc").unwrap(),
            manifest: Manifest::bare("increment"),
            input_links: BTreeMap::from([("value".to_string(), InputSource::PipelineInput("n".to_string()))]),
        };
        let outputs = vec![PipelineOutputAlias {
            alias: "answer".to_string(),
            source: StepValueAddress::new(StepId::new("inc").unwrap(), "result"),
        }];
        let structure = PipelineStructure::build(vec![step], outputs).unwrap();

        let pipeline_inputs = BTreeMap::from([("n".to_string(), input_id)]);
        let resolved = runtime.run(&structure, pipeline_inputs).await.unwrap();
        assert!(resolved.contains_key("answer"));
    }

    #[tokio::test]
    async fn missing_pipeline_input_is_rejected() {
        let (runtime, _data_registry) = harness();
        let step = StepDefinition {
            step_id: StepId::new("inc").unwrap(),
            manifest: Manifest::bare("increment"),
            input_links: BTreeMap::from([("value".to_string(), InputSource::PipelineInput("n".to_string()))]),
        };
        let outputs = vec![PipelineOutputAlias {
            alias: "answer".to_string(),
            source: StepValueAddress::new(StepId::new("inc").unwrap(), "result"),
        }];
        let structure = PipelineStructure::build(vec![step], outputs).unwrap();
        assert!(runtime.run(&structure, BTreeMap::new()).await.is_err());
    }
}
